//! Page sources.
//!
//! A [`LayoutSource`] hands out normalised pages one at a time so a failure
//! on a late page still leaves the earlier pages' results usable. Two
//! inputs are supported: a JSON layout dump written by an external layout
//! engine, and a PDF read as plain text.

use std::path::Path;

use maegak_pdf_models::{Page, RawDocument, RawPage};

use crate::ExtractError;
use crate::adapter::normalize_page;
use crate::text_table::page_from_text;

/// A document whose pages can be loaded in order.
pub trait LayoutSource {
    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Loads page `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be produced.
    fn page(&mut self, index: usize) -> Result<Page, ExtractError>;
}

fn out_of_range(index: usize, count: usize) -> ExtractError {
    ExtractError::UnsupportedInput(format!("page {index} requested from a {count}-page document"))
}

/// Pages from a JSON layout dump.
#[derive(Debug, Clone, Default)]
pub struct JsonLayoutSource {
    pages: Vec<Option<RawPage>>,
}

impl JsonLayoutSource {
    /// Wraps an already parsed dump.
    #[must_use]
    pub fn new(raw: RawDocument) -> Self {
        Self {
            pages: raw.pages.into_iter().map(Some).collect(),
        }
    }

    /// Parses a dump from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Json`] if the text is not a layout dump.
    pub fn from_json_str(json: &str) -> Result<Self, ExtractError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Reads a dump from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Io`] or [`ExtractError::Json`].
    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }
}

impl LayoutSource for JsonLayoutSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&mut self, index: usize) -> Result<Page, ExtractError> {
        let count = self.pages.len();
        let raw = self
            .pages
            .get_mut(index)
            .and_then(Option::take)
            .ok_or_else(|| out_of_range(index, count))?;
        Ok(normalize_page(index, raw))
    }
}

/// Pages of a PDF read as plain text, with rows recovered from the text.
#[derive(Debug, Clone, Default)]
pub struct PdfTextSource {
    pages: Vec<Option<String>>,
}

impl PdfTextSource {
    /// Extracts the text of every page of an in-memory PDF.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Pdf`] if the PDF cannot be parsed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ExtractError> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| ExtractError::Pdf(e.to_string()))?;
        log::debug!("PDF text extracted for {} pages", pages.len());
        Ok(Self {
            pages: pages.into_iter().map(Some).collect(),
        })
    }

    /// Reads and extracts a PDF from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Io`] or [`ExtractError::Pdf`].
    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        Self::from_bytes(&std::fs::read(path)?)
    }
}

impl LayoutSource for PdfTextSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&mut self, index: usize) -> Result<Page, ExtractError> {
        let count = self.pages.len();
        let text = self
            .pages
            .get_mut(index)
            .and_then(Option::take)
            .ok_or_else(|| out_of_range(index, count))?;
        Ok(page_from_text(index, text))
    }
}

/// Opens `path` with the source matching its extension (`.json` or `.pdf`).
///
/// # Errors
///
/// Returns [`ExtractError::UnsupportedInput`] for any other extension, or
/// the error of the chosen source.
pub fn open_source(path: &Path) -> Result<Box<dyn LayoutSource>, ExtractError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("json") => Ok(Box::new(JsonLayoutSource::from_path(path)?)),
        Some("pdf") => Ok(Box::new(PdfTextSource::from_path(path)?)),
        _ => Err(ExtractError::UnsupportedInput(format!(
            "{} is neither a .json layout dump nor a .pdf",
            path.display()
        ))),
    }
}
