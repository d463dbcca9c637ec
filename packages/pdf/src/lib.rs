#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Structured extraction from court-auction sale-object specification PDFs
//! (매각물건명세서).
//!
//! A document arrives as layout primitives (tables of cells and positioned
//! text lines per page), either from a JSON layout dump written by an
//! external layout engine or from a PDF read as plain text with
//! [`pdf_extract`]. The [`document::Extractor`] walks the pages in order and
//! fills one [`CaseRecord`]:
//!
//! - header fields through label lookup ([`fields`], [`locate`])
//! - the occupant table through cell-count layout variants ([`occupants`],
//!   [`layout`])
//! - free-text legal notes through a streaming section scanner
//!   ([`sections`])
//! - auction rounds through a pattern scan of the page text ([`rounds`])
//!
//! Pages without ruled tables fall back to coordinate-based extraction
//! ([`positioned`]). Every empirical constant lives in [`config`].
//!
//! [`process_path`] is the per-document boundary used by the CLI: it never
//! fails, and reports the outcome in a [`ParseResult`] envelope.

pub mod adapter;
pub mod config;
pub mod document;
pub mod fields;
pub mod layout;
pub mod locate;
pub mod occupants;
pub mod patterns;
pub mod positioned;
pub mod rounds;
pub mod sections;
pub mod source;
pub mod text_table;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;

use maegak_pdf_models::{CaseRecord, ParseResult};

pub use config::ExtractConfig;
pub use document::Extractor;

/// Errors raised while loading a document or its configuration.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// A file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A layout dump is not valid JSON of the expected shape.
    #[error("Layout JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The PDF could not be read.
    #[error("PDF extraction error: {0}")]
    Pdf(String),

    /// The extraction configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The input is not a format this crate reads.
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "extraction panicked".to_owned())
}

/// Extracts one document and wraps the outcome in a [`ParseResult`].
///
/// A missing file yields [`ResultCode::NotFound`]. A load error or a panic
/// during extraction yields [`ResultCode::UnexpectedError`] with the
/// message, and the record keeps whatever the pages processed before the
/// fault produced.
///
/// [`ResultCode::NotFound`]: maegak_pdf_models::ResultCode::NotFound
/// [`ResultCode::UnexpectedError`]: maegak_pdf_models::ResultCode::UnexpectedError
#[must_use]
pub fn process_path(extractor: &Extractor, path: &Path) -> ParseResult {
    let source_path = path.display().to_string();

    if !path.is_file() {
        log::warn!("{source_path}: file not found");
        return ParseResult::not_found(&source_path);
    }

    let mut run = extractor.start();
    let outcome = catch_unwind(AssertUnwindSafe(|| -> Result<(), ExtractError> {
        let mut source = source::open_source(path)?;
        for index in 0..source.page_count() {
            let page = source.page(index)?;
            run.process_page(&page);
        }
        Ok(())
    }));

    let message = match outcome {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(e.to_string()),
        Err(payload) => Some(panic_message(payload.as_ref())),
    };
    let record: CaseRecord = run.finish();

    match message {
        None => {
            log::info!(
                "{source_path}: {} occupants, {} rounds",
                record.occupants.len(),
                record.auction_rounds.len()
            );
            ParseResult::success(&source_path, record)
        }
        Some(message) => {
            log::warn!("{source_path}: extraction failed: {message}");
            ParseResult::failed(&source_path, &message, record)
        }
    }
}

#[cfg(test)]
mod tests {
    use maegak_pdf_models::{ResultCode, SUCCESS_MESSAGE};

    use super::*;
    use crate::adapter::normalize_document;

    const MULTI_PAGE: &str = include_str!("../fixtures/multi_page.json");

    fn extractor() -> Extractor {
        Extractor::new(ExtractConfig::embedded().unwrap())
    }

    fn fixture_path(name: &str) -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
    }

    #[test]
    fn multi_page_fixture() {
        let raw = serde_json::from_str(MULTI_PAGE).unwrap();
        let record = extractor().extract(&normalize_document(raw));

        assert_eq!(record.case_no, "2024타경2433827");
        assert_eq!(record.item_no, "1");
        assert_eq!(record.dividend_end_date, "2024.08.26");

        assert_eq!(record.occupants.len(), 3);
        assert_eq!(record.occupants[0].name, "김철수");
        assert_eq!(record.occupants[0].unit, "301호 일부");
        assert_eq!(record.occupants[0].rent, "500,000");
        assert_eq!(record.occupants[1].name, "김철수");
        assert_eq!(record.occupants[1].info_source, "권리신고");
        assert_eq!(record.occupants[2].name, "이영희");
        assert_eq!(record.occupants[2].deposit, "20,000,000");

        assert_eq!(record.tenant_note, "김철수: 배당요구");
        assert_eq!(record.auction_rounds.len(), 2);
        assert_eq!(record.auction_rounds[1].bid_deposit, "");
    }

    #[test]
    fn process_path_reports_success() {
        let result = process_path(&extractor(), &fixture_path("multi_page.json"));
        assert!(result.is_success());
        assert_eq!(result.result_msg, SUCCESS_MESSAGE);
        assert_eq!(result.record.occupants.len(), 3);
    }

    #[test]
    fn process_path_reports_missing_file() {
        let result = process_path(&extractor(), &fixture_path("does_not_exist.json"));
        assert_eq!(result.result_code, ResultCode::NotFound);
        assert_eq!(result.record, CaseRecord::default());
    }

    #[test]
    fn process_path_reports_unsupported_input() {
        let path = std::env::temp_dir().join(format!("maegak_{}_input.txt", std::process::id()));
        std::fs::write(&path, "plain text").unwrap();
        let result = process_path(&extractor(), &path);
        std::fs::remove_file(&path).unwrap();

        assert_eq!(result.result_code, ResultCode::UnexpectedError);
        assert!(result.result_msg.contains("Unsupported input"));
    }

    #[test]
    fn envelope_serializes_flat() {
        let result = process_path(&extractor(), &fixture_path("multi_page.json"));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["result_code"], 200);
        assert_eq!(json["case_no"], "2024타경2433827");
        assert!(json.get("judge").is_none());
    }

    #[test]
    fn panic_payload_becomes_message() {
        let payload = catch_unwind(|| -> u8 { panic!("boom") }).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "boom");
    }
}
