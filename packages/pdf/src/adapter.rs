//! Layout primitive adapter.
//!
//! Turns whatever the external layout engine emitted for a page into a
//! normalised [`Page`]. Only structure changes here: cells are trimmed,
//! embedded line breaks collapse to single spaces, absent cells become
//! empty strings, ragged rows are padded to the table's width and lines
//! are ordered top-to-bottom, then left-to-right.

use maegak_pdf_models::{Document, Page, RawCell, RawDocument, RawPage, Row, Table};

/// Normalises one cell value.
///
/// Each line break, together with the whitespace around it, becomes one
/// space. Real line breaks count, and so does the two-character `\n`
/// sequence some exporters leave behind. Spacing inside a line is kept.
#[must_use]
pub fn normalize_cell(cell: &RawCell) -> String {
    let Some(value) = cell else {
        return String::new();
    };
    value
        .replace("\\n", "\n")
        .split(['\n', '\r'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalises every cell and pads each row to the widest row's length.
#[must_use]
pub fn normalize_table(raw: &[Vec<RawCell>]) -> Table {
    let width = raw.iter().map(Vec::len).max().unwrap_or(0);
    let rows = raw
        .iter()
        .map(|row| {
            let mut cells: Row = row.iter().map(normalize_cell).collect();
            cells.resize(width, String::new());
            cells
        })
        .collect();
    Table::new(rows)
}

/// Normalises one page of layout output.
#[must_use]
pub fn normalize_page(index: usize, raw: RawPage) -> Page {
    let tables = raw
        .tables
        .iter()
        .map(|t| normalize_table(t))
        .filter(|t| !t.is_empty())
        .collect();

    let mut lines = raw.lines;
    for line in &mut lines {
        line.text = line.text.trim().to_owned();
    }
    lines.retain(|l| !l.text.is_empty());
    lines.sort_by(|a, b| a.y0.total_cmp(&b.y0).then(a.x0.total_cmp(&b.x0)));

    Page {
        index,
        tables,
        lines,
        text: raw.text.unwrap_or_default(),
    }
}

/// Normalises every page of a layout dump.
#[must_use]
pub fn normalize_document(raw: RawDocument) -> Document {
    Document {
        pages: raw
            .pages
            .into_iter()
            .enumerate()
            .map(|(i, p)| normalize_page(i, p))
            .collect(),
    }
}
