//! Text-strategy table fallback.
//!
//! When a page has no ruled table geometry (a PDF read as plain text), rows
//! are recovered from the text itself: every non-empty line is a row and
//! runs of two or more spaces separate its cells. The cell counts this
//! yields are only as good as the text layout, so rows are not padded.

use std::sync::LazyLock;

use maegak_pdf_models::{Page, Row, Table};
use regex::Regex;

static CELL_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{a0}]{2,}").unwrap_or_else(|_| unreachable!()));

/// Splits `text` into rows of cells.
#[must_use]
pub fn rows_from_text(text: &str) -> Vec<Row> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            CELL_GAP
                .split(line.trim())
                .map(|cell| cell.trim().to_owned())
                .collect()
        })
        .collect()
}

/// Builds a page from raw text alone: one table of text-derived rows plus
/// the text itself for the round scanner.
#[must_use]
pub fn page_from_text(index: usize, text: String) -> Page {
    let rows = rows_from_text(&text);
    let tables = if rows.is_empty() {
        Vec::new()
    } else {
        vec![Table::new(rows)]
    };

    Page {
        index,
        tables,
        lines: Vec::new(),
        text,
    }
}
