//! Keyword/header locator.
//!
//! Finds field labels in table rows or positioned lines. Matching is
//! substring containment after whitespace is removed from both the cell and
//! the keyword, and the first match in scan order wins (top-to-bottom, then
//! left-to-right within a row).

use maegak_pdf_models::{PositionedLine, Row};

use crate::patterns::compact;

/// Position of a matched cell within a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPos {
    /// Row index.
    pub row: usize,
    /// Column index within the row.
    pub col: usize,
}

/// Iterates every cell matching `keyword`, in scan order.
pub fn locate_all_in_rows<'a>(
    rows: &'a [Row],
    keyword: &str,
) -> impl Iterator<Item = CellPos> + 'a {
    let needle = compact(keyword);
    rows.iter().enumerate().flat_map(move |(r, row)| {
        let needle = needle.clone();
        row.iter().enumerate().filter_map(move |(c, cell)| {
            (!needle.is_empty() && compact(cell).contains(&needle))
                .then_some(CellPos { row: r, col: c })
        })
    })
}

/// Returns the first cell matching `keyword`.
#[must_use]
pub fn locate_in_rows(rows: &[Row], keyword: &str) -> Option<CellPos> {
    locate_all_in_rows(rows, keyword).next()
}

/// Returns the index of the first row at or after `from` whose cell `col`
/// contains any of `keywords`.
#[must_use]
pub fn locate_in_column<S: AsRef<str>>(
    rows: &[Row],
    col: usize,
    keywords: &[S],
    from: usize,
) -> Option<usize> {
    let needles: Vec<String> = keywords
        .iter()
        .map(|k| compact(k.as_ref()))
        .filter(|k| !k.is_empty())
        .collect();

    rows.iter()
        .enumerate()
        .skip(from)
        .find(|(_, row)| {
            row.get(col).is_some_and(|cell| {
                let cell = compact(cell);
                needles.iter().any(|n| cell.contains(n.as_str()))
            })
        })
        .map(|(i, _)| i)
}

/// Returns the first line whose text contains `keyword`.
#[must_use]
pub fn locate_in_lines<'a>(lines: &'a [PositionedLine], keyword: &str) -> Option<&'a PositionedLine> {
    let needle = compact(keyword);
    if needle.is_empty() {
        return None;
    }
    lines.iter().find(|l| compact(&l.text).contains(&needle))
}

/// Returns the first line whose text contains any of `keywords`.
#[must_use]
pub fn locate_any_in_lines<'a, S: AsRef<str>>(
    lines: &'a [PositionedLine],
    keywords: &[S],
) -> Option<&'a PositionedLine> {
    let needles: Vec<String> = keywords
        .iter()
        .map(|k| compact(k.as_ref()))
        .filter(|k| !k.is_empty())
        .collect();
    lines.iter().find(|l| {
        let text = compact(&l.text);
        needles.iter().any(|n| text.contains(n.as_str()))
    })
}
