//! Occupant table decoder.
//!
//! Walks the rows between the `점유자` header and the first terminator
//! marker, classifies each by cell count through the [`LayoutTable`] and
//! produces [`OccupantRecord`]s. The block may span pages, so the decoder
//! threads a [`PageCarryState`] from one table to the next.

use maegak_pdf_models::{OccupantRecord, Row};
use serde::Deserialize;

use crate::layout::{DecodedRow, LayoutTable, cell};
use crate::locate::locate_in_column;
use crate::patterns::contains_any;

/// Markers that bound the occupant block of a table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OccupantBlockConfig {
    /// Text in cell 0 of the header row.
    pub header_marker: String,
    /// Text in cell 0 of the first row after the block.
    pub terminators: Vec<String>,
    /// Rows whose text contains any of these are repeated headers.
    #[serde(default)]
    pub skip_markers: Vec<String>,
}

/// State carried across tables and pages while decoding one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageCarryState {
    /// The most recent non-empty name cell; blank name cells inherit it.
    pub current_name: String,
    /// The header was seen and no terminator has followed yet.
    pub occupant_block_open: bool,
    /// No occupant row has been classified since the page started.
    ///
    /// Set once per page, not per table, and cleared by the first
    /// classified row of any shape. Only that row can merge as a
    /// continuation.
    pub page_turned: bool,
}

impl PageCarryState {
    /// Marks the start of a new page.
    #[must_use]
    pub fn turn_page(self) -> Self {
        Self {
            page_turned: true,
            ..self
        }
    }
}

/// Decodes occupant rows with a fixed set of layout variants.
#[derive(Debug, Clone, Copy)]
pub struct OccupantDecoder<'a> {
    block: &'a OccupantBlockConfig,
    layouts: &'a LayoutTable,
}

impl<'a> OccupantDecoder<'a> {
    /// Creates a decoder.
    #[must_use]
    pub const fn new(block: &'a OccupantBlockConfig, layouts: &'a LayoutTable) -> Self {
        Self { block, layouts }
    }

    /// Decodes the occupant rows of one table, appending to `occupants`.
    ///
    /// A table with a header row starts a block; a table without one
    /// continues the block only if it is still open from an earlier table.
    #[must_use]
    pub fn decode_table(
        &self,
        rows: &[Row],
        mut carry: PageCarryState,
        occupants: &mut Vec<OccupantRecord>,
    ) -> PageCarryState {
        let header = locate_in_column(rows, 0, std::slice::from_ref(&self.block.header_marker), 0);

        let start = match header {
            Some(idx) => {
                carry.occupant_block_open = true;
                idx + 1
            }
            None if carry.occupant_block_open => 0,
            None => return carry,
        };

        let end = match locate_in_column(rows, 0, &self.block.terminators, start) {
            Some(idx) => {
                carry.occupant_block_open = false;
                idx
            }
            None => rows.len(),
        };

        log::debug!(
            "Decoding occupant rows {start}..{end} (block open: {})",
            carry.occupant_block_open
        );

        for row in &rows[start..end] {
            carry = self.decode_row(row, carry, occupants);
        }

        carry
    }

    /// Classifies one row and either appends a new record, merges it into
    /// the previous one, or skips it.
    #[must_use]
    pub fn decode_row(
        &self,
        row: &Row,
        mut carry: PageCarryState,
        occupants: &mut Vec<OccupantRecord>,
    ) -> PageCarryState {
        let joined = row.concat();
        if joined.is_empty() || contains_any(&joined, &self.block.skip_markers) {
            return carry;
        }

        let variant = self.layouts.select(row.len());

        if let Some(variant) = variant
            && carry.page_turned
            && variant.looks_like_continuation(row)
            && let Some(last) = occupants.last_mut()
            && let Some(tail) = variant.decode_continuation(row)
        {
            log::debug!("Merging continuation row into occupant '{}'", last.name);
            last.append_continuation(&tail);
            last.name.clone_into(&mut carry.current_name);
            carry.page_turned = false;
            return carry;
        }

        carry.page_turned = false;

        let name = cell(row, 0);
        if !name.is_empty() {
            name.clone_into(&mut carry.current_name);
        }

        let decoded = if let Some(variant) = variant {
            variant.decode(row)
        } else {
            log::warn!(
                "Unknown occupant row shape with {} cells; add a layout variant for it",
                row.len()
            );
            DecodedRow::default()
        };

        if !carry.current_name.is_empty() {
            occupants.push(decoded.into_record(&carry.current_name));
        }

        carry
    }
}
