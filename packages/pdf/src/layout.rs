//! Occupant-table layout variants.
//!
//! Each document template revision lays the occupant table out with a
//! different number of cells per row. A [`LayoutVariant`] is the offset
//! table for one such shape; the variant is selected purely by cell count.
//! Adding a template revision is a configuration change.

use maegak_pdf_models::{OccupantRecord, Row};
use serde::Deserialize;

use crate::patterns::{is_date_like, strip_separators};

/// Offset fallback chains for the fields of one row shape.
///
/// Each field lists cell offsets in priority order; the first non-empty
/// cell wins. An empty list leaves the field blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FieldOffsets {
    /// 점유부분
    #[serde(default)]
    pub unit: Vec<usize>,
    /// 정보출처
    #[serde(default)]
    pub info_source: Vec<usize>,
    /// 점유의 권원
    #[serde(default)]
    pub occupancy_type: Vec<usize>,
    /// 임대차기간
    #[serde(default)]
    pub lease_period: Vec<usize>,
    /// 보증금
    #[serde(default)]
    pub deposit: Vec<usize>,
    /// 차임
    #[serde(default)]
    pub rent: Vec<usize>,
    /// 전입신고
    #[serde(default)]
    pub move_in_date: Vec<usize>,
    /// 확정일자
    #[serde(default)]
    pub confirmed_date: Vec<usize>,
    /// 배당요구
    #[serde(default)]
    pub dividend_claim_date: Vec<usize>,
}

impl FieldOffsets {
    fn all(&self) -> impl Iterator<Item = usize> + '_ {
        [
            &self.unit,
            &self.info_source,
            &self.occupancy_type,
            &self.lease_period,
            &self.deposit,
            &self.rent,
            &self.move_in_date,
            &self.confirmed_date,
            &self.dividend_claim_date,
        ]
        .into_iter()
        .flatten()
        .copied()
    }
}

/// Offsets used when a row is the tail of the previous page's last
/// occupant rather than a new occupant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContinuationOffsets {
    /// The cell that must be blank for the row to count as a continuation.
    pub blank_cell: usize,
    /// Name fragment.
    pub name: usize,
    /// 점유부분
    pub unit: usize,
    /// 정보출처
    pub info_source: usize,
    /// 점유의 권원
    pub occupancy_type: usize,
    /// 보증금
    pub deposit: usize,
    /// 차임
    pub rent: usize,
    /// 전입신고
    pub move_in_date: usize,
    /// 확정일자
    pub confirmed_date: usize,
    /// 배당요구
    pub dividend_claim_date: usize,
}

impl ContinuationOffsets {
    fn all(&self) -> [usize; 10] {
        [
            self.blank_cell,
            self.name,
            self.unit,
            self.info_source,
            self.occupancy_type,
            self.deposit,
            self.rent,
            self.move_in_date,
            self.confirmed_date,
            self.dividend_claim_date,
        ]
    }
}

/// One known occupant-row shape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LayoutVariant {
    /// Short identifier used in logs.
    pub name: String,
    /// Cell count that selects this variant.
    pub cells: usize,
    /// Whether thousands separators are removed from the deposit.
    #[serde(default)]
    pub strip_deposit_separators: bool,
    /// Offsets for a self-contained occupant row.
    pub fields: FieldOffsets,
    /// Offsets for a cross-page continuation row, if this shape can be one.
    #[serde(default)]
    pub continuation: Option<ContinuationOffsets>,
}

/// The fields decoded from one occupant row (everything but the name).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedRow {
    /// 점유부분
    pub unit: String,
    /// 정보출처
    pub info_source: String,
    /// 점유의 권원
    pub occupancy_type: String,
    /// 임대차기간 (decoded but not part of the output record)
    pub lease_period: String,
    /// 보증금
    pub deposit: String,
    /// 차임
    pub rent: String,
    /// 전입신고
    pub move_in_date: String,
    /// 확정일자
    pub confirmed_date: String,
    /// 배당요구
    pub dividend_claim_date: String,
}

impl DecodedRow {
    /// Builds the output record for occupant `name`.
    #[must_use]
    pub fn into_record(self, name: &str) -> OccupantRecord {
        OccupantRecord {
            name: name.to_owned(),
            unit: self.unit,
            info_source: self.info_source,
            occupancy_type: self.occupancy_type,
            move_in_date: self.move_in_date,
            confirmed_date: self.confirmed_date,
            dividend_claim_date: self.dividend_claim_date,
            deposit: self.deposit,
            rent: self.rent,
        }
    }
}

/// Returns cell `index` of `row`, or `""` when the row is shorter.
#[must_use]
pub fn cell(row: &Row, index: usize) -> &str {
    row.get(index).map_or("", String::as_str)
}

/// Returns the first non-empty cell among `chain`, or `""`.
#[must_use]
pub fn first_filled<'a>(row: &'a Row, chain: &[usize]) -> &'a str {
    chain
        .iter()
        .map(|&i| cell(row, i))
        .find(|c| !c.is_empty())
        .unwrap_or("")
}

/// Like [`first_filled`], but skips date-shaped cells. A deposit never
/// holds a date; a lease period drifting into the deposit column does.
#[must_use]
pub fn first_amount<'a>(row: &'a Row, chain: &[usize]) -> &'a str {
    chain
        .iter()
        .map(|&i| cell(row, i))
        .find(|c| !c.is_empty() && !is_date_like(c))
        .unwrap_or("")
}

impl LayoutVariant {
    /// Maps a self-contained occupant row onto its fields.
    #[must_use]
    pub fn decode(&self, row: &Row) -> DecodedRow {
        let f = &self.fields;
        let deposit = first_amount(row, &f.deposit);
        DecodedRow {
            unit: first_filled(row, &f.unit).to_owned(),
            info_source: first_filled(row, &f.info_source).to_owned(),
            occupancy_type: first_filled(row, &f.occupancy_type).to_owned(),
            lease_period: first_filled(row, &f.lease_period).to_owned(),
            deposit: if self.strip_deposit_separators {
                strip_separators(deposit)
            } else {
                deposit.to_owned()
            },
            rent: first_filled(row, &f.rent).to_owned(),
            move_in_date: first_filled(row, &f.move_in_date).to_owned(),
            confirmed_date: first_filled(row, &f.confirmed_date).to_owned(),
            dividend_claim_date: first_filled(row, &f.dividend_claim_date).to_owned(),
        }
    }

    /// Whether `row` has the continuation shape: a continuation table is
    /// declared and its marker cell is blank.
    #[must_use]
    pub fn looks_like_continuation(&self, row: &Row) -> bool {
        self.continuation
            .as_ref()
            .is_some_and(|c| cell(row, c.blank_cell).is_empty())
    }

    /// Maps a continuation row onto a record fragment to be appended to the
    /// previous occupant. Returns `None` when this variant has no
    /// continuation offsets.
    #[must_use]
    pub fn decode_continuation(&self, row: &Row) -> Option<OccupantRecord> {
        let c = self.continuation.as_ref()?;
        Some(OccupantRecord {
            name: cell(row, c.name).to_owned(),
            unit: cell(row, c.unit).to_owned(),
            info_source: cell(row, c.info_source).to_owned(),
            occupancy_type: cell(row, c.occupancy_type).to_owned(),
            move_in_date: cell(row, c.move_in_date).to_owned(),
            confirmed_date: cell(row, c.confirmed_date).to_owned(),
            dividend_claim_date: cell(row, c.dividend_claim_date).to_owned(),
            deposit: cell(row, c.deposit).to_owned(),
            rent: cell(row, c.rent).to_owned(),
        })
    }

    /// Checks that every offset addresses a cell of this shape.
    ///
    /// # Errors
    ///
    /// Returns a description of the first out-of-range offset.
    pub fn validate(&self) -> Result<(), String> {
        let continuation = self.continuation.iter().flat_map(ContinuationOffsets::all);

        match self.fields.all().chain(continuation).find(|&i| i >= self.cells) {
            Some(i) => Err(format!(
                "layout variant '{}' ({} cells) references cell {i}",
                self.name, self.cells
            )),
            None => Ok(()),
        }
    }
}

/// The set of known row shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutTable {
    variants: Vec<LayoutVariant>,
}

impl LayoutTable {
    /// Builds a table, rejecting out-of-range offsets and duplicate cell
    /// counts.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid variant.
    pub fn new(variants: Vec<LayoutVariant>) -> Result<Self, String> {
        for (i, variant) in variants.iter().enumerate() {
            variant.validate()?;
            if variants[..i].iter().any(|v| v.cells == variant.cells) {
                return Err(format!(
                    "layout variant '{}' duplicates cell count {}",
                    variant.name, variant.cells
                ));
            }
        }
        Ok(Self { variants })
    }

    /// The variant for rows of `cells` cells.
    #[must_use]
    pub fn select(&self, cells: usize) -> Option<&LayoutVariant> {
        self.variants.iter().find(|v| v.cells == cells)
    }

    /// All variants in configuration order.
    #[must_use]
    pub fn variants(&self) -> &[LayoutVariant] {
        &self.variants
    }
}
