#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Layout primitives and extracted record types for court-auction
//! sale-object specification PDFs (매각물건명세서).
//!
//! Two families of types live here:
//!
//! - **Layout primitives** produced by an external layout engine: raw pages
//!   ([`RawPage`]) whose table cells may be absent, and their normalized
//!   counterparts ([`Page`], [`Table`], [`PositionedLine`]).
//! - **Extracted records**: the [`CaseRecord`] with its [`OccupantRecord`]
//!   and [`AuctionRound`] collections, wrapped in a [`ParseResult`] envelope
//!   that carries a [`ResultCode`].

use serde::{Deserialize, Serialize};
use strum_macros::Display;

// ── Layout primitives ────────────────────────────────────────────────────

/// One visually contiguous run of glyphs on a page.
///
/// `x0`/`y0` are the top-left anchor in page units; `y0` grows downwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedLine {
    /// The text of the run.
    pub text: String,
    /// Left edge.
    pub x0: f64,
    /// Top edge.
    pub y0: f64,
}

impl PositionedLine {
    /// Creates a new line.
    #[must_use]
    pub fn new(text: &str, x0: f64, y0: f64) -> Self {
        Self {
            text: text.to_owned(),
            x0,
            y0,
        }
    }
}

/// An ordered sequence of cell strings. The cell count is diagnostic of the
/// document template that produced the row.
pub type Row = Vec<String>;

/// A ruled table: rows of normalized cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Rows in top-to-bottom order.
    pub rows: Vec<Row>,
}

impl Table {
    /// Creates a table from rows.
    #[must_use]
    pub const fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Number of columns (cell count of the widest row).
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One normalized page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Zero-based page index within the document.
    pub index: usize,
    /// Ruled tables found on the page, in reading order.
    pub tables: Vec<Table>,
    /// Positioned text lines, sorted by `y0` then `x0`.
    pub lines: Vec<PositionedLine>,
    /// Whole-page raw text (used by the round scanner).
    pub text: String,
}

impl Page {
    /// Whether the page carried nothing usable. Callers skip such pages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.iter().all(Table::is_empty) && self.lines.is_empty() && self.text.is_empty()
    }
}

/// A normalized document: pages in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Pages in document order.
    pub pages: Vec<Page>,
}

/// A raw table cell as emitted by the layout engine. `None` means the cell
/// is absent (merged or unruled), which is distinct from an empty string.
pub type RawCell = Option<String>;

/// A page exactly as the external layout engine emitted it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPage {
    /// Tables as grids of optional cells.
    #[serde(default)]
    pub tables: Vec<Vec<Vec<RawCell>>>,
    /// Positioned text lines in emission order.
    #[serde(default)]
    pub lines: Vec<PositionedLine>,
    /// Whole-page text, if the engine provides it.
    #[serde(default)]
    pub text: Option<String>,
}

/// A layout dump: the JSON interchange format read from disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    /// Pages in document order.
    #[serde(default)]
    pub pages: Vec<RawPage>,
}

// ── Extracted records ────────────────────────────────────────────────────

/// One occupant/tenant entry of the occupancy table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupantRecord {
    /// Occupant name (forward-filled from the previous row when blank).
    pub name: String,
    /// Occupied part of the property (점유부분).
    pub unit: String,
    /// Where the information came from (정보출처).
    pub info_source: String,
    /// Title of occupancy (점유의 권원).
    pub occupancy_type: String,
    /// Move-in report date (전입신고).
    pub move_in_date: String,
    /// Fixed date (확정일자).
    pub confirmed_date: String,
    /// Dividend claim date (배당요구).
    pub dividend_claim_date: String,
    /// Lease deposit (보증금).
    pub deposit: String,
    /// Rent (차임).
    pub rent: String,
}

impl OccupantRecord {
    /// Appends every field of `tail` onto this record, space-joined.
    ///
    /// Used when the tail of a record continues on the next page.
    pub fn append_continuation(&mut self, tail: &Self) {
        join_onto(&mut self.name, &tail.name);
        join_onto(&mut self.unit, &tail.unit);
        join_onto(&mut self.info_source, &tail.info_source);
        join_onto(&mut self.occupancy_type, &tail.occupancy_type);
        join_onto(&mut self.move_in_date, &tail.move_in_date);
        join_onto(&mut self.confirmed_date, &tail.confirmed_date);
        join_onto(&mut self.dividend_claim_date, &tail.dividend_claim_date);
        join_onto(&mut self.deposit, &tail.deposit);
        join_onto(&mut self.rent, &tail.rent);
    }

    fn sanitize(&mut self) {
        for field in [
            &mut self.name,
            &mut self.unit,
            &mut self.info_source,
            &mut self.occupancy_type,
            &mut self.move_in_date,
            &mut self.confirmed_date,
            &mut self.dividend_claim_date,
            &mut self.deposit,
            &mut self.rent,
        ] {
            sanitize_text(field);
        }
    }
}

/// One auction round (회차) with its date and prices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionRound {
    /// Round label, e.g. `"1회"`.
    pub round_no: String,
    /// Sale date, `YYYY.MM.DD`.
    pub auction_date: String,
    /// Minimum bid price, digits only.
    pub min_bid_price: String,
    /// Bid deposit, digits only. Empty unless it is below `min_bid_price`.
    pub bid_deposit: String,
}

impl AuctionRound {
    /// Whether this round has the same `(round_no, auction_date)` key as
    /// `other`.
    #[must_use]
    pub fn same_round(&self, other: &Self) -> bool {
        self.round_no == other.round_no && self.auction_date == other.auction_date
    }
}

/// The structured record extracted from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Case number (사건번호), e.g. `"2025타경100211"`.
    pub case_no: String,
    /// Sale item number (물건번호).
    pub item_no: String,
    /// Earliest-established right date and its kind (최선순위 설정).
    pub priority_date: String,
    /// Dividend claim deadline (배당요구종기).
    pub dividend_end_date: String,
    /// Document date (작성일자).
    pub document_date: String,
    /// Presiding judge (담임법관), when the positioned-line parser finds it.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub judge: String,
    /// Occupant table entries in document order.
    pub occupants: Vec<OccupantRecord>,
    /// Tenant note following the occupant table (`<비고>`).
    pub tenant_note: String,
    /// Registered rights that survive the sale.
    pub surviving_rights: String,
    /// Summary of the statutory surface right created by the sale.
    pub surface_right_summary: String,
    /// Trailing general note (비고란).
    pub general_note: String,
    /// Auction rounds, unique by `(round_no, auction_date)`.
    pub auction_rounds: Vec<AuctionRound>,
}

impl CaseRecord {
    /// Appends `round` unless a round with the same key is already present.
    ///
    /// Returns `true` when the round was appended.
    pub fn push_round(&mut self, round: AuctionRound) -> bool {
        if self.auction_rounds.iter().any(|r| r.same_round(&round)) {
            return false;
        }
        self.auction_rounds.push(round);
        true
    }

    /// Replaces `U+2024` (one dot leader) with `.` and no-break spaces with
    /// plain spaces in every string, then trims.
    pub fn sanitize(&mut self) {
        for field in [
            &mut self.case_no,
            &mut self.item_no,
            &mut self.priority_date,
            &mut self.dividend_end_date,
            &mut self.document_date,
            &mut self.judge,
            &mut self.tenant_note,
            &mut self.surviving_rights,
            &mut self.surface_right_summary,
            &mut self.general_note,
        ] {
            sanitize_text(field);
        }
        for occupant in &mut self.occupants {
            occupant.sanitize();
        }
        for round in &mut self.auction_rounds {
            sanitize_text(&mut round.auction_date);
        }
    }
}

/// Stores `candidate` into `slot` only if `slot` is still empty and
/// `candidate` is not. The first non-empty value wins.
pub fn keep_first(slot: &mut String, candidate: &str) {
    if slot.is_empty() && !candidate.is_empty() {
        candidate.clone_into(slot);
    }
}

/// Space-joins `tail` onto `head`, trimming the result.
pub fn join_onto(head: &mut String, tail: &str) {
    let joined = format!("{head} {tail}");
    *head = joined.trim().to_owned();
}

fn sanitize_text(s: &mut String) {
    let cleaned = s.replace('\u{2024}', ".").replace('\u{a0}', " ");
    *s = cleaned.trim().to_owned();
}

// ── Result envelope ──────────────────────────────────────────────────────

/// Outcome status of a single document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(into = "u16", try_from = "u16")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultCode {
    /// Extraction ran to completion.
    Success,
    /// The source document could not be located.
    NotFound,
    /// Extraction stopped on an unexpected fault.
    UnexpectedError,
}

impl ResultCode {
    /// The numeric status code.
    #[must_use]
    pub const fn value(self) -> u16 {
        match self {
            Self::Success => 200,
            Self::NotFound => 404,
            Self::UnexpectedError => 999,
        }
    }
}

impl From<ResultCode> for u16 {
    fn from(code: ResultCode) -> Self {
        code.value()
    }
}

/// Error returned when a numeric status code is not one of 200/404/999.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidResultCodeError {
    /// The rejected value.
    pub value: u16,
}

impl std::fmt::Display for InvalidResultCodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid result code {}: expected 200, 404 or 999", self.value)
    }
}

impl std::error::Error for InvalidResultCodeError {}

impl TryFrom<u16> for ResultCode {
    type Error = InvalidResultCodeError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            200 => Ok(Self::Success),
            404 => Ok(Self::NotFound),
            999 => Ok(Self::UnexpectedError),
            _ => Err(InvalidResultCodeError { value }),
        }
    }
}

/// Message reported with [`ResultCode::Success`].
pub const SUCCESS_MESSAGE: &str = "정상처리되었습니다.";

/// Message reported with [`ResultCode::NotFound`].
pub const NOT_FOUND_MESSAGE: &str = "해당 파일이 없습니다.";

/// The per-document result envelope.
///
/// The record's fields are flattened next to the status fields so the JSON
/// output is a single flat object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    /// Status code (200, 404 or 999).
    pub result_code: ResultCode,
    /// Human-readable status or the fault's message.
    pub result_msg: String,
    /// Path of the source document.
    pub source_path: String,
    /// Whatever was extracted, possibly partial.
    #[serde(flatten)]
    pub record: CaseRecord,
}

impl ParseResult {
    /// A completed extraction.
    #[must_use]
    pub fn success(source_path: &str, record: CaseRecord) -> Self {
        Self {
            result_code: ResultCode::Success,
            result_msg: SUCCESS_MESSAGE.to_owned(),
            source_path: source_path.to_owned(),
            record,
        }
    }

    /// The source document does not exist.
    #[must_use]
    pub fn not_found(source_path: &str) -> Self {
        Self {
            result_code: ResultCode::NotFound,
            result_msg: NOT_FOUND_MESSAGE.to_owned(),
            source_path: source_path.to_owned(),
            record: CaseRecord::default(),
        }
    }

    /// Extraction stopped on a fault; `record` keeps what was filled so far.
    #[must_use]
    pub fn failed(source_path: &str, message: &str, record: CaseRecord) -> Self {
        Self {
            result_code: ResultCode::UnexpectedError,
            result_msg: message.to_owned(),
            source_path: source_path.to_owned(),
            record,
        }
    }

    /// Whether extraction completed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result_code == ResultCode::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(no: &str, date: &str) -> AuctionRound {
        AuctionRound {
            round_no: no.to_string(),
            auction_date: date.to_string(),
            min_bid_price: "100000000".to_string(),
            bid_deposit: String::new(),
        }
    }

    #[test]
    fn push_round_skips_duplicate_keys() {
        let mut record = CaseRecord::default();
        assert!(record.push_round(round("1회", "2024.03.01")));
        assert!(!record.push_round(round("1회", "2024.03.01")));
        assert!(record.push_round(round("2회", "2024.04.01")));
        assert!(record.push_round(round("1회", "2024.05.01")));
        assert_eq!(record.auction_rounds.len(), 3);
    }

    #[test]
    fn keep_first_never_overwrites() {
        let mut slot = String::new();
        keep_first(&mut slot, "");
        assert!(slot.is_empty());
        keep_first(&mut slot, "2025타경100211");
        keep_first(&mut slot, "2024타경1");
        assert_eq!(slot, "2025타경100211");
    }

    #[test]
    fn continuation_is_space_joined() {
        let mut head = OccupantRecord {
            name: "김철수".to_string(),
            unit: "2층".to_string(),
            deposit: "30,000,000".to_string(),
            ..OccupantRecord::default()
        };
        let tail = OccupantRecord {
            unit: "전부".to_string(),
            move_in_date: "2021.05.06".to_string(),
            ..OccupantRecord::default()
        };
        head.append_continuation(&tail);
        assert_eq!(head.name, "김철수");
        assert_eq!(head.unit, "2층 전부");
        assert_eq!(head.move_in_date, "2021.05.06");
        assert_eq!(head.deposit, "30,000,000");
    }

    #[test]
    fn sanitize_replaces_leader_dots_and_nbsp() {
        let mut record = CaseRecord {
            document_date: "2024\u{2024}01\u{2024}05\u{a0}".to_string(),
            ..CaseRecord::default()
        };
        record.occupants.push(OccupantRecord {
            name: "\u{a0}홍길동".to_string(),
            ..OccupantRecord::default()
        });
        record.sanitize();
        assert_eq!(record.document_date, "2024.01.05");
        assert_eq!(record.occupants[0].name, "홍길동");
    }

    #[test]
    fn result_code_serializes_as_number() {
        let result = ParseResult::not_found("missing.pdf");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["result_code"], 404);
        assert_eq!(json["result_msg"], NOT_FOUND_MESSAGE);
        assert_eq!(json["case_no"], "");
        assert!(json.get("judge").is_none());

        let back: ParseResult = serde_json::from_value(json).unwrap();
        assert_eq!(back.result_code, ResultCode::NotFound);
    }

    #[test]
    fn result_code_displays_as_constant_name() {
        assert_eq!(ResultCode::NotFound.to_string(), "NOT_FOUND");
        assert_eq!(ResultCode::UnexpectedError.to_string(), "UNEXPECTED_ERROR");
    }

    #[test]
    fn rejects_unknown_result_code() {
        assert!(ResultCode::try_from(500).is_err());
        assert_eq!(ResultCode::try_from(999).unwrap(), ResultCode::UnexpectedError);
    }

    #[test]
    fn raw_page_defaults_missing_sections() {
        let page: RawPage = serde_json::from_str(r#"{"tables": [[["사건", null]]]}"#).unwrap();
        assert_eq!(page.tables[0][0][1], None);
        assert!(page.lines.is_empty());
        assert!(page.text.is_none());
    }
}
