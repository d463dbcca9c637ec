//! Positioned-line fallback for pages without ruled tables.
//!
//! Header fields and free-text sections are found through a label line and
//! a [`PositionedStrategy`]. The occupant table is rebuilt from coordinates:
//! each column is an x-range, and logical rows start at lines that fall in
//! the anchor band.

use maegak_pdf_models::{CaseRecord, OccupantRecord, PositionedLine, keep_first};
use serde::Deserialize;

use crate::fields::{PositionedStrategy, RecordField};
use crate::layout::DecodedRow;
use crate::locate::{locate_any_in_lines, locate_in_lines};

/// One field read from positioned lines.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PositionedField {
    /// Record field to fill.
    pub target: RecordField,
    /// Label text to anchor on.
    pub label: String,
    /// How the value is found relative to the label.
    pub strategy: PositionedStrategy,
}

/// Horizontal extent `[min, max]` of each occupant column.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColumnRanges {
    /// 점유자
    pub name: [f64; 2],
    /// 점유부분
    pub unit: [f64; 2],
    /// 정보출처
    pub info_source: [f64; 2],
    /// 점유의 권원
    pub occupancy_type: [f64; 2],
    /// 임대차기간
    pub lease_period: [f64; 2],
    /// 보증금
    pub deposit: [f64; 2],
    /// 차임
    pub rent: [f64; 2],
    /// 전입신고
    pub move_in_date: [f64; 2],
    /// 확정일자
    pub confirmed_date: [f64; 2],
    /// 배당요구
    pub dividend_claim_date: [f64; 2],
}

/// Geometry of the occupant block on positioned pages.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PositionedOccupantsConfig {
    /// Any of these marks the header line.
    pub header_markers: Vec<String>,
    /// Distance from the header line to the first data line.
    pub header_offset: f64,
    /// A line with exactly this text ends the block.
    pub end_marker: String,
    /// Block end when no end marker is on the page.
    pub page_bottom: f64,
    /// Lines whose x0 lies in this band may start a logical row.
    pub anchor_x: [f64; 2],
    /// Minimum vertical distance between two row starts.
    pub row_gap: f64,
    /// A row also takes lines this far above its start.
    pub row_top_slack: f64,
    /// A row stops this far above the next row's start.
    pub row_bottom_slack: f64,
    /// Column x-ranges.
    pub columns: ColumnRanges,
}

/// Positioned-line settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PositionedConfig {
    /// Field extractors, applied in order.
    #[serde(rename = "field", default)]
    pub fields: Vec<PositionedField>,
    /// Occupant block geometry.
    pub occupants: PositionedOccupantsConfig,
}

/// Occupant state carried across positioned pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionedCarry {
    /// Most recent non-empty name.
    pub current_name: String,
    /// A header line has been seen.
    pub block_started: bool,
    /// The end marker has been seen; later pages are not scanned.
    pub block_closed: bool,
}

/// Fills still-empty record fields from the configured extractors.
pub fn extract_fields(lines: &[PositionedLine], fields: &[PositionedField], record: &mut CaseRecord) {
    for field in fields {
        let Some(label) = locate_in_lines(lines, &field.label) else {
            continue;
        };
        if let Some(value) = field.strategy.extract(lines, label) {
            log::debug!("Positioned field {} = {value:?}", field.target);
            keep_first(field.target.slot(record), &value);
        }
    }
}

fn within(x: f64, range: [f64; 2]) -> bool {
    range[0] <= x && x <= range[1]
}

fn column_text(row: &[&PositionedLine], range: [f64; 2]) -> String {
    row.iter()
        .filter(|l| within(l.x0, range))
        .map(|l| l.text.trim())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rebuilds occupant rows from coordinates, appending to `occupants`.
///
/// Lines must be in page order (sorted by `y0`).
#[must_use]
pub fn decode_occupants(
    lines: &[PositionedLine],
    config: &PositionedOccupantsConfig,
    mut carry: PositionedCarry,
    occupants: &mut Vec<OccupantRecord>,
) -> PositionedCarry {
    if carry.block_closed {
        return carry;
    }

    let header_y = match locate_any_in_lines(lines, &config.header_markers) {
        Some(header) => {
            carry.block_started = true;
            header.y0 + config.header_offset
        }
        None if carry.block_started => f64::NEG_INFINITY,
        None => return carry,
    };

    let end_y = match lines.iter().find(|l| l.text.trim() == config.end_marker) {
        Some(end) => {
            carry.block_closed = true;
            end.y0
        }
        None => config.page_bottom,
    };

    let body: Vec<&PositionedLine> = lines
        .iter()
        .filter(|l| header_y < l.y0 && l.y0 < end_y)
        .collect();

    let mut starts: Vec<f64> = Vec::new();
    for line in &body {
        if within(line.x0, config.anchor_x)
            && !starts.iter().any(|y| (line.y0 - y).abs() < config.row_gap)
        {
            starts.push(line.y0);
        }
    }
    starts.sort_by(f64::total_cmp);

    log::debug!("Positioned occupant block has {} rows", starts.len());

    let c = &config.columns;
    for (i, &top) in starts.iter().enumerate() {
        let bottom = starts.get(i + 1).copied().unwrap_or(end_y);
        let row: Vec<&PositionedLine> = body
            .iter()
            .copied()
            .filter(|l| top - config.row_top_slack <= l.y0 && l.y0 < bottom - config.row_bottom_slack)
            .collect();

        let name = column_text(&row, c.name);
        if !name.is_empty() {
            carry.current_name = name;
        }
        if carry.current_name.is_empty() {
            continue;
        }

        let decoded = DecodedRow {
            unit: column_text(&row, c.unit),
            info_source: column_text(&row, c.info_source),
            occupancy_type: column_text(&row, c.occupancy_type),
            lease_period: column_text(&row, c.lease_period),
            deposit: column_text(&row, c.deposit),
            rent: column_text(&row, c.rent),
            move_in_date: column_text(&row, c.move_in_date),
            confirmed_date: column_text(&row, c.confirmed_date),
            dividend_claim_date: column_text(&row, c.dividend_claim_date),
        };
        occupants.push(decoded.into_record(&carry.current_name));
    }

    carry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractConfig;

    fn line(text: &str, x0: f64, y0: f64) -> PositionedLine {
        PositionedLine::new(text, x0, y0)
    }

    fn occupant_page() -> Vec<PositionedLine> {
        vec![
            line("점유자", 35.0, 300.0),
            line("홍길동", 35.0, 370.0),
            line("현황조사", 95.0, 370.0),
            line("주거", 145.0, 372.0),
            line("임차인", 145.0, 384.0),
            line("50,000,000", 265.0, 370.0),
            line("2020.01.02", 385.0, 370.0),
            line("2020.01.03", 445.0, 370.0),
            line("권리신고", 95.0, 440.0),
            line("2층", 75.0, 442.0),
            line("<비고>", 35.0, 520.0),
            line("임차인 없음", 35.0, 535.0),
        ]
    }

    #[test]
    fn rebuilds_rows_from_columns() {
        let config = ExtractConfig::embedded().unwrap();
        let mut occupants = Vec::new();
        let carry = decode_occupants(
            &occupant_page(),
            &config.positioned.occupants,
            PositionedCarry::default(),
            &mut occupants,
        );

        assert!(carry.block_closed);
        assert_eq!(occupants.len(), 2);
        assert_eq!(occupants[0].name, "홍길동");
        assert_eq!(occupants[0].occupancy_type, "주거 임차인");
        assert_eq!(occupants[0].deposit, "50,000,000");
        assert_eq!(occupants[0].move_in_date, "2020.01.02");
        assert_eq!(occupants[1].name, "홍길동");
        assert_eq!(occupants[1].info_source, "권리신고");
        assert_eq!(occupants[1].unit, "2층");
    }

    #[test]
    fn continues_block_on_headerless_page() {
        let config = ExtractConfig::embedded().unwrap();
        let carry = PositionedCarry {
            current_name: "김철수".to_owned(),
            block_started: true,
            block_closed: false,
        };
        let mut occupants = Vec::new();
        let page = vec![line("현황조사", 100.0, 40.0), line("3층", 75.0, 41.0)];
        let carry = decode_occupants(&page, &config.positioned.occupants, carry, &mut occupants);

        assert!(!carry.block_closed);
        assert_eq!(occupants.len(), 1);
        assert_eq!(occupants[0].name, "김철수");
        assert_eq!(occupants[0].unit, "3층");
    }

    #[test]
    fn ignores_pages_outside_block() {
        let config = ExtractConfig::embedded().unwrap();
        let page = vec![line("현황조사", 100.0, 40.0)];
        let mut occupants = Vec::new();

        let before = decode_occupants(
            &page,
            &config.positioned.occupants,
            PositionedCarry::default(),
            &mut occupants,
        );
        assert!(!before.block_started);
        assert!(!before.block_closed);

        let closed = PositionedCarry {
            block_started: true,
            block_closed: true,
            ..PositionedCarry::default()
        };
        let after = decode_occupants(
            &page,
            &config.positioned.occupants,
            closed.clone(),
            &mut occupants,
        );
        assert_eq!(after, closed);
        assert!(occupants.is_empty());
    }

    #[test]
    fn fills_header_fields() {
        let config = ExtractConfig::embedded().unwrap();
        let lines = vec![
            line("사건", 20.0, 40.0),
            line("2025타경100211", 60.0, 40.0),
            line("물건번호", 300.0, 40.0),
            line("1", 360.0, 42.0),
            line("배당요구종기", 420.0, 80.0),
            line("2025.03.10", 420.0, 95.0),
        ];
        let mut record = CaseRecord::default();
        extract_fields(&lines, &config.positioned.fields, &mut record);

        assert_eq!(record.case_no, "2025타경100211");
        assert_eq!(record.item_no, "1");
        assert_eq!(record.dividend_end_date, "2025.03.10");
    }
}
