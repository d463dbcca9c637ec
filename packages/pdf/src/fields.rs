//! Field extractor set.
//!
//! Each extractor takes the located label and the page's rows or lines and
//! returns a single value, or `None` when no candidate qualifies. Absence
//! is never an error: the target field simply stays at its default.
//!
//! Table input uses [`next_cell_after_label`]. Positioned-line input uses
//! one of the [`PositionedStrategy`] variants, selected per field in the
//! configuration.

use maegak_pdf_models::{CaseRecord, PositionedLine, Row};
use serde::Deserialize;
use strum_macros::Display;

use crate::locate::locate_all_in_rows;
use crate::patterns::{find_date, is_date_like, is_korean_name, is_only_number};

/// A flat string field of [`CaseRecord`] an extractor can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecordField {
    /// 사건번호
    CaseNo,
    /// 물건번호
    ItemNo,
    /// 최선순위 설정
    PriorityDate,
    /// 배당요구종기
    DividendEndDate,
    /// 작성일자
    DocumentDate,
    /// 담임법관
    Judge,
    /// `<비고>`
    TenantNote,
    /// Rights surviving the sale
    SurvivingRights,
    /// Surface right summary
    SurfaceRightSummary,
    /// 비고란
    GeneralNote,
}

impl RecordField {
    /// The record slot this field writes to.
    pub const fn slot(self, record: &mut CaseRecord) -> &mut String {
        match self {
            Self::CaseNo => &mut record.case_no,
            Self::ItemNo => &mut record.item_no,
            Self::PriorityDate => &mut record.priority_date,
            Self::DividendEndDate => &mut record.dividend_end_date,
            Self::DocumentDate => &mut record.document_date,
            Self::Judge => &mut record.judge,
            Self::TenantNote => &mut record.tenant_note,
            Self::SurvivingRights => &mut record.surviving_rights,
            Self::SurfaceRightSummary => &mut record.surface_right_summary,
            Self::GeneralNote => &mut record.general_note,
        }
    }
}

// ── Table rows ───────────────────────────────────────────────────────────

/// Returns the first non-empty cell strictly after `col` in `row`.
#[must_use]
pub fn value_after(row: &Row, col: usize) -> Option<&str> {
    row.iter()
        .skip(col + 1)
        .map(String::as_str)
        .find(|cell| !cell.is_empty())
}

/// Finds `label` and returns the first non-empty cell to its right.
///
/// When a matching cell has nothing to its right (a label repeated in a
/// legend row, say), the next match in scan order is tried.
#[must_use]
pub fn next_cell_after_label<'a>(rows: &'a [Row], label: &str) -> Option<&'a str> {
    locate_all_in_rows(rows, label).find_map(|pos| value_after(&rows[pos.row], pos.col))
}

// ── Positioned lines ─────────────────────────────────────────────────────

/// How a value is found relative to its label on a page of positioned
/// lines.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PositionedStrategy {
    /// The line directly underneath the label at the same x0; date-shaped
    /// candidates win over anything else.
    ValueBelowSameX {
        /// Allowed x0 difference.
        #[serde(default)]
        tolerance: f64,
    },
    /// The bare number vertically closest to the label.
    NearestNumber {
        /// Maximum vertical distance.
        max_dist: f64,
    },
    /// A date on a line below and to the right of the label.
    RightThenBelowDate {
        /// Allowed vertical offset window below the label.
        y_range: [f64; 2],
        /// Minimum horizontal offset to the right.
        min_dx: f64,
    },
    /// Every line below the label at the same x0 until one contains `stop`,
    /// newline-joined.
    AccumulateSameX {
        /// Stop phrase.
        stop: String,
    },
    /// Every line within an offset window around the label.
    BelowMulti {
        /// Horizontal offset window.
        x_range: [f64; 2],
        /// Vertical offset window.
        y_range: [f64; 2],
        /// Separator for joined lines.
        #[serde(default = "default_join")]
        join: String,
    },
    /// The last line in a shallow band below the label, close to its
    /// column.
    SecondLineBelow {
        /// Vertical offset window below the label.
        y_range: [f64; 2],
        /// Maximum horizontal distance.
        max_dx: f64,
    },
    /// A personal name to the right of and below the label.
    RightPerson {
        /// Minimum horizontal offset to the right.
        min_dx: f64,
        /// Vertical offset window below the label.
        y_range: [f64; 2],
    },
}

fn default_join() -> String {
    " ".to_owned()
}

impl PositionedStrategy {
    /// Runs this strategy against `lines` for the label line `label`.
    #[must_use]
    pub fn extract(&self, lines: &[PositionedLine], label: &PositionedLine) -> Option<String> {
        match self {
            Self::ValueBelowSameX { tolerance } => value_below_same_x(lines, label, *tolerance),
            Self::NearestNumber { max_dist } => nearest_number(lines, label, *max_dist),
            Self::RightThenBelowDate { y_range, min_dx } => {
                right_then_below_date(lines, label, *y_range, *min_dx)
            }
            Self::AccumulateSameX { stop } => accumulate_same_x(lines, label, stop),
            Self::BelowMulti {
                x_range,
                y_range,
                join,
            } => below_multi(lines, label, *x_range, *y_range, join),
            Self::SecondLineBelow { y_range, max_dx } => {
                second_line_below(lines, label, *y_range, *max_dx)
            }
            Self::RightPerson { min_dx, y_range } => right_person(lines, label, *min_dx, *y_range),
        }
    }
}

fn within(value: f64, range: [f64; 2]) -> bool {
    range[0] <= value && value <= range[1]
}

/// The line directly underneath the label: same x0 (within `tolerance`)
/// and the smallest positive y0 delta. When several lines share that
/// delta, a date-shaped one is preferred.
#[must_use]
pub fn value_below_same_x(
    lines: &[PositionedLine],
    label: &PositionedLine,
    tolerance: f64,
) -> Option<String> {
    let candidates: Vec<(f64, &str)> = lines
        .iter()
        .filter(|l| (l.x0 - label.x0).abs() <= tolerance && l.y0 > label.y0)
        .map(|l| (l.y0 - label.y0, l.text.trim()))
        .filter(|(_, text)| !text.is_empty())
        .collect();

    let nearest = candidates.iter().map(|(dy, _)| *dy).min_by(f64::total_cmp)?;
    let below: Vec<&str> = candidates
        .into_iter()
        .filter(|(dy, _)| (dy - nearest).abs() < f64::EPSILON)
        .map(|(_, text)| text)
        .collect();

    below
        .iter()
        .find(|text| is_date_like(text))
        .or_else(|| below.first())
        .map(|text| (*text).to_owned())
}

/// The purely numeric line with the smallest vertical distance from the
/// label, within `max_dist`.
#[must_use]
pub fn nearest_number(
    lines: &[PositionedLine],
    label: &PositionedLine,
    max_dist: f64,
) -> Option<String> {
    lines
        .iter()
        .map(|l| ((l.y0 - label.y0).abs(), l))
        .filter(|(dist, l)| *dist <= max_dist && is_only_number(&l.text))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, l)| l.text.trim().to_owned())
}

/// The date-shaped substring of the nearest line lying `y_range` below and
/// at least `min_dx` right of the label.
#[must_use]
pub fn right_then_below_date(
    lines: &[PositionedLine],
    label: &PositionedLine,
    y_range: [f64; 2],
    min_dx: f64,
) -> Option<String> {
    lines
        .iter()
        .filter(|l| within(l.y0 - label.y0, y_range) && l.x0 - label.x0 >= min_dx)
        .filter_map(|l| find_date(&l.text).map(|d| (l.y0 - label.y0, d)))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, d)| d.to_owned())
}

/// Collects the lines below the label that share its x0, in page order,
/// until a line containing `stop` is reached.
#[must_use]
pub fn accumulate_same_x(
    lines: &[PositionedLine],
    label: &PositionedLine,
    stop: &str,
) -> Option<String> {
    let mut collected = Vec::new();

    for line in lines {
        #[allow(clippy::float_cmp)]
        let same_column = line.x0 == label.x0;
        if !same_column || line.y0 <= label.y0 {
            continue;
        }
        if !stop.is_empty() && line.text.contains(stop) {
            break;
        }
        collected.push(line.text.trim());
    }

    (!collected.is_empty()).then(|| collected.join("\n"))
}

/// Every line inside the offset window, joined with `join`.
#[must_use]
pub fn below_multi(
    lines: &[PositionedLine],
    label: &PositionedLine,
    x_range: [f64; 2],
    y_range: [f64; 2],
    join: &str,
) -> Option<String> {
    let values: Vec<&str> = lines
        .iter()
        .filter(|l| within(l.x0 - label.x0, x_range) && within(l.y0 - label.y0, y_range))
        .map(|l| l.text.trim())
        .filter(|t| !t.is_empty())
        .collect();

    (!values.is_empty()).then(|| values.join(join))
}

/// The last line in the `y_range` band below the label within `max_dx` of
/// its x0.
#[must_use]
pub fn second_line_below(
    lines: &[PositionedLine],
    label: &PositionedLine,
    y_range: [f64; 2],
    max_dx: f64,
) -> Option<String> {
    lines
        .iter()
        .rev()
        .filter(|l| within(l.y0 - label.y0, y_range) && (l.x0 - label.x0).abs() <= max_dx)
        .map(|l| l.text.trim())
        .find(|t| !t.is_empty())
        .map(str::to_owned)
}

/// The last name-shaped line at least `min_dx` right of and `y_range`
/// below the label.
#[must_use]
pub fn right_person(
    lines: &[PositionedLine],
    label: &PositionedLine,
    min_dx: f64,
    y_range: [f64; 2],
) -> Option<String> {
    lines
        .iter()
        .rev()
        .filter(|l| l.x0 - label.x0 >= min_dx && within(l.y0 - label.y0, y_range))
        .map(|l| l.text.trim())
        .find(|t| is_korean_name(t))
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, x0: f64, y0: f64) -> PositionedLine {
        PositionedLine::new(text, x0, y0)
    }

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| (*c).to_string()).collect()
    }

    #[test]
    fn reads_next_non_empty_cell() {
        let rows = vec![
            row(&["사건", "", "2025타경100211 부동산임의경매", "", "매각물건번호", "1"]),
            row(&["작성 일자", "", "2025.06.02", "", "담임법관", "홍판사"]),
        ];
        assert_eq!(
            next_cell_after_label(&rows, "사건"),
            Some("2025타경100211 부동산임의경매")
        );
        assert_eq!(next_cell_after_label(&rows, "물건번호"), Some("1"));
        assert_eq!(next_cell_after_label(&rows, "작성일자"), Some("2025.06.02"));
        assert_eq!(next_cell_after_label(&rows, "배당요구종기"), None);
    }

    #[test]
    fn skips_label_with_nothing_to_its_right() {
        let rows = vec![row(&["", "최선순위"]), row(&["최선순위 설정", "2023.10.16. 압류"])];
        assert_eq!(next_cell_after_label(&rows, "최선순위"), Some("2023.10.16. 압류"));
    }

    #[test]
    fn value_below_prefers_date_on_same_line() {
        let label = line("배당요구종기", 400.0, 100.0);
        let lines = vec![
            line("위", 400.0, 90.0),
            label.clone(),
            line("(공고)", 400.0, 110.0),
            line("2024.05.20", 400.0, 110.0),
            line("2024.06.20", 401.0, 105.0),
        ];
        assert_eq!(
            value_below_same_x(&lines, &label, 0.0).as_deref(),
            Some("2024.05.20")
        );
        let no_date = vec![label.clone(), line("(공고)", 400.0, 110.0)];
        assert_eq!(value_below_same_x(&no_date, &label, 0.0).as_deref(), Some("(공고)"));
    }

    #[test]
    fn value_below_ignores_distant_dates() {
        let label = line("배당요구종기", 400.0, 100.0);
        let lines = vec![
            label.clone(),
            line("미정", 400.0, 112.0),
            line("2020.01.02", 400.0, 640.0),
        ];
        assert_eq!(value_below_same_x(&lines, &label, 0.0).as_deref(), Some("미정"));
        assert_eq!(value_below_same_x(&[label.clone()], &label, 0.0), None);
    }

    #[test]
    fn nearest_number_respects_radius() {
        let label = line("물건번호", 300.0, 100.0);
        let lines = vec![
            line("7", 350.0, 130.0),
            line("2", 350.0, 112.0),
            line("3층", 350.0, 101.0),
        ];
        assert_eq!(nearest_number(&lines, &label, 25.0).as_deref(), Some("2"));
        assert_eq!(nearest_number(&lines, &label, 10.0), None);
    }

    #[test]
    fn finds_date_right_and_below() {
        let label = line("작성", 400.0, 50.0);
        let lines = vec![
            line("2025.01.02", 410.0, 60.0),
            line("작성일자 2025.01.03", 430.0, 62.0),
            line("2025.01.04", 430.0, 90.0),
        ];
        assert_eq!(
            right_then_below_date(&lines, &label, [5.0, 20.0], 20.0).as_deref(),
            Some("2025.01.03")
        );
    }

    #[test]
    fn accumulates_until_stop() {
        let label = line("<비고>", 30.0, 500.0);
        let lines = vec![
            line("이전 줄", 30.0, 480.0),
            label.clone(),
            line("첫째 줄", 30.0, 515.0),
            line("다른 칸", 90.0, 520.0),
            line("둘째 줄", 30.0, 530.0),
            line("※ 최선순위 설정일자보다 대항요건을 먼저 갖춘", 30.0, 545.0),
            line("이후 줄", 30.0, 560.0),
        ];
        assert_eq!(
            accumulate_same_x(&lines, &label, "※ 최선순위 설정일자보다").as_deref(),
            Some("첫째 줄\n둘째 줄")
        );
    }

    #[test]
    fn accumulate_returns_none_when_empty() {
        let label = line("비고란", 30.0, 700.0);
        assert!(accumulate_same_x(&[label.clone()], &label, "사건").is_none());
    }

    #[test]
    fn joins_multi_line_case_number() {
        let label = line("사건", 20.0, 40.0);
        let lines = vec![
            label.clone(),
            line("2025타경100211", 60.0, 38.0),
            line("2025타경100300(중복)", 60.0, 52.0),
            line("매각물건번호", 300.0, 40.0),
        ];
        assert_eq!(
            below_multi(&lines, &label, [20.0, 120.0], [-15.0, 30.0], ", ").as_deref(),
            Some("2025타경100211, 2025타경100300(중복)")
        );
    }

    #[test]
    fn takes_second_line_in_band() {
        let label = line("최선순위", 40.0, 200.0);
        let lines = vec![
            line("설정", 40.0, 200.0),
            line("2023.10.16.", 100.0, 206.0),
            line("2023.10.16. 압류", 100.0, 209.0),
            line("배당요구종기", 300.0, 206.0),
        ];
        assert_eq!(
            second_line_below(&lines, &label, [5.0, 10.0], 120.0).as_deref(),
            Some("2023.10.16. 압류")
        );
    }

    #[test]
    fn finds_judge_name() {
        let label = line("담임법관", 380.0, 40.0);
        let lines = vec![
            line("(사법보좌관)", 440.0, 50.0),
            line("김판사", 440.0, 55.0),
            line("홍길동", 200.0, 55.0),
        ];
        assert_eq!(
            right_person(&lines, &label, 50.0, [5.0, 30.0]).as_deref(),
            Some("김판사")
        );
    }

    #[test]
    fn strategy_deserializes_from_tagged_table() {
        let strategy: PositionedStrategy =
            toml::from_str("type = \"nearest_number\"\nmax_dist = 25.0").unwrap();
        assert_eq!(strategy, PositionedStrategy::NearestNumber { max_dist: 25.0 });
    }

    #[test]
    fn record_field_points_at_slot() {
        let mut record = CaseRecord::default();
        "2024.01.01".clone_into(RecordField::DocumentDate.slot(&mut record));
        assert_eq!(record.document_date, "2024.01.01");
        assert_eq!(RecordField::SurfaceRightSummary.to_string(), "surface_right_summary");
    }
}
