//! Streaming free-text section accumulator.
//!
//! The legal notes below the occupant table have no cell structure of their
//! own: a start marker opens a section, following rows are appended to it,
//! and any stop marker closes every open section. The open/closed flags are
//! a value passed in and returned so one document's scan can continue
//! across tables and pages.

use maegak_pdf_models::{CaseRecord, Row, join_onto, keep_first};
use serde::Deserialize;
use strum_macros::Display;

use crate::patterns::contains_any;

/// Start marker for one section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SectionMarker {
    /// Substring that opens the section.
    pub detect: String,
    /// Substring removed from the opening row; defaults to `detect`.
    #[serde(default)]
    pub strip: Option<String>,
}

impl SectionMarker {
    fn strip_text(&self) -> &str {
        self.strip.as_deref().unwrap_or(&self.detect)
    }
}

/// Markers for the four free-text sections.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SectionsConfig {
    /// Any of these closes every open section.
    pub stop_markers: Vec<String>,
    /// `<비고>`
    pub tenant_note: SectionMarker,
    /// Rights surviving the sale.
    pub surviving_rights: SectionMarker,
    /// Surface right summary.
    pub surface_right_summary: SectionMarker,
    /// 비고란
    pub general_note: SectionMarker,
}

/// One of the four free-text sections, in scan priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SectionKind {
    /// `<비고>`
    TenantNote,
    /// Rights surviving the sale.
    SurvivingRights,
    /// Surface right summary.
    SurfaceRightSummary,
    /// 비고란
    GeneralNote,
}

impl SectionKind {
    /// Every section in the order start markers are tested.
    pub const ALL: [Self; 4] = [
        Self::TenantNote,
        Self::SurvivingRights,
        Self::SurfaceRightSummary,
        Self::GeneralNote,
    ];

    const fn marker(self, config: &SectionsConfig) -> &SectionMarker {
        match self {
            Self::TenantNote => &config.tenant_note,
            Self::SurvivingRights => &config.surviving_rights,
            Self::SurfaceRightSummary => &config.surface_right_summary,
            Self::GeneralNote => &config.general_note,
        }
    }
}

/// Which sections are currently collecting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionState {
    /// `<비고>` is open.
    pub tenant_note: bool,
    /// Surviving rights are open.
    pub surviving_rights: bool,
    /// Surface right summary is open.
    pub surface_right_summary: bool,
    /// 비고란 is open.
    pub general_note: bool,
}

impl SectionState {
    const fn flag(&mut self, kind: SectionKind) -> &mut bool {
        match kind {
            SectionKind::TenantNote => &mut self.tenant_note,
            SectionKind::SurvivingRights => &mut self.surviving_rights,
            SectionKind::SurfaceRightSummary => &mut self.surface_right_summary,
            SectionKind::GeneralNote => &mut self.general_note,
        }
    }

    /// Whether any section is open.
    #[must_use]
    pub const fn any_open(&self) -> bool {
        self.tenant_note || self.surviving_rights || self.surface_right_summary || self.general_note
    }
}

/// Text collected by one accumulator call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionText {
    /// `<비고>`
    pub tenant_note: String,
    /// Rights surviving the sale.
    pub surviving_rights: String,
    /// Surface right summary.
    pub surface_right_summary: String,
    /// 비고란
    pub general_note: String,
}

impl SectionText {
    const fn field(&mut self, kind: SectionKind) -> &mut String {
        match kind {
            SectionKind::TenantNote => &mut self.tenant_note,
            SectionKind::SurvivingRights => &mut self.surviving_rights,
            SectionKind::SurfaceRightSummary => &mut self.surface_right_summary,
            SectionKind::GeneralNote => &mut self.general_note,
        }
    }

    /// Fills the record's still-empty section fields from this text.
    pub fn merge_into(&self, record: &mut CaseRecord) {
        keep_first(&mut record.tenant_note, &self.tenant_note);
        keep_first(&mut record.surviving_rights, &self.surviving_rights);
        keep_first(&mut record.surface_right_summary, &self.surface_right_summary);
        keep_first(&mut record.general_note, &self.general_note);
    }
}

/// Text of a row: its non-empty cells joined with a space.
#[must_use]
pub fn row_text(row: &Row) -> String {
    row.iter()
        .map(String::as_str)
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Scans `rows` in order, starting from `state`, and returns the text
/// collected by this call together with the state after the last row.
#[must_use]
pub fn accumulate(
    rows: &[Row],
    mut state: SectionState,
    config: &SectionsConfig,
) -> (SectionText, SectionState) {
    let mut text = SectionText::default();

    'rows: for row in rows {
        let line = row_text(row);

        if contains_any(&line, &config.stop_markers) {
            state = SectionState::default();
        }

        for kind in SectionKind::ALL {
            let marker = kind.marker(config);
            if line.contains(marker.detect.as_str()) {
                log::debug!("Section {kind} opened");
                *state.flag(kind) = true;
                let content = line.replace(marker.strip_text(), "");
                join_onto(text.field(kind), content.trim());
                continue 'rows;
            }
            if *state.flag(kind) && !line.is_empty() {
                join_onto(text.field(kind), &line);
            }
        }
    }

    (text, state)
}
