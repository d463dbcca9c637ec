//! Extraction configuration.
//!
//! Every empirical constant of the extractor (labels, markers, layout
//! variants, positioned-line windows) is data. The defaults are embedded at
//! compile time from `config/default.toml`; a replacement file with the
//! same shape can be loaded at runtime.

use std::path::Path;

use serde::Deserialize;

use crate::ExtractError;
use crate::fields::RecordField;
use crate::layout::{LayoutTable, LayoutVariant};
use crate::occupants::OccupantBlockConfig;
use crate::positioned::PositionedConfig;
use crate::sections::SectionsConfig;

const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// A header field read from table rows with the next-cell strategy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableField {
    /// Record field to fill.
    pub target: RecordField,
    /// Label cell text.
    pub label: String,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    min_table_width: usize,
    #[serde(default = "default_sanitize")]
    sanitize_output: bool,
    #[serde(default)]
    table_field: Vec<TableField>,
    occupants: OccupantBlockConfig,
    #[serde(default)]
    variant: Vec<LayoutVariant>,
    sections: SectionsConfig,
    positioned: PositionedConfig,
}

const fn default_sanitize() -> bool {
    true
}

/// Validated extraction settings.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Tables narrower than this are not decoded for header fields or
    /// occupants.
    pub min_table_width: usize,
    /// Whether records are sanitised before they are returned.
    pub sanitize_output: bool,
    /// Header fields read from table rows.
    pub table_fields: Vec<TableField>,
    /// Occupant block markers.
    pub occupants: OccupantBlockConfig,
    /// Known occupant row shapes.
    pub layouts: LayoutTable,
    /// Free-text section markers.
    pub sections: SectionsConfig,
    /// Positioned-line fallback settings.
    pub positioned: PositionedConfig,
}

impl ExtractConfig {
    /// The built-in configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Config`] if the embedded file does not
    /// validate.
    pub fn embedded() -> Result<Self, ExtractError> {
        Self::from_toml_str(DEFAULT_CONFIG)
    }

    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Config`] if the TOML is malformed, a field is
    /// missing, or a layout variant is inconsistent.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ExtractError> {
        let file: ConfigFile =
            toml::de::from_str(toml_str).map_err(|e| ExtractError::Config(e.to_string()))?;

        let layouts = LayoutTable::new(file.variant).map_err(ExtractError::Config)?;

        if file.occupants.header_marker.trim().is_empty() {
            return Err(ExtractError::Config(
                "occupants.header_marker must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            min_table_width: file.min_table_width,
            sanitize_output: file.sanitize_output,
            table_fields: file.table_field,
            occupants: file.occupants,
            layouts,
            sections: file.sections,
            positioned: file.positioned,
        })
    }

    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Io`] if the file cannot be read, or
    /// [`ExtractError::Config`] if it does not validate.
    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        let text = std::fs::read_to_string(path)?;
        log::info!("Loading extraction config from {}", path.display());
        Self::from_toml_str(&text)
    }
}
