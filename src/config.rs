//! Chart configuration
//!
//! Everything the original plotting script hard-coded lives here instead: input column
//! names, the hash width used to turn hash counts into bytes, the axis base heuristic and
//! the chart style. A [`ChartConfig`] can be loaded from a JSON file; any omitted field
//! keeps its default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading or validating a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidValue(String),
}

type Result<T> = core::result::Result<T, ConfigError>;

/// Names of the columns read from the input tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnNames {
    /// Key column; rows sharing a value are averaged together
    pub dict_size: String,
    /// Append-only proof size, in number of hashes
    pub proof_size: String,
    /// Append-only proof verification time, in microseconds
    pub verify_time: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            dict_size: "dictSize".to_string(),
            proof_size: "appendOnlyProofSize".to_string(),
            verify_time: "verifyUsec".to_string(),
        }
    }
}

/// Unit conversion factors applied after aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UnitConfig {
    /// Output width of the tree's hash function in bytes
    pub hash_size_bytes: u32,
    pub bytes_per_kilobyte: f64,
    pub micros_per_milli: f64,
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            hash_size_bytes: crate::analysis::units::DEFAULT_HASH_SIZE_BYTES,
            bytes_per_kilobyte: crate::analysis::units::BYTES_PER_KIB,
            micros_per_milli: crate::analysis::units::MICROS_PER_MILLI,
        }
    }
}

/// Logarithmic x-axis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AxisConfig {
    /// Forces this base; `None` picks one from the observed dictionary sizes
    pub log_base: Option<f64>,
    /// Dictionary sizes that are all multiples of this select [`AxisConfig::decimal_base`]
    pub decimal_divisor: u64,
    pub decimal_base: f64,
    pub binary_base: f64,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            log_base: None,
            decimal_divisor: 10,
            decimal_base: 10.0,
            binary_base: 2.0,
        }
    }
}

/// Visual parameters of the rendered figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartStyle {
    /// Figure width in pixels
    pub width: u32,
    /// Figure height in pixels; split evenly between the two panels
    pub height: u32,
    pub font_family: String,
    pub title: String,
    pub title_font_size: u32,
    pub label_font_size: u32,
    pub tick_font_size: u32,
    pub margin: u32,
    pub x_label_area_size: u32,
    pub y_label_area_size: u32,
    pub line_width: u32,
    /// Draws x tick labels vertically so dense dictionary sizes don't overlap
    pub rotate_x_labels: bool,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 1050,
            height: 1200,
            font_family: "sans-serif".to_string(),
            title: "Append-only proofs for Sparse Prefix MHTs".to_string(),
            title_font_size: 25,
            label_font_size: 20,
            tick_font_size: 20,
            margin: 20,
            x_label_area_size: 90,
            y_label_area_size: 90,
            line_width: 2,
            rotate_x_labels: true,
        }
    }
}

/// Complete configuration of a chart run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartConfig {
    pub columns: ColumnNames,
    pub units: UnitConfig,
    pub axis: AxisConfig,
    pub style: ChartStyle,
}

impl ChartConfig {
    /// Loads and validates a configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config: ChartConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::JsonParse {
                path: path.to_path_buf(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would make the conversion or the log axis meaningless
    pub fn validate(&self) -> Result<()> {
        if self.units.hash_size_bytes == 0 {
            return Err(ConfigError::InvalidValue(
                "hash_size_bytes must be greater than zero".to_string(),
            ));
        }

        if !(self.units.bytes_per_kilobyte > 0.0) || !(self.units.micros_per_milli > 0.0) {
            return Err(ConfigError::InvalidValue(
                "unit divisors must be greater than zero".to_string(),
            ));
        }

        if self.axis.decimal_divisor == 0 {
            return Err(ConfigError::InvalidValue(
                "decimal_divisor must be greater than zero".to_string(),
            ));
        }

        let bases = [
            Some(self.axis.decimal_base),
            Some(self.axis.binary_base),
            self.axis.log_base,
        ];
        for base in bases.into_iter().flatten() {
            validate_log_base(base)?;
        }

        let columns = &self.columns;
        if columns.dict_size.is_empty()
            || columns.proof_size.is_empty()
            || columns.verify_time.is_empty()
        {
            return Err(ConfigError::InvalidValue(
                "column names cannot be empty".to_string(),
            ));
        }

        if columns.dict_size == columns.proof_size
            || columns.dict_size == columns.verify_time
            || columns.proof_size == columns.verify_time
        {
            return Err(ConfigError::InvalidValue(format!(
                "column names must be distinct, got '{}', '{}' and '{}'",
                columns.dict_size, columns.proof_size, columns.verify_time
            )));
        }

        if self.style.width == 0 || self.style.height < 2 {
            return Err(ConfigError::InvalidValue(format!(
                "figure size {}x{} is too small",
                self.style.width, self.style.height
            )));
        }

        Ok(())
    }
}

/// A logarithm base must be finite and greater than one
pub fn validate_log_base(base: f64) -> Result<()> {
    if base.is_finite() && base > 1.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(format!(
            "log base {} must be greater than 1",
            base
        )))
    }
}
