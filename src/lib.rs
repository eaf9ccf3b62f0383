//! Charts for append-only proof benchmarks of Sparse Prefix Merkle hash trees
//!
//! Reads the CSV files produced by the benchmark harness, averages repeated trials per
//! dictionary size, converts proof sizes to kilobytes and verification times to
//! milliseconds, and draws both against dictionary size on a two-panel PNG.
//!
//! The pipeline is exposed in two steps so it can be exercised without a font stack:
//! [`prepare_chart`] does all loading and arithmetic, [`run`] adds printing, rendering
//! and the optional viewer.

pub mod analysis;
pub mod cli;
pub mod common;
pub mod config;
pub mod parsing;
pub mod viewer;

use analysis::{aggregate, choose_log_base, rescale};
use bytesize::ByteSize;
use cli::{Invocation, UsageError};
use common::data_structures::{AggregatedTable, ChartSeries, SeriesError};
use common::plots::render_chart;
use common::summary::format_aggregated_table;
use common::PlotError;
use config::{validate_log_base, ChartConfig, ConfigError};
use indicatif::ProgressBar;
use parsing::ParsingError;
use std::fmt::Display;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while producing a chart
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Parsing error: {0}")]
    Parsing(#[from] ParsingError),

    #[error("Series error: {0}")]
    Series(#[from] SeriesError),

    #[error("Plot error: {0}")]
    Plot(#[from] PlotError),
}

pub type Result<T> = core::result::Result<T, AppError>;

/// Everything needed to draw the chart, in display units
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedChart {
    /// Averaged measurements with proof size and verification time already rescaled
    pub table: AggregatedTable,
    pub series: ChartSeries,
    pub log_base: f64,
}

/// Loads, aggregates and rescales the input files
pub fn prepare_chart(
    inputs: &[PathBuf],
    config: &ChartConfig,
    progress: &ProgressBar,
) -> Result<PreparedChart> {
    let measurements = parsing::load_measurements(inputs, &config.columns, progress)?;
    let aggregated = aggregate(&measurements);
    let table = rescale(&aggregated, &config.columns, &config.units);

    let series = ChartSeries::from_table(
        &table,
        &config.columns.proof_size,
        &config.columns.verify_time,
    )?;
    let log_base = choose_log_base(&series.dict_sizes, &config.axis);
    log::debug!("Using log base {} for dictionary sizes", log_base);

    Ok(PreparedChart {
        table,
        series,
        log_base,
    })
}

/// Resolves the configuration of an invocation; command line flags win over the file
pub fn resolve_config(invocation: &Invocation) -> Result<ChartConfig> {
    let mut config = match &invocation.config {
        Some(path) => ChartConfig::from_file(path)?,
        None => ChartConfig::default(),
    };

    if let Some(base) = invocation.log_base {
        validate_log_base(base)?;
        config.axis.log_base = Some(base);
    }

    Ok(config)
}

/// Runs the whole pipeline for a validated invocation
pub fn run(invocation: &Invocation) -> Result<()> {
    let config = resolve_config(invocation)?;

    let progress = parsing::create_progress_bar(invocation.inputs.len());
    let chart = prepare_chart(&invocation.inputs, &config, &progress)?;

    if !invocation.quiet {
        println!("{}", format_aggregated_table(&chart.table, Some("Averaged measurements")));
    }

    render_chart(&chart.series, chart.log_base, &config.style, &invocation.output)?;

    let size = fs::metadata(&invocation.output)
        .map(|metadata| ByteSize(metadata.len()).to_string())
        .unwrap_or_else(|_| "unknown size".to_string());
    log::info!("Wrote chart to {} ({})", invocation.output.display(), size);

    if invocation.show {
        if viewer::display_available() {
            if let Err(e) = viewer::show_image(&invocation.output) {
                log::warn!("Failed to open image viewer: {}", e);
            }
        } else {
            log::warn!("No display available, not showing the chart");
        }
    }

    Ok(())
}

/// Reports an error that ends the program
///
/// Goes through the logger when it prints errors, otherwise straight to `stderr` so a
/// silenced logger (`RUST_LOG=off`) never hides why the program failed.
pub fn report_fatal(error: &dyn Display, mut stderr: impl Write) {
    if log::log_enabled!(log::Level::Error) {
        log::error!("{}", error);
    } else {
        let _ = writeln!(stderr, "Error: {}", error);
    }
}
