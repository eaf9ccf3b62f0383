//! Common infrastructure modules shared across the pipeline
//!
//! This module provides reusable infrastructure for:
//! - Measurement and aggregated table data structures
//! - ASCII table formatting of averaged results
//! - Plotting the two-panel chart

pub mod data_structures;
pub mod plots;
pub mod summary;

// Re-export commonly used items
pub use data_structures::{AggregatedTable, ChartSeries, MeasurementTable};
pub use plots::PlotError;
