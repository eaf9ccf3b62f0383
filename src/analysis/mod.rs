//! Measurement analysis
//!
//! This module contains the numeric steps between loading and plotting:
//! - Group-by-mean over dictionary sizes
//! - Unit conversion into display units
//! - Log axis base selection

pub mod aggregate;
pub mod axis;
pub mod units;

// Re-export analysis functions for convenience
pub use aggregate::{aggregate, Aggregator};
pub use axis::choose_log_base;
pub use units::rescale;
