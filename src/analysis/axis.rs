//! Logarithmic x-axis base selection

use crate::config::AxisConfig;

/// Picks the log base for the dictionary size axis
///
/// A base forced through [`AxisConfig::log_base`] always wins. Otherwise, sizes that are
/// all multiples of [`AxisConfig::decimal_divisor`] (e.g. 100, 1000, 10000) use the
/// decimal base, and anything else (e.g. powers of two) uses the binary base.
pub fn choose_log_base(dict_sizes: &[u64], axis: &AxisConfig) -> f64 {
    if let Some(base) = axis.log_base {
        return base;
    }

    let divisor = axis.decimal_divisor.max(1);
    match dict_sizes.iter().find(|&&size| size % divisor != 0) {
        Some(size) => {
            log::debug!(
                "Dictionary size {} is not a multiple of {}, switching to log base {}",
                size,
                divisor,
                axis.binary_base
            );
            axis.binary_base
        }
        None => axis.decimal_base,
    }
}
