//! Unit constants and conversions for benchmark measurements
//!
//! The benchmark harness reports proof sizes as a number of hashes and verification
//! times in microseconds. Charts show kilobytes and milliseconds.

use crate::common::data_structures::AggregatedTable;
use crate::config::{ColumnNames, UnitConfig};

/// Output width of SHA-256, the hash used by the benchmarked tree
pub const DEFAULT_HASH_SIZE_BYTES: u32 = 32;

/// Kibibyte constant (1,024 bytes)
pub const BYTES_PER_KIB: f64 = 1024.0;

/// Microseconds in a millisecond
pub const MICROS_PER_MILLI: f64 = 1000.0;

/// Converts a proof size given as a hash count into kilobytes
///
/// Multiplies by the hash width first, then divides, matching the order the benchmark
/// numbers have always been reported in.
pub fn hashes_to_kilobytes(hashes: f64, units: &UnitConfig) -> f64 {
    let bytes = hashes * units.hash_size_bytes as f64;
    bytes / units.bytes_per_kilobyte
}

/// Converts microseconds into milliseconds
pub fn micros_to_millis(micros: f64, units: &UnitConfig) -> f64 {
    micros / units.micros_per_milli
}

/// Returns a copy of the aggregated table with the proof size and verification time
/// columns converted into display units
///
/// Columns not present in the table are left alone; other columns are copied unchanged.
pub fn rescale(
    table: &AggregatedTable,
    columns: &ColumnNames,
    units: &UnitConfig,
) -> AggregatedTable {
    let proof_index = table.column_index(&columns.proof_size);
    let verify_index = table.column_index(&columns.verify_time);

    let mut rescaled = table.clone();
    for row in &mut rescaled.rows {
        if let Some(index) = proof_index {
            row.means[index] = hashes_to_kilobytes(row.means[index], units);
        }
        if let Some(index) = verify_index {
            row.means[index] = micros_to_millis(row.means[index], units);
        }
    }

    rescaled
}
