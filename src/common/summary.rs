//! ASCII table formatting of aggregated measurements
//!
//! Column headers are only known once the input files are read, so the table is assembled
//! with the [`tabled`] builder instead of a derived row type.

use super::data_structures::AggregatedTable;
use tabled::builder::Builder;

/// Header of the dictionary size column
const DICT_SIZE_HEADER: &str = "dictSize";

/// Header of the trial count column
const TRIALS_HEADER: &str = "trials";

/// Formats a mean for display; groups with no values show as `-`
fn format_mean(value: f64) -> String {
    if value.is_nan() {
        "-".to_string()
    } else {
        format!("{:.3}", value)
    }
}

/// Formats an aggregated table as an ASCII table using the [`tabled`] crate
///
/// # Arguments
/// * `table` - The aggregated (and usually rescaled) measurements
/// * `title` - Optional title for the table
///
/// # Returns
/// A formatted ASCII table as a [`String`]
pub fn format_aggregated_table(table: &AggregatedTable, title: Option<&str>) -> String {
    if table.rows.is_empty() {
        return "No measurements available".to_string();
    }

    let mut builder = Builder::default();

    let mut header = vec![DICT_SIZE_HEADER.to_string(), TRIALS_HEADER.to_string()];
    header.extend(table.columns.iter().cloned());
    builder.push_record(header);

    for row in &table.rows {
        let mut record = vec![row.dict_size.to_string(), row.trials.to_string()];
        record.extend(row.means.iter().map(|&mean| format_mean(mean)));
        builder.push_record(record);
    }

    let rendered = builder.build().to_string();
    match title {
        Some(title) => format!("{}\n{}\n{}", title, "=".repeat(title.len()), rendered),
        None => rendered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::data_structures::AggregatedRow;

    fn sample() -> AggregatedTable {
        AggregatedTable {
            columns: vec!["appendOnlyProofSize".to_string(), "verifyUsec".to_string()],
            rows: vec![
                AggregatedRow {
                    dict_size: 100,
                    trials: 2,
                    means: vec![0.46875, 6.0],
                },
                AggregatedRow {
                    dict_size: 200,
                    trials: 1,
                    means: vec![f64::NAN, 7.5],
                },
            ],
        }
    }

    #[test]
    fn test_format_aggregated_table() {
        let table = format_aggregated_table(&sample(), Some("Averaged"));
        assert!(table.starts_with("Averaged\n========\n"));
        assert!(table.contains("dictSize"));
        assert!(table.contains("trials"));
        assert!(table.contains("appendOnlyProofSize"));
        assert!(table.contains("0.469"));
        assert!(table.contains("6.000"));
        assert!(table.contains(" - "));

        let no_title = format_aggregated_table(&sample(), None);
        assert!(!no_title.contains("Averaged"));
        assert!(no_title.contains("verifyUsec"));
    }

    #[test]
    fn test_format_empty_table() {
        let empty = AggregatedTable::default();
        assert_eq!(format_aggregated_table(&empty, None), "No measurements available");
    }
}
