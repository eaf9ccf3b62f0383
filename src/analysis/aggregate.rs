//! Group-by-mean over dictionary sizes
//!
//! Repeated trials for the same dictionary size are collapsed into a single row holding
//! the arithmetic mean of every numeric column. Groups keep running sums and counts
//! rather than means, so aggregations of separate inputs can be merged exactly.

use crate::common::data_structures::{
    AggregatedRow, AggregatedTable, MeasurementRow, MeasurementTable,
};
use std::collections::BTreeMap;

/// Running totals for one dictionary size
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupAccumulator {
    /// Number of rows seen for this key
    pub trials: u64,
    /// Sum of present values, per column
    pub sums: Vec<f64>,
    /// Number of present values, per column
    pub counts: Vec<u64>,
}

impl GroupAccumulator {
    fn with_width(width: usize) -> Self {
        Self {
            trials: 0,
            sums: vec![0.0; width],
            counts: vec![0; width],
        }
    }

    fn mean(&self, column: usize) -> f64 {
        match self.counts[column] {
            0 => f64::NAN,
            count => self.sums[column] / count as f64,
        }
    }
}

/// Incremental group-by-mean over numeric columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregator {
    columns: Vec<String>,
    groups: BTreeMap<u64, GroupAccumulator>,
}

impl Aggregator {
    /// Creates an aggregator for the given numeric column names
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            groups: BTreeMap::new(),
        }
    }

    /// Creates an aggregator over the numeric columns of a table and feeds it every row
    pub fn from_table(table: &MeasurementTable) -> Self {
        let numeric: Vec<usize> = table
            .columns
            .iter()
            .enumerate()
            .filter(|(_, column)| column.numeric)
            .map(|(index, _)| index)
            .collect();

        let names = numeric
            .iter()
            .map(|&index| table.columns[index].name.clone())
            .collect();

        let mut aggregator = Self::new(names);
        for row in &table.rows {
            aggregator.push_selected(row, &numeric);
        }
        aggregator
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Adds a row whose values line up with [`Aggregator::columns`]
    pub fn push(&mut self, dict_size: u64, values: &[Option<f64>]) {
        let width = self.columns.len();
        let group = self
            .groups
            .entry(dict_size)
            .or_insert_with(|| GroupAccumulator::with_width(width));

        group.trials += 1;
        for (column, value) in values.iter().take(width).enumerate() {
            if let Some(value) = value {
                group.sums[column] += value;
                group.counts[column] += 1;
            }
        }
    }

    fn push_selected(&mut self, row: &MeasurementRow, selected: &[usize]) {
        let values: Vec<Option<f64>> = selected
            .iter()
            .map(|&index| row.values.get(index).copied().flatten())
            .collect();
        self.push(row.dict_size, &values);
    }

    /// Folds another aggregator into this one, matching columns by name
    ///
    /// Columns only the other side has are appended. The result is the same as if every
    /// row of both had been pushed into a single aggregator.
    pub fn merge(&mut self, other: Aggregator) {
        let mapping: Vec<usize> = other
            .columns
            .iter()
            .map(|name| match self.columns.iter().position(|own| own == name) {
                Some(index) => index,
                None => {
                    self.columns.push(name.clone());
                    self.columns.len() - 1
                }
            })
            .collect();

        let width = self.columns.len();
        for group in self.groups.values_mut() {
            group.sums.resize(width, 0.0);
            group.counts.resize(width, 0);
        }

        for (dict_size, incoming) in other.groups {
            let group = self
                .groups
                .entry(dict_size)
                .or_insert_with(|| GroupAccumulator::with_width(width));

            group.trials += incoming.trials;
            for (source, &target) in mapping.iter().enumerate() {
                group.sums[target] += incoming.sums[source];
                group.counts[target] += incoming.counts[source];
            }
        }
    }

    /// Produces the mean of every column per dictionary size, ascending by size
    pub fn finish(self) -> AggregatedTable {
        let width = self.columns.len();
        let mut rows: Vec<AggregatedRow> = self
            .groups
            .into_iter()
            .map(|(dict_size, group)| AggregatedRow {
                dict_size,
                trials: group.trials,
                means: (0..width).map(|column| group.mean(column)).collect(),
            })
            .collect();

        // BTreeMap already yields keys in order; the plot depends on it, so make it explicit.
        rows.sort_unstable_by_key(|row| row.dict_size);

        AggregatedTable {
            columns: self.columns,
            rows,
        }
    }
}

/// Averages every numeric column of the table per dictionary size
pub fn aggregate(table: &MeasurementTable) -> AggregatedTable {
    Aggregator::from_table(table).finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::data_structures::Column;

    fn table(rows: &[(u64, f64, f64)]) -> MeasurementTable {
        MeasurementTable {
            columns: vec![Column::new("proof", true), Column::new("verify", true)],
            rows: rows
                .iter()
                .map(|&(dict_size, proof, verify)| MeasurementRow {
                    dict_size,
                    values: vec![Some(proof), Some(verify)],
                })
                .collect(),
        }
    }

    fn assert_close(left: f64, right: f64) {
        assert!(
            (left - right).abs() <= 1e-9 * left.abs().max(1.0),
            "{} != {}",
            left,
            right
        );
    }

    #[test]
    fn averages_rows_sharing_a_dict_size() {
        let aggregated = aggregate(&table(&[
            (100, 10.0, 5000.0),
            (100, 20.0, 7000.0),
            (200, 30.0, 9000.0),
        ]));

        assert_eq!(aggregated.columns, vec!["proof", "verify"]);
        assert_eq!(aggregated.rows.len(), 2);
        assert_eq!(aggregated.rows[0].dict_size, 100);
        assert_eq!(aggregated.rows[0].trials, 2);
        assert_eq!(aggregated.rows[0].means, vec![15.0, 6000.0]);
        assert_eq!(aggregated.rows[1].means, vec![30.0, 9000.0]);
    }

    #[test]
    fn output_is_sorted_by_dict_size() {
        let aggregated = aggregate(&table(&[
            (1000, 1.0, 1.0),
            (10, 1.0, 1.0),
            (100, 1.0, 1.0),
            (10, 3.0, 3.0),
        ]));
        assert_eq!(aggregated.dict_sizes(), vec![10, 100, 1000]);
    }

    #[test]
    fn mean_matches_arithmetic_mean() {
        let values = [3.5, 1.25, 8.0, 13.75, 0.5, 2.0, 99.0];
        let rows: Vec<_> = values.iter().map(|&v| (64, v, v * 3.0)).collect();
        let aggregated = aggregate(&table(&rows));

        let expected = values.iter().sum::<f64>() / values.len() as f64;
        assert_close(aggregated.rows[0].means[0], expected);
        assert_close(aggregated.rows[0].means[1], expected * 3.0);
    }

    #[test]
    fn missing_cells_are_skipped() {
        let measurements = MeasurementTable {
            columns: vec![Column::new("proof", true)],
            rows: vec![
                MeasurementRow {
                    dict_size: 8,
                    values: vec![Some(4.0)],
                },
                MeasurementRow {
                    dict_size: 8,
                    values: vec![None],
                },
                MeasurementRow {
                    dict_size: 16,
                    values: vec![None],
                },
            ],
        };

        let aggregated = aggregate(&measurements);
        assert_eq!(aggregated.rows[0].trials, 2);
        assert_eq!(aggregated.rows[0].means[0], 4.0);
        assert!(aggregated.rows[1].means[0].is_nan());
    }

    #[test]
    fn non_numeric_columns_are_dropped() {
        let measurements = MeasurementTable {
            columns: vec![Column::new("label", false), Column::new("proof", true)],
            rows: vec![MeasurementRow {
                dict_size: 8,
                values: vec![None, Some(2.0)],
            }],
        };

        let aggregated = aggregate(&measurements);
        assert_eq!(aggregated.columns, vec!["proof"]);
        assert_eq!(aggregated.rows[0].means, vec![2.0]);
    }

    #[test]
    fn merging_partial_aggregations_equals_aggregating_concatenation() {
        let a = table(&[(100, 10.0, 5000.0), (100, 11.0, 5100.0), (200, 40.0, 1.0)]);
        let b = table(&[(100, 20.0, 7000.0), (300, 5.0, 2.0), (200, 42.0, 3.0)]);

        let combined = aggregate(&MeasurementTable::concat([a.clone(), b.clone()]));

        let mut merged = Aggregator::from_table(&a);
        merged.merge(Aggregator::from_table(&b));
        let merged = merged.finish();

        assert_eq!(merged.columns, combined.columns);
        assert_eq!(merged.dict_sizes(), combined.dict_sizes());
        for (left, right) in merged.rows.iter().zip(&combined.rows) {
            assert_eq!(left.trials, right.trials);
            for (l, r) in left.means.iter().zip(&right.means) {
                assert_close(*l, *r);
            }
        }

        // The merged mean is the trial-weighted mean of the per-file means.
        let expected = (2.0 * 10.5 + 20.0) / 3.0;
        assert_close(merged.rows[0].means[0], expected);
    }

    #[test]
    fn merge_matches_columns_by_name() {
        let mut left = Aggregator::new(vec!["proof".to_string()]);
        left.push(10, &[Some(1.0)]);

        let mut right = Aggregator::new(vec!["verify".to_string(), "proof".to_string()]);
        right.push(10, &[Some(8.0), Some(3.0)]);

        left.merge(right);
        let table = left.finish();
        assert_eq!(table.columns, vec!["proof", "verify"]);
        assert_eq!(table.rows[0].means, vec![2.0, 8.0]);
        assert_eq!(table.rows[0].trials, 2);
    }
}
