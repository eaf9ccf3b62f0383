//! File parsing functionality for benchmark measurement tables
//!
//! This module handles loading the CSV files written by the append-only proof benchmark.
//! Files ending in `.zst` are decompressed on the fly.

use crate::common::data_structures::{Column, MeasurementRow, MeasurementTable};
use crate::config::ColumnNames;
use csv::{ReaderBuilder, StringRecord, Trim};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use zstd::Decoder;

/// Errors that can occur during file parsing
#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("Failed to read input file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to decompress zstd file {path}: {source}")]
    Decompression {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse CSV file {path}: {source}")]
    CsvParse { path: PathBuf, source: csv::Error },

    #[error("Input file {path} is missing required column '{column}'")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Input file {path} has non-numeric value '{value}' in column '{column}' (line {line})")]
    NonNumeric {
        path: PathBuf,
        column: String,
        value: String,
        line: u64,
    },

    #[error("Input file {path} contains no measurements")]
    Empty { path: PathBuf },
}

type Result<T> = core::result::Result<T, ParsingError>;

/// Returns true if the path names a zstd compressed file
fn is_zstd(path: &Path) -> bool {
    path.extension().is_some_and(|extension| extension == "zst")
}

/// Opens the input, wrapping it in a ZStandard decoder where needed
fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).map_err(|source| ParsingError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    if is_zstd(path) {
        let decoder = Decoder::new(file).map_err(|source| ParsingError::Decompression {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Box::new(decoder))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Parse a single measurement table
///
/// This function:
/// - Opens the file (decompressing `.zst` inputs)
/// - Reads the header row and locates the required columns
/// - Parses every row, keeping all other columns as optional numbers
///
/// # Arguments
/// * `path` - Path to the CSV file
/// * `columns` - Names of the required columns
///
/// # Returns
/// * `Ok(MeasurementTable)` - Successfully parsed measurements
/// * `Err(ParsingError)` - If reading, decompression, CSV parsing or schema checks failed
pub fn parse_measurements(path: &Path, columns: &ColumnNames) -> Result<MeasurementTable> {
    let reader = open_input(path)?;
    parse_measurements_from_reader(reader, path, columns)
}

/// Parses measurements from an already opened reader; `path` is used for error messages
pub fn parse_measurements_from_reader<R: Read>(
    reader: R,
    path: &Path,
    columns: &ColumnNames,
) -> Result<MeasurementTable> {
    let csv_error = |source: csv::Error| ParsingError::CsvParse {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = reader.headers().map_err(csv_error)?.clone();

    let find = |name: &str| {
        headers
            .iter()
            .position(|header| header == name)
            .ok_or_else(|| ParsingError::MissingColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
            })
    };

    let key_index = find(&columns.dict_size)?;
    find(&columns.proof_size)?;
    find(&columns.verify_time)?;

    // Every header except the key becomes a value column.
    let value_indices: Vec<usize> = (0..headers.len()).filter(|&i| i != key_index).collect();
    let mut table = MeasurementTable::new(
        value_indices
            .iter()
            .map(|&index| Column::new(&headers[index], true))
            .collect(),
    );

    let mut record = StringRecord::new();
    while reader.read_record(&mut record).map_err(csv_error)? {
        let line = record.position().map_or(0, |position| position.line());

        let key = &record[key_index];
        let dict_size = key
            .parse::<u64>()
            .map_err(|_| ParsingError::NonNumeric {
                path: path.to_path_buf(),
                column: columns.dict_size.clone(),
                value: key.to_string(),
                line,
            })?;

        let mut values = Vec::with_capacity(value_indices.len());
        for (column, &index) in table.columns.iter_mut().zip(&value_indices) {
            let cell = record.get(index).unwrap_or("");
            let required = column.name == columns.proof_size || column.name == columns.verify_time;
            let value = if cell.is_empty() {
                None
            } else {
                match cell.parse::<f64>() {
                    Ok(value) => Some(value),
                    Err(_) if required => {
                        return Err(ParsingError::NonNumeric {
                            path: path.to_path_buf(),
                            column: column.name.clone(),
                            value: cell.to_string(),
                            line,
                        });
                    }
                    Err(_) => {
                        column.numeric = false;
                        None
                    }
                }
            };
            values.push(value);
        }

        table.rows.push(MeasurementRow { dict_size, values });
    }

    if table.rows.is_empty() {
        return Err(ParsingError::Empty {
            path: path.to_path_buf(),
        });
    }

    Ok(table)
}

/// Creates the progress bar shown while input files are loaded
pub fn create_progress_bar(file_count: usize) -> ProgressBar {
    let progress = ProgressBar::new(file_count as u64);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{pos}/{len}] {wide_msg}") {
        progress.set_style(style);
    }
    progress
}

/// Loads every input file and concatenates them into one table
///
/// Files are read in order; the first failure aborts loading and names the offending path.
pub fn load_measurements(
    paths: &[PathBuf],
    columns: &ColumnNames,
    progress: &ProgressBar,
) -> Result<MeasurementTable> {
    log::info!("Reading CSV files: {:?}", paths);

    let mut tables = Vec::with_capacity(paths.len());
    for path in paths {
        progress.set_message(path.display().to_string());
        let table = parse_measurements(path, columns)?;
        log::debug!("{}: {} rows", path.display(), table.rows.len());
        tables.push(table);
        progress.inc(1);
    }
    progress.finish_and_clear();

    Ok(MeasurementTable::concat(tables))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    fn parse_str(text: &str) -> Result<MeasurementTable> {
        let path = Path::new("test.csv");
        parse_measurements_from_reader(text.as_bytes(), path, &ColumnNames::default())
    }

    #[test]
    fn parses_required_and_extra_columns() {
        let table = parse_str(
            "dictSize,appendOnlyProofSize,verifyUsec,treeHeight\n\
             100,10,5000,7\n\
             200, 12 , 6000 ,8\n",
        )
        .unwrap();

        let names: Vec<_> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["appendOnlyProofSize", "verifyUsec", "treeHeight"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].dict_size, 200);
        assert_eq!(table.rows[1].values, vec![Some(12.0), Some(6000.0), Some(8.0)]);
    }

    #[test]
    fn key_column_may_appear_anywhere() {
        let table = parse_str("verifyUsec,dictSize,appendOnlyProofSize\n5000,1024,10\n").unwrap();
        assert_eq!(table.rows[0].dict_size, 1024);
        assert_eq!(table.rows[0].values, vec![Some(5000.0), Some(10.0)]);
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let err = parse_str("dictSize,verifyUsec\n100,5000\n").unwrap_err();
        match err {
            ParsingError::MissingColumn { column, .. } => {
                assert_eq!(column, "appendOnlyProofSize")
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn non_numeric_extra_columns_are_flagged() {
        let table = parse_str(
            "dictSize,appendOnlyProofSize,verifyUsec,host\n100,10,5000,alpha\n100,11,5100,\n",
        )
        .unwrap();
        assert!(!table.columns[2].numeric);
        assert_eq!(table.rows[0].values[2], None);
    }

    #[test]
    fn non_numeric_required_columns_fail() {
        let err = parse_str("dictSize,appendOnlyProofSize,verifyUsec\n100,ten,5000\n").unwrap_err();
        match err {
            ParsingError::NonNumeric { column, line, .. } => {
                assert_eq!(column, "appendOnlyProofSize");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn bad_dict_size_fails() {
        let err = parse_str("dictSize,appendOnlyProofSize,verifyUsec\n1.5,10,5000\n").unwrap_err();
        assert!(matches!(err, ParsingError::NonNumeric { ref column, .. } if column == "dictSize"));
    }

    #[test]
    fn ragged_rows_are_csv_errors() {
        let err = parse_str("dictSize,appendOnlyProofSize,verifyUsec\n100,10\n").unwrap_err();
        assert!(matches!(err, ParsingError::CsvParse { .. }));
        assert!(err.to_string().contains("test.csv"));
    }

    #[test]
    fn header_only_file_is_empty() {
        let err = parse_str("dictSize,appendOnlyProofSize,verifyUsec\n").unwrap_err();
        assert!(matches!(err, ParsingError::Empty { .. }));
    }

    #[test]
    fn missing_file_names_path() {
        let err = parse_measurements(Path::new("no/such/input.csv"), &ColumnNames::default())
            .unwrap_err();
        assert!(matches!(err, ParsingError::FileRead { .. }));
        assert!(err.to_string().contains("input.csv"));
    }

    #[test]
    fn reads_zstd_compressed_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trial.csv.zst");
        let compressed = zstd::encode_all(
            "dictSize,appendOnlyProofSize,verifyUsec\n64,3,900\n".as_bytes(),
            3,
        )
        .unwrap();
        fs::write(&path, compressed).unwrap();

        let table = parse_measurements(&path, &ColumnNames::default()).unwrap();
        assert_eq!(table.rows[0].dict_size, 64);
        assert_eq!(table.rows[0].values, vec![Some(3.0), Some(900.0)]);
    }

    #[test]
    fn load_concatenates_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.csv");
        let second = dir.path().join("b.csv");
        fs::File::create(&first)
            .unwrap()
            .write_all(b"dictSize,appendOnlyProofSize,verifyUsec\n100,10,5000\n")
            .unwrap();
        fs::File::create(&second)
            .unwrap()
            .write_all(b"dictSize,appendOnlyProofSize,verifyUsec\n100,20,7000\n")
            .unwrap();

        let table = load_measurements(
            &[first, second],
            &ColumnNames::default(),
            &ProgressBar::hidden(),
        )
        .unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].values[0], Some(10.0));
        assert_eq!(table.rows[1].values[0], Some(20.0));
    }

    #[test]
    fn load_stops_at_first_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.csv");
        fs::write(&good, "dictSize,appendOnlyProofSize,verifyUsec\n100,10,5000\n").unwrap();
        let bad = dir.path().join("missing.csv");

        let err = load_measurements(&[good, bad], &ColumnNames::default(), &ProgressBar::hidden())
            .unwrap_err();
        assert!(err.to_string().contains("missing.csv"));
    }
}
