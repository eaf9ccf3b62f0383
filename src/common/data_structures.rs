use thiserror::Error;

/// A value column of a measurement table (every column except the dictionary size key)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Header name as it appears in the input file
    pub name: String,
    /// False if any non-empty cell in this column failed to parse as a number
    pub numeric: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, numeric: bool) -> Self {
        Self {
            name: name.into(),
            numeric,
        }
    }
}

/// A single trial as recorded by the benchmark harness
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRow {
    /// Number of entries in the dictionary at measurement time
    pub dict_size: u64,
    /// One cell per [`MeasurementTable::columns`] entry; `None` for empty or non-numeric cells
    pub values: Vec<Option<f64>>,
}

/// Raw measurements loaded from one or more input tables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementTable {
    pub columns: Vec<Column>,
    pub rows: Vec<MeasurementRow>,
}

impl MeasurementTable {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Returns the position of the named value column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    /// Concatenates tables, taking the union of their columns by name
    ///
    /// Columns keep the order in which they are first seen. A column is numeric only if
    /// it is numeric in every table that has it. Rows from a table lacking a column get
    /// `None` in that position.
    pub fn concat(tables: impl IntoIterator<Item = MeasurementTable>) -> MeasurementTable {
        let mut combined = MeasurementTable::default();

        for table in tables {
            let mapping: Vec<usize> = table
                .columns
                .iter()
                .map(|column| match combined.column_index(&column.name) {
                    Some(index) => {
                        combined.columns[index].numeric &= column.numeric;
                        index
                    }
                    None => {
                        combined.columns.push(column.clone());
                        combined.columns.len() - 1
                    }
                })
                .collect();

            for row in table.rows {
                let mut values = vec![None; combined.columns.len()];
                for (source, value) in row.values.into_iter().enumerate() {
                    values[mapping[source]] = value;
                }
                combined.rows.push(MeasurementRow {
                    dict_size: row.dict_size,
                    values,
                });
            }
        }

        // Rows pushed before later tables introduced new columns are short; pad them.
        let width = combined.columns.len();
        for row in &mut combined.rows {
            row.values.resize(width, None);
        }

        combined
    }
}

/// Per dictionary size means of every numeric column
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedRow {
    pub dict_size: u64,
    /// Number of input rows that were averaged into this row
    pub trials: u64,
    /// One mean per [`AggregatedTable::columns`] entry; NaN when the group had no values
    pub means: Vec<f64>,
}

/// Output of the group-by-mean step, sorted by ascending dictionary size
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedTable {
    pub columns: Vec<String>,
    pub rows: Vec<AggregatedRow>,
}

impl AggregatedTable {
    /// Returns the position of the named column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Returns every row's value for the named column, in row order
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row.means[index]).collect())
    }

    /// Distinct dictionary sizes in ascending order
    pub fn dict_sizes(&self) -> Vec<u64> {
        self.rows.iter().map(|row| row.dict_size).collect()
    }
}

/// Errors raised when extracting plot series from an aggregated table
#[derive(Error, Debug)]
pub enum SeriesError {
    #[error("Aggregated data has no numeric column named '{0}'")]
    MissingColumn(String),
}

/// The data drawn on the chart, already converted to display units
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    /// Distinct dictionary sizes, ascending
    pub dict_sizes: Vec<u64>,
    /// Append-only proof size in kilobytes
    pub proof_size_kb: Vec<f64>,
    /// Verification time in milliseconds
    pub verify_ms: Vec<f64>,
}

impl ChartSeries {
    /// Extracts the proof size and verification time columns of a rescaled table
    pub fn from_table(
        table: &AggregatedTable,
        proof_size_column: &str,
        verify_time_column: &str,
    ) -> Result<Self, SeriesError> {
        let proof_size_kb = table
            .column(proof_size_column)
            .ok_or_else(|| SeriesError::MissingColumn(proof_size_column.to_string()))?;
        let verify_ms = table
            .column(verify_time_column)
            .ok_or_else(|| SeriesError::MissingColumn(verify_time_column.to_string()))?;

        Ok(Self {
            dict_sizes: table.dict_sizes(),
            proof_size_kb,
            verify_ms,
        })
    }

    pub fn len(&self) -> usize {
        self.dict_sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dict_sizes.is_empty()
    }
}
