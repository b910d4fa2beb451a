pub use crate::config::*;

/// A builder for assembling a raw table row by row.
///
/// The readers of the command line use it, and it is the simplest way to feed
/// the pipeline from code.
///
/// ```
/// use daily_productivity::builder::TableBuilder;
/// use daily_productivity::*;
///
/// let mut builder = TableBuilder::new(&["enum", "int_date", "consent"]);
/// builder.add_row_simple(&["Amina", "2025-09-10", "yes"]);
/// builder.add_row_simple(&["Amina", "2025-09-10T16:05:00", "no"]);
///
/// let config = PipelineConfig {
///     roles: RoleMapping::new("enum", "int_date"),
///     header_style: HeaderStyle::Iso,
/// };
/// let summary = run_productivity_summary(builder.build(), &config)?;
/// assert_eq!(summary.display.columns, vec!["enum", "2025-09-10", "Total"]);
/// assert_eq!(summary.wide.rows[0].total, 2);
///
/// # Ok::<(), PipelineError>(())
/// ```
pub struct TableBuilder {
    pub(crate) _columns: Vec<ColumnName>,
    pub(crate) _rows: Vec<Vec<Value>>,
}

impl TableBuilder {
    pub fn new(columns: &[&str]) -> TableBuilder {
        TableBuilder::with_columns(columns.iter().map(|c| ColumnName::from(*c)).collect())
    }

    /// Starts a table with arbitrary column names, composite ones included.
    pub fn with_columns(columns: Vec<ColumnName>) -> TableBuilder {
        TableBuilder {
            _columns: columns,
            _rows: Vec::new(),
        }
    }

    /// Adds a row of text cells. Empty strings are read as missing values.
    pub fn add_row_simple(&mut self, values: &[&str]) {
        let row: Vec<Value> = values
            .iter()
            .map(|s| {
                if s.is_empty() {
                    Value::Null
                } else {
                    Value::from(*s)
                }
            })
            .collect();
        self.add_row(row)
    }

    /// Adds a row. Short rows are padded with missing values.
    pub fn add_row(&mut self, values: Vec<Value>) {
        let mut row = values;
        if row.len() < self._columns.len() {
            row.resize(self._columns.len(), Value::Null);
        }
        self._rows.push(row);
    }

    pub fn num_rows(&self) -> usize {
        self._rows.len()
    }

    pub fn build(self) -> RawTable {
        RawTable {
            columns: self._columns,
            rows: self._rows,
        }
    }
}
