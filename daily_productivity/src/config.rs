// ********* Input data structures ***********

use std::fmt::Display;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use snafu::Snafu;

/// A single cell of the input table, as handed over by the readers.
///
/// Exports from collection platforms and statistical packages do not always
/// hold flat scalars: repeat groups and multi-select questions may come in as
/// lists or maps. They are kept as such here and flattened (or rejected) by the
/// sanitizer.
#[derive(PartialEq, Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// An encoded value (value labels), with the label attached to the code when known.
    Category { code: i64, label: Option<String> },
    List(Vec<Value>),
    /// Key/value pairs, in insertion order.
    Map(Vec<(String, Value)>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// The string form of a scalar value. Lists and maps do not have one.
    ///
    /// Missing values render as the empty string. Integral floats render
    /// without a fractional part, since spreadsheet readers report all the
    /// numbers as floats.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            v if v.is_null() => Some(String::new()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some((*f as i64).to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Text(s) => Some(s.clone()),
            Value::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            Value::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            Value::Category {
                label: Some(label), ..
            } => Some(label.clone()),
            Value::Category { code, label: None } => Some(code.to_string()),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Value {
        Value::Int(i)
    }
}

/// The name of a column in a raw table.
///
/// Hierarchical headers (several header rows) produce composite names, one
/// part per header level.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum ColumnName {
    Simple(String),
    Composite(Vec<String>),
}

impl From<&str> for ColumnName {
    fn from(s: &str) -> ColumnName {
        ColumnName::Simple(s.to_string())
    }
}

/// A table as read from the input: column names may be duplicated or composite.
///
/// Rows are positional: the n-th value of a row belongs to the n-th column.
/// Short rows are read as if padded with nulls.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<ColumnName>,
    pub rows: Vec<Vec<Value>>,
}

/// A table with a flat, duplicate-free column namespace.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

impl From<Table> for RawTable {
    fn from(t: Table) -> RawTable {
        RawTable {
            columns: t.columns.into_iter().map(ColumnName::Simple).collect(),
            rows: t.rows,
        }
    }
}

// ******** Output data structures *********

/// The outcome of the consent question, once classified.
///
/// Declared in the order in which the rows are reported.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum ConsentStatus {
    Yes,
    No,
}

impl Display for ConsentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsentStatus::Yes => write!(f, "Yes"),
            ConsentStatus::No => write!(f, "No"),
        }
    }
}

/// A record after role mapping and sanitation, ready to be counted.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CanonicalRow {
    pub enumerator: String,
    pub date: NaiveDate,
    pub consent: Option<ConsentStatus>,
    pub grouping: Option<String>,
}

impl CanonicalRow {
    pub fn key(&self) -> GroupKey {
        GroupKey {
            enumerator: self.enumerator.clone(),
            grouping: self.grouping.clone(),
            consent: self.consent,
        }
    }
}

/// The identity of an output row.
///
/// The field order is the column order and the sort order of the output:
/// enumerator, then the grouping attribute, then the consent status.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd)]
pub struct GroupKey {
    pub enumerator: String,
    pub grouping: Option<String>,
    pub consent: Option<ConsentStatus>,
}

/// Which optional components are part of the group keys.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct KeyLayout {
    pub grouping: bool,
    pub consent: bool,
}

pub const ENUMERATOR_COLUMN: &str = "enum";
pub const DATE_COLUMN: &str = "date";
pub const CONSENT_COLUMN: &str = "consent";
pub const GROUPING_COLUMN: &str = "grouping_var";
pub const CONSENT_STATUS_COLUMN: &str = "consent_status";
pub const TOTAL_COLUMN: &str = "Total";
/// The fallback for missing enumerator and grouping values.
pub const UNKNOWN: &str = "Unknown";

impl KeyLayout {
    /// The names of the index columns of the wide table, in order.
    pub fn index_columns(&self) -> Vec<&'static str> {
        let mut cols = vec![ENUMERATOR_COLUMN];
        if self.grouping {
            cols.push(GROUPING_COLUMN);
        }
        if self.consent {
            cols.push(CONSENT_STATUS_COLUMN);
        }
        cols
    }
}

/// One row of the wide table. `counts` is aligned with `WideTable::dates`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct WideRow {
    pub key: GroupKey,
    pub counts: Vec<u64>,
    pub total: u64,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct WideTable {
    pub layout: KeyLayout,
    /// All the dates seen in the data, in ascending order.
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<WideRow>,
}

/// A cell of the display table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Cell {
    Text(String),
    Count(u64),
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Count(c) => write!(f, "{}", c),
        }
    }
}

/// The wide table with its final column headers, ready to be written out.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DisplayTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Everything that was recovered from along the way, for reporting.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Diagnostics {
    /// (original name, new name) for every column renamed by the normalizer.
    pub renamed_columns: Vec<(String, String)>,
    pub input_rows: usize,
    /// Rows dropped because their date could not be read.
    pub dropped_invalid_dates: usize,
    /// Date-time values that carried a time of day and were cut down to their date.
    pub truncated_timestamps: usize,
    pub valid_rows: usize,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Summary {
    pub wide: WideTable,
    pub display: DisplayTable,
    pub diagnostics: Diagnostics,
}

/// Errors that prevent the pipeline from producing a summary.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PipelineError {
    #[snafu(display("No column selected for the {role} role"))]
    MissingRequiredRole { role: Role },
    #[snafu(display("Column {column:?} selected for the {role} role was not found in the data"))]
    RoleColumnNotFound { role: Role, column: String },
    #[snafu(display("Column {column:?} is selected for both the {first} and the {second} roles"))]
    AmbiguousMapping {
        first: Role,
        second: Role,
        column: String,
    },
    #[snafu(display("Row {row}: the {role} value {value} is nested and cannot be flattened"))]
    NestedValue {
        role: Role,
        row: usize,
        value: String,
    },
    #[snafu(display("The table does not contain any row"))]
    EmptyTable {},
    #[snafu(display(
        "No valid rows left after cleaning ({dropped_dates} rows had an unreadable date)"
    ))]
    NoValidRows { dropped_dates: usize },
}

// ********* Configuration **********

/// The meaning a column can take in the pipeline.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Role {
    Enumerator,
    Date,
    Consent,
    Grouping,
}

impl Role {
    /// The name the bound column takes after mapping.
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Role::Enumerator => ENUMERATOR_COLUMN,
            Role::Date => DATE_COLUMN,
            Role::Consent => CONSENT_COLUMN,
            Role::Grouping => GROUPING_COLUMN,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Enumerator => write!(f, "enumerator"),
            Role::Date => write!(f, "date"),
            Role::Consent => write!(f, "consent"),
            Role::Grouping => write!(f, "grouping attribute"),
        }
    }
}

/// The column chosen for each role.
///
/// `None` means that no column was selected. The enumerator and the date are
/// required; consent and grouping are optional and independently toggled.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RoleMapping {
    pub enumerator: Option<String>,
    pub date: Option<String>,
    pub consent: Option<String>,
    pub grouping: Option<String>,
}

impl RoleMapping {
    pub fn new(enumerator: &str, date: &str) -> RoleMapping {
        RoleMapping {
            enumerator: Some(enumerator.to_string()),
            date: Some(date.to_string()),
            consent: None,
            grouping: None,
        }
    }

    pub fn consent(self, column: &str) -> RoleMapping {
        RoleMapping {
            consent: Some(column.to_string()),
            ..self
        }
    }

    pub fn grouping(self, column: &str) -> RoleMapping {
        RoleMapping {
            grouping: Some(column.to_string()),
            ..self
        }
    }

    /// The selected column for a role. Blank selections count as no selection.
    pub fn selection(&self, role: Role) -> Option<&str> {
        let s = match role {
            Role::Enumerator => &self.enumerator,
            Role::Date => &self.date,
            Role::Consent => &self.consent,
            Role::Grouping => &self.grouping,
        };
        s.as_deref().filter(|c| !c.trim().is_empty())
    }
}

/// How the date columns are labelled in the output.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub enum HeaderStyle {
    /// `10 Sep 2025`
    #[default]
    Pretty,
    /// `d_10Sep2025`, the internal key.
    Safe,
    /// `10Sep2025`
    Compact,
    /// `2025-09-10`
    Iso,
}

impl FromStr for HeaderStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<HeaderStyle, String> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(HeaderStyle::Pretty),
            "safe" => Ok(HeaderStyle::Safe),
            "compact" => Ok(HeaderStyle::Compact),
            "iso" => Ok(HeaderStyle::Iso),
            x => Err(format!(
                "unknown header style {:?} (expected pretty, safe, compact or iso)",
                x
            )),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct PipelineConfig {
    pub roles: RoleMapping,
    pub header_style: HeaderStyle,
}
