use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use log::{debug, info, warn};
use snafu::ensure;

use crate::config::*;
use crate::roles::BoundTable;

/// Date-time layouts found in collection exports, tried in order.
const DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    // SubmissionDate, starttime and endtime in SurveyCTO exports.
    "%b %d, %Y %I:%M:%S %p",
];

/// Date layouts, tried after the date-time ones.
/// Slashed dates are read month first.
const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %b %Y",
    "%d%b%Y",
    "%b %d, %Y",
];

/// The rows of a table after sanitation.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Sanitized {
    pub rows: Vec<CanonicalRow>,
    pub layout: KeyLayout,
    pub dropped_invalid_dates: usize,
    pub truncated_timestamps: usize,
}

/// Flattens a value into the string used for the enumerator and grouping roles.
///
/// Returns `None` if the value is still nested after one level of flattening:
/// a list must hold exactly one scalar, and only the first value of a map is
/// looked at. Missing and blank values become `Unknown`.
pub fn coerce_text(value: &Value) -> Option<String> {
    let flat = match value {
        v if v.is_null() => return Some(UNKNOWN.to_string()),
        Value::List(items) => match items.as_slice() {
            [single] => single.scalar_text()?,
            _ => return None,
        },
        Value::Map(entries) => entries.first()?.1.scalar_text()?,
        v => v.scalar_text()?,
    };
    let trimmed = flat.trim();
    if trimmed.is_empty() {
        Some(UNKNOWN.to_string())
    } else {
        Some(trimmed.to_string())
    }
}

/// Reads the calendar date of a value.
///
/// Time-of-day is dropped: two submissions on the same day count for the same
/// date. The flag tells if a non-midnight time was cut.
pub fn derive_date(value: &Value) -> Option<(NaiveDate, bool)> {
    match value {
        Value::Date(d) => Some((*d, false)),
        Value::DateTime(dt) => Some(truncate(dt)),
        Value::Text(s) => parse_date_text(s),
        _ => None,
    }
}

fn truncate(dt: &NaiveDateTime) -> (NaiveDate, bool) {
    let has_time = dt.num_seconds_from_midnight() > 0 || dt.nanosecond() > 0;
    (dt.date(), has_time)
}

pub fn parse_date_text(text: &str) -> Option<(NaiveDate, bool)> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(truncate(&dt.naive_local()));
    }
    for fmt in DATETIME_FORMATS.iter() {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(truncate(&dt));
        }
    }
    for fmt in DATE_FORMATS.iter() {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some((d, false));
        }
    }
    None
}

/// Strict binary classification of the consent answer.
///
/// Anything outside of `1`, `yes`, `true`, `y` (case and surrounding spaces
/// ignored), including a missing answer, is a `No`.
pub fn classify_consent(value: &Value) -> ConsentStatus {
    let text = value
        .scalar_text()
        .or_else(|| coerce_text(value))
        .unwrap_or_default();
    match text.trim().to_lowercase().as_str() {
        "1" | "yes" | "true" | "y" => ConsentStatus::Yes,
        _ => ConsentStatus::No,
    }
}

fn cell(row: &[Value], idx: usize) -> Value {
    row.get(idx).cloned().unwrap_or(Value::Null)
}

fn text_role(value: &Value, role: Role, row: usize) -> Result<String, PipelineError> {
    match coerce_text(value) {
        Some(s) => Ok(s),
        None => NestedValueSnafu {
            role,
            row,
            value: format!("{:?}", value),
        }
        .fail(),
    }
}

/// Turns the bound table into canonical rows.
///
/// Rows whose date cannot be read are dropped and counted. Nested enumerator
/// or grouping values abort the whole run.
pub fn sanitize(bound: &BoundTable) -> Result<Sanitized, PipelineError> {
    let rows = &bound.table.rows;
    ensure!(!rows.is_empty(), EmptyTableSnafu {});

    let mut res: Vec<CanonicalRow> = Vec::with_capacity(rows.len());
    let mut dropped: usize = 0;
    let mut truncated: usize = 0;
    for (idx, row) in rows.iter().enumerate() {
        // Rows are numbered from 1, as in a spreadsheet without its header.
        let lineno = idx + 1;
        let enumerator = text_role(&cell(row, bound.enumerator), Role::Enumerator, lineno)?;
        let grouping = match bound.grouping {
            Some(col) => Some(text_role(&cell(row, col), Role::Grouping, lineno)?),
            None => None,
        };
        let consent = bound.consent.map(|col| classify_consent(&cell(row, col)));
        let raw_date = cell(row, bound.date);
        match derive_date(&raw_date) {
            Some((date, has_time)) => {
                if has_time {
                    truncated += 1;
                }
                res.push(CanonicalRow {
                    enumerator,
                    date,
                    consent,
                    grouping,
                });
            }
            None => {
                debug!("sanitize: row {}: cannot read date {:?}", lineno, raw_date);
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        warn!(
            "sanitize: dropped {} rows out of {} with a missing or unreadable date",
            dropped,
            rows.len()
        );
    }
    if truncated > 0 {
        info!(
            "sanitize: {} timestamps were reduced to their calendar date",
            truncated
        );
    }
    ensure!(
        !res.is_empty(),
        NoValidRowsSnafu {
            dropped_dates: dropped
        }
    );

    Ok(Sanitized {
        rows: res,
        layout: bound.layout(),
        dropped_invalid_dates: dropped,
        truncated_timestamps: truncated,
    })
}
