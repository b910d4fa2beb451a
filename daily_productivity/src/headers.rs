use chrono::NaiveDate;

use crate::config::*;
use crate::pivot::{DateKey, DATE_KEY_FORMAT};

impl HeaderStyle {
    fn date_format(&self) -> Option<&'static str> {
        match self {
            HeaderStyle::Pretty => Some("%d %b %Y"),
            HeaderStyle::Safe => None,
            HeaderStyle::Compact => Some(DATE_KEY_FORMAT),
            HeaderStyle::Iso => Some("%Y-%m-%d"),
        }
    }

    /// The displayed name of the column for this date.
    pub fn format_date(&self, key: &DateKey) -> String {
        match self.date_format() {
            Some(fmt) => key.0.format(fmt).to_string(),
            None => key.to_string(),
        }
    }

    /// Reads back a header produced by `format_date`.
    pub fn parse_header(&self, header: &str) -> Option<NaiveDate> {
        match self.date_format() {
            Some(fmt) => NaiveDate::parse_from_str(header, fmt).ok(),
            None => header.parse::<DateKey>().ok().map(|k| k.0),
        }
    }
}

/// Renders the wide table with the chosen style for the date headers.
///
/// Only the date headers change. The index columns, `Total` and all the values
/// are passed through as they are.
pub fn format_headers(wide: &WideTable, style: HeaderStyle) -> DisplayTable {
    let mut columns: Vec<String> = wide
        .layout
        .index_columns()
        .iter()
        .map(|c| c.to_string())
        .collect();
    columns.extend(wide.date_keys().iter().map(|k| style.format_date(k)));
    columns.push(TOTAL_COLUMN.to_string());

    let rows: Vec<Vec<Cell>> = wide
        .rows
        .iter()
        .map(|r| {
            let mut cells: Vec<Cell> = vec![Cell::Text(r.key.enumerator.clone())];
            if wide.layout.grouping {
                cells.push(Cell::Text(r.key.grouping.clone().unwrap_or_default()));
            }
            if wide.layout.consent {
                cells.push(Cell::Text(
                    r.key.consent.map(|c| c.to_string()).unwrap_or_default(),
                ));
            }
            cells.extend(r.counts.iter().map(|c| Cell::Count(*c)));
            cells.push(Cell::Count(r.total));
            cells
        })
        .collect();

    DisplayTable { columns, rows }
}
