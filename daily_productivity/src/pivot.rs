use chrono::NaiveDate;
use log::debug;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::str::FromStr;

use crate::aggregate::GroupedCounts;
use crate::config::*;

/// The internal name of a date column: `d_10Sep2025`.
///
/// It is stable and reads back to the same date whatever the header style
/// chosen for display.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct DateKey(pub NaiveDate);

pub const DATE_KEY_PREFIX: &str = "d_";
pub const DATE_KEY_FORMAT: &str = "%d%b%Y";

impl Display for DateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", DATE_KEY_PREFIX, self.0.format(DATE_KEY_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = String;

    fn from_str(s: &str) -> Result<DateKey, String> {
        let rest = s
            .strip_prefix(DATE_KEY_PREFIX)
            .ok_or_else(|| format!("{:?} is not a date column", s))?;
        NaiveDate::parse_from_str(rest, DATE_KEY_FORMAT)
            .map(DateKey)
            .map_err(|e| format!("{:?} is not a date column: {}", s, e))
    }
}

impl WideTable {
    pub fn date_keys(&self) -> Vec<DateKey> {
        self.dates.iter().map(|d| DateKey(*d)).collect()
    }

    /// The internal column names: index columns, date keys, `Total`.
    pub fn column_names(&self) -> Vec<String> {
        let mut cols: Vec<String> = self
            .layout
            .index_columns()
            .iter()
            .map(|c| c.to_string())
            .collect();
        cols.extend(self.date_keys().iter().map(|k| k.to_string()));
        cols.push(TOTAL_COLUMN.to_string());
        cols
    }

    /// The count in a row for an internal column name (a date key or `Total`).
    pub fn count(&self, row: usize, column: &str) -> Option<u64> {
        let r = self.rows.get(row)?;
        if column == TOTAL_COLUMN {
            return Some(r.total);
        }
        let key: DateKey = column.parse().ok()?;
        let idx = self.dates.iter().position(|d| *d == key.0)?;
        r.counts.get(idx).cloned()
    }
}

/// Reshapes the counts to one row per key and one column per date.
///
/// The dates are the union over all keys, sorted. Missing combinations are
/// zero. The total only sums the date columns.
pub fn pivot_wide(counts: &GroupedCounts) -> WideTable {
    let dates: Vec<NaiveDate> = counts
        .cells
        .values()
        .flat_map(|by_date| by_date.keys().cloned())
        .collect::<BTreeSet<NaiveDate>>()
        .into_iter()
        .collect();

    let rows: Vec<WideRow> = counts
        .cells
        .iter()
        .map(|(key, by_date)| {
            let row_counts: Vec<u64> = dates
                .iter()
                .map(|d| by_date.get(d).cloned().unwrap_or(0))
                .collect();
            WideRow {
                key: key.clone(),
                total: row_counts.iter().sum(),
                counts: row_counts,
            }
        })
        .collect();

    debug!(
        "pivot_wide: {} rows, {} date columns",
        rows.len(),
        dates.len()
    );
    WideTable {
        layout: counts.layout,
        dates,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, d).unwrap()
    }

    fn key(e: &str) -> GroupKey {
        GroupKey {
            enumerator: e.to_string(),
            grouping: None,
            consent: None,
        }
    }

    #[test]
    fn date_keys() {
        let k = DateKey(day(10));
        assert_eq!(k.to_string(), "d_10Sep2025");
        assert_eq!("d_10Sep2025".parse::<DateKey>(), Ok(k));
        assert_eq!(
            DateKey(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()).to_string(),
            "d_03Jan2024"
        );
        assert!("10Sep2025".parse::<DateKey>().is_err());
        assert!("Total".parse::<DateKey>().is_err());
    }

    #[test]
    fn fills_missing_dates_with_zero() {
        let mut cells = BTreeMap::new();
        cells.insert(key("A"), BTreeMap::from([(day(12), 3), (day(10), 1)]));
        cells.insert(key("B"), BTreeMap::from([(day(11), 2)]));
        let g = GroupedCounts {
            layout: KeyLayout::default(),
            cells,
        };
        let w = pivot_wide(&g);
        assert_eq!(w.dates, vec![day(10), day(11), day(12)]);
        assert_eq!(
            w.column_names(),
            vec!["enum", "d_10Sep2025", "d_11Sep2025", "d_12Sep2025", "Total"]
        );
        assert_eq!(w.rows[0].counts, vec![1, 0, 3]);
        assert_eq!(w.rows[0].total, 4);
        assert_eq!(w.rows[1].counts, vec![0, 2, 0]);
        assert_eq!(w.count(1, "d_11Sep2025"), Some(2));
        assert_eq!(w.count(1, "Total"), Some(2));
        assert_eq!(w.count(1, "d_13Sep2025"), None);
        assert_eq!(w.count(2, "Total"), None);
        let grand_total: u64 = w.rows.iter().map(|r| r.total).sum();
        assert_eq!(grand_total, g.total());
    }
}
