use chrono::NaiveDate;
use log::debug;
use std::collections::BTreeMap;

use crate::config::*;
use crate::sanitize::Sanitized;

/// The number of rows for each group key and date, in long form.
///
/// Keys and dates are kept sorted so that the output is reproducible.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct GroupedCounts {
    pub layout: KeyLayout,
    pub cells: BTreeMap<GroupKey, BTreeMap<NaiveDate, u64>>,
}

impl GroupedCounts {
    pub fn get(&self, key: &GroupKey, date: NaiveDate) -> u64 {
        self.cells
            .get(key)
            .and_then(|by_date| by_date.get(&date))
            .cloned()
            .unwrap_or(0)
    }

    /// The number of rows counted, over all keys and dates.
    pub fn total(&self) -> u64 {
        self.cells.values().flat_map(|by_date| by_date.values()).sum()
    }
}

/// Counts the canonical rows for each (key, date) pair.
pub fn count_by_day(sanitized: &Sanitized) -> GroupedCounts {
    let mut cells: BTreeMap<GroupKey, BTreeMap<NaiveDate, u64>> = BTreeMap::new();
    for row in sanitized.rows.iter() {
        let count = cells
            .entry(row.key())
            .or_default()
            .entry(row.date)
            .or_insert(0);
        *count += 1;
    }
    debug!(
        "count_by_day: {} rows in {} groups",
        sanitized.rows.len(),
        cells.len()
    );
    GroupedCounts {
        layout: sanitized.layout,
        cells,
    }
}
