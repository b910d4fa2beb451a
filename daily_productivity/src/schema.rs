use log::{debug, warn};
use std::collections::{HashMap, HashSet};

use crate::config::*;

/// Flattens a column name into a single string.
///
/// The parts of a composite name are trimmed and joined with an underscore.
/// Blank parts (merged or empty header cells) are skipped.
pub fn flatten_column_name(name: &ColumnName) -> String {
    match name {
        ColumnName::Simple(s) => s.clone(),
        ColumnName::Composite(parts) => parts
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect::<Vec<&str>>()
            .join("_"),
    }
}

/// The first name `make(n)` (for `n` counting up from `start`) that is not
/// taken yet, with the `n` that produced it.
pub(crate) fn free_name<F>(taken: &HashSet<String>, start: u32, make: F) -> (String, u32)
where
    F: Fn(u32) -> String,
{
    let mut n = start;
    loop {
        let candidate = make(n);
        if !taken.contains(&candidate) {
            return (candidate, n);
        }
        n += 1;
    }
}

/// Produces a table with a flat, duplicate-free column namespace.
///
/// The first occurrence of a name keeps it, the following ones get `_dup1`,
/// `_dup2`, ... in order of appearance. A suffix already used by another
/// column of the table is skipped. Returns the renamed columns as
/// (original, new) pairs. This never fails and leaves the rows untouched.
pub fn normalize_columns(raw: RawTable) -> (Table, Vec<(String, String)>) {
    let flat: Vec<String> = raw.columns.iter().map(flatten_column_name).collect();

    // All the names of the input are reserved: a generated name never shadows
    // a column that comes later.
    let mut taken: HashSet<String> = flat.iter().cloned().collect();
    // Last suffix used for each name. The renaming only depends on the order
    // of the columns, not on the iteration order of this map.
    let mut seen: HashMap<String, u32> = HashMap::new();
    let mut columns: Vec<String> = Vec::with_capacity(flat.len());
    let mut renamed: Vec<(String, String)> = Vec::new();
    for name in flat {
        match seen.get_mut(&name) {
            Some(last) => {
                let (new_name, n) =
                    free_name(&taken, *last + 1, |n| format!("{}_dup{}", name, n));
                *last = n;
                taken.insert(new_name.clone());
                renamed.push((name, new_name.clone()));
                columns.push(new_name);
            }
            None => {
                seen.insert(name.clone(), 0);
                columns.push(name);
            }
        }
    }

    if !renamed.is_empty() {
        warn!(
            "normalize_columns: duplicate column names detected, renamed: {:?}",
            renamed
        );
    }
    debug!("normalize_columns: columns: {:?}", columns);

    (
        Table {
            columns,
            rows: raw.rows,
        },
        renamed,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(columns: Vec<ColumnName>) -> RawTable {
        RawTable {
            columns,
            rows: vec![vec![Value::Null; 3]],
        }
    }

    #[test]
    fn duplicates_are_renamed_in_order() {
        let (t, renamed) =
            normalize_columns(raw(vec!["a".into(), "b".into(), "a".into(), "a".into()]));
        assert_eq!(t.columns, vec!["a", "b", "a_dup1", "a_dup2"]);
        assert_eq!(
            renamed,
            vec![
                ("a".to_string(), "a_dup1".to_string()),
                ("a".to_string(), "a_dup2".to_string())
            ]
        );
        assert_eq!(t.rows.len(), 1);
    }

    #[test]
    fn composite_names_are_flattened() {
        let (t, renamed) = normalize_columns(raw(vec![
            ColumnName::Composite(vec![" interview ".to_string(), "date ".to_string()]),
            ColumnName::Composite(vec!["consent".to_string(), "".to_string()]),
            "interview_date".into(),
        ]));
        assert_eq!(t.columns, vec!["interview_date", "consent", "interview_date_dup1"]);
        assert_eq!(renamed.len(), 1);
    }

    #[test]
    fn normalization_is_idempotent() {
        let (once, _) = normalize_columns(raw(vec!["x".into(), "x".into(), "y".into()]));
        let (twice, renamed) = normalize_columns(RawTable::from(once.clone()));
        assert_eq!(once, twice);
        assert!(renamed.is_empty());
    }

    #[test]
    fn generated_names_skip_existing_columns() {
        let (once, renamed) =
            normalize_columns(raw(vec!["a".into(), "a".into(), "a_dup1".into()]));
        assert_eq!(once.columns, vec!["a", "a_dup2", "a_dup1"]);
        assert_eq!(renamed, vec![("a".to_string(), "a_dup2".to_string())]);
        let unique: HashSet<&String> = once.columns.iter().collect();
        assert_eq!(unique.len(), once.columns.len());

        let (twice, renamed) = normalize_columns(RawTable::from(once.clone()));
        assert_eq!(once, twice);
        assert!(renamed.is_empty());
    }

    #[test]
    fn free_names() {
        let taken: HashSet<String> = ["x_orig", "x_orig1"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let (name, n) = free_name(&taken, 0, |n| match n {
            0 => "x_orig".to_string(),
            n => format!("x_orig{}", n),
        });
        assert_eq!((name.as_str(), n), ("x_orig2", 2));
    }

    #[test]
    fn empty_table() {
        let (t, renamed) = normalize_columns(RawTable::default());
        assert!(t.columns.is_empty());
        assert!(t.rows.is_empty());
        assert!(renamed.is_empty());
    }
}
