use log::{debug, warn};
use snafu::{ensure, OptionExt};
use std::collections::HashSet;

use crate::config::*;
use crate::schema::free_name;

/// A table in which every bound role has been located and renamed to its
/// canonical name. The indexes point into `table.columns`.
#[derive(PartialEq, Debug, Clone)]
pub struct BoundTable {
    pub table: Table,
    pub enumerator: usize,
    pub date: usize,
    pub consent: Option<usize>,
    pub grouping: Option<usize>,
}

impl BoundTable {
    pub fn layout(&self) -> KeyLayout {
        KeyLayout {
            grouping: self.grouping.is_some(),
            consent: self.consent.is_some(),
        }
    }
}

const CANONICAL_NAMES: [&str; 4] = [
    ENUMERATOR_COLUMN,
    DATE_COLUMN,
    CONSENT_COLUMN,
    GROUPING_COLUMN,
];

/// Binds the selected columns to their roles and renames them.
///
/// Fails when a required role is not selected, when a selected column does
/// not exist in the (normalized) table, or when the same column is selected
/// for two roles.
pub fn bind_roles(table: Table, mapping: &RoleMapping) -> Result<BoundTable, PipelineError> {
    let enum_col = mapping
        .selection(Role::Enumerator)
        .context(MissingRequiredRoleSnafu {
            role: Role::Enumerator,
        })?;
    let date_col = mapping
        .selection(Role::Date)
        .context(MissingRequiredRoleSnafu { role: Role::Date })?;

    let mut bindings: Vec<(Role, &str)> =
        vec![(Role::Enumerator, enum_col), (Role::Date, date_col)];
    for role in [Role::Consent, Role::Grouping] {
        if let Some(col) = mapping.selection(role) {
            bindings.push((role, col));
        }
    }
    debug!("bind_roles: bindings: {:?}", bindings);

    for (idx, (first, col1)) in bindings.iter().enumerate() {
        for (second, col2) in bindings.iter().skip(idx + 1) {
            ensure!(
                col1 != col2,
                AmbiguousMappingSnafu {
                    first: *first,
                    second: *second,
                    column: *col1,
                }
            );
        }
    }

    let mut located: Vec<(Role, usize)> = Vec::new();
    for (role, col) in bindings.iter() {
        let idx = table
            .column_index(col)
            .context(RoleColumnNotFoundSnafu {
                role: *role,
                column: *col,
            })?;
        located.push((*role, idx));
    }

    let mut table = table;
    // An unbound column may already carry one of the canonical names. It is
    // moved aside so that each canonical name designates its role only.
    let bound: HashSet<usize> = located.iter().map(|(_, idx)| *idx).collect();
    let mut taken: HashSet<String> = table.columns.iter().cloned().collect();
    for (idx, name) in table.columns.iter_mut().enumerate() {
        if !bound.contains(&idx) && CANONICAL_NAMES.contains(&name.as_str()) {
            let (new_name, _) = free_name(&taken, 0, |n| match n {
                0 => format!("{}_orig", name),
                n => format!("{}_orig{}", name, n),
            });
            taken.insert(new_name.clone());
            warn!(
                "bind_roles: column {:?} is not bound to its role, renaming it to {:?}",
                name, new_name
            );
            *name = new_name;
        }
    }

    let find = |role: Role| located.iter().find(|(r, _)| *r == role).map(|(_, idx)| *idx);
    for (role, idx) in located.iter() {
        table.columns[*idx] = role.canonical_name().to_string();
    }

    Ok(BoundTable {
        enumerator: located[0].1,
        date: located[1].1,
        consent: find(Role::Consent),
        grouping: find(Role::Grouping),
        table,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str]) -> Table {
        Table {
            columns: columns.iter().map(|s| s.to_string()).collect(),
            rows: vec![],
        }
    }

    #[test]
    fn renames_to_canonical_names() {
        let t = table(&["enum_lab", "village", "int_date", "consent_q"]);
        let m = RoleMapping::new("enum_lab", "int_date")
            .consent("consent_q")
            .grouping("village");
        let b = bind_roles(t, &m).unwrap();
        assert_eq!(b.table.columns, vec!["enum", "grouping_var", "date", "consent"]);
        assert_eq!((b.enumerator, b.date), (0, 2));
        assert_eq!(b.consent, Some(3));
        assert_eq!(b.grouping, Some(1));
        assert_eq!(
            b.layout(),
            KeyLayout {
                grouping: true,
                consent: true
            }
        );
    }

    #[test]
    fn required_roles() {
        let t = table(&["a", "b"]);
        let m = RoleMapping {
            date: Some("b".to_string()),
            ..RoleMapping::default()
        };
        assert_eq!(
            bind_roles(t.clone(), &m),
            Err(PipelineError::MissingRequiredRole {
                role: Role::Enumerator
            })
        );
        // A blank selection is no selection.
        let m = RoleMapping::new("a", "  ");
        assert_eq!(
            bind_roles(t, &m),
            Err(PipelineError::MissingRequiredRole { role: Role::Date })
        );
    }

    #[test]
    fn missing_columns() {
        let t = table(&["enum", "date", "village_dup1"]);
        let m = RoleMapping::new("enum", "date").grouping("village");
        assert_eq!(
            bind_roles(t, &m),
            Err(PipelineError::RoleColumnNotFound {
                role: Role::Grouping,
                column: "village".to_string()
            })
        );
    }

    #[test]
    fn same_column_for_two_roles() {
        let t = table(&["enum", "date"]);
        let m = RoleMapping::new("enum", "date").grouping("enum");
        assert_eq!(
            bind_roles(t, &m),
            Err(PipelineError::AmbiguousMapping {
                first: Role::Enumerator,
                second: Role::Grouping,
                column: "enum".to_string()
            })
        );
    }

    #[test]
    fn unbound_canonical_names_are_moved_aside() {
        let t = table(&["enum", "enum_lab", "starttime"]);
        let m = RoleMapping::new("enum_lab", "starttime");
        let b = bind_roles(t, &m).unwrap();
        assert_eq!(b.table.columns, vec!["enum_orig", "enum", "date"]);
        assert_eq!(b.enumerator, 1);
    }

    #[test]
    fn moved_aside_names_stay_unique() {
        let t = table(&["enum", "enum_orig", "name", "day"]);
        let m = RoleMapping::new("name", "day");
        let b = bind_roles(t, &m).unwrap();
        assert_eq!(b.table.columns, vec!["enum_orig1", "enum_orig", "enum", "date"]);
        let unique: HashSet<&String> = b.table.columns.iter().collect();
        assert_eq!(unique.len(), 4);
        assert_eq!((b.enumerator, b.date), (2, 3));
    }

    #[test]
    fn empty_selection_for_optional_roles() {
        let t = table(&["enum", "date"]);
        let mut m = RoleMapping::new("enum", "date");
        m.consent = Some("".to_string());
        let b = bind_roles(t, &m).unwrap();
        assert_eq!(b.consent, None);
        assert_eq!(b.layout(), KeyLayout::default());
    }
}
