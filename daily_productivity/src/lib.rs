/*!
Daily productivity sheets for survey field work.

Survey collection platforms export one row per interview attempt. This crate
turns such an export into a summary with one row per enumerator (optionally
split by a grouping attribute such as the village, and by the consent
outcome) and one column per calendar date, plus a `Total` column.

The work is done in stages, each in its own module:
- [`schema`] cleans up the column names (composite and duplicated names),
- [`roles`] binds the selected columns to their roles,
- [`sanitize`] coerces the values (text, dates, consent),
- [`aggregate`] counts the rows per key and day,
- [`pivot`] reshapes the counts to wide form,
- [`headers`] renders the date headers in the requested style.

[`run_productivity_summary`] chains all of them. See the [`manual`] for the
command line program.
*/

mod config;
use log::{debug, info};

pub mod aggregate;
pub mod builder;
pub mod headers;
pub mod manual;
pub mod pivot;
pub mod roles;
pub mod sanitize;
pub mod schema;

pub use crate::config::*;

/// Runs the full pipeline on a table.
///
/// Arguments:
/// * `table` the table as read from the export
/// * `config` the columns selected for each role, and the header style
///
/// Rows with unreadable dates are dropped and reported in the diagnostics.
/// Structural problems (missing or ambiguous roles, nested values, nothing
/// left to count) are returned as errors, and no table is produced.
pub fn run_productivity_summary(
    table: RawTable,
    config: &PipelineConfig,
) -> Result<Summary, PipelineError> {
    info!(
        "Processing {:?} rows, {:?} columns, config: {:?}",
        table.rows.len(),
        table.columns.len(),
        config
    );
    let input_rows = table.rows.len();

    let (normalized, renamed_columns) = schema::normalize_columns(table);
    let bound = roles::bind_roles(normalized, &config.roles)?;
    let sanitized = sanitize::sanitize(&bound)?;
    debug!(
        "run_productivity_summary: {} valid rows, layout: {:?}",
        sanitized.rows.len(),
        sanitized.layout
    );

    let counts = aggregate::count_by_day(&sanitized);
    let wide = pivot::pivot_wide(&counts);
    let display = headers::format_headers(&wide, config.header_style);

    let diagnostics = Diagnostics {
        renamed_columns,
        input_rows,
        dropped_invalid_dates: sanitized.dropped_invalid_dates,
        truncated_timestamps: sanitized.truncated_timestamps,
        valid_rows: sanitized.rows.len(),
    };
    info!(
        "Generated {} rows over {} dates ({} of {} input rows counted)",
        wide.rows.len(),
        wide.dates.len(),
        diagnostics.valid_rows,
        diagnostics.input_rows
    );

    Ok(Summary {
        wide,
        display,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::builder::TableBuilder;
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn scenario() -> RawTable {
        let mut b = TableBuilder::new(&["enum", "date", "consent"]);
        b.add_row_simple(&["A", "2025-09-10", "yes"]);
        b.add_row_simple(&["A", "2025-09-10", "no"]);
        b.add_row_simple(&["B", "2025-09-11", "yes"]);
        b.build()
    }

    fn config(roles: RoleMapping) -> PipelineConfig {
        PipelineConfig {
            roles,
            header_style: HeaderStyle::Safe,
        }
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn row(enumerator: &str, consent: &str, counts: &[u64]) -> Vec<Cell> {
        let mut cells = vec![text(enumerator), text(consent)];
        cells.extend(counts.iter().map(|c| Cell::Count(*c)));
        cells
    }

    #[test]
    fn split_by_consent() {
        init();
        let s = run_productivity_summary(
            scenario(),
            &config(RoleMapping::new("enum", "date").consent("consent")),
        )
        .unwrap();
        assert_eq!(
            s.display.columns,
            vec!["enum", "consent_status", "d_10Sep2025", "d_11Sep2025", "Total"]
        );
        assert_eq!(
            s.display.rows,
            vec![
                row("A", "Yes", &[1, 0, 1]),
                row("A", "No", &[1, 0, 1]),
                row("B", "Yes", &[0, 1, 1]),
            ]
        );
    }

    #[test]
    fn without_consent() {
        init();
        let roles = RoleMapping::new("enum", "date");
        let s = run_productivity_summary(scenario(), &config(roles)).unwrap();
        assert_eq!(s.wide.column_names(), vec!["enum", "d_10Sep2025", "d_11Sep2025", "Total"]);
        assert_eq!(s.wide.count(0, "d_10Sep2025"), Some(2));
        assert_eq!(s.wide.count(0, "d_11Sep2025"), Some(0));
        assert_eq!(s.wide.count(0, "Total"), Some(2));
        assert_eq!(s.wide.count(1, "d_10Sep2025"), Some(0));
        assert_eq!(s.wide.count(1, "d_11Sep2025"), Some(1));
        assert_eq!(s.wide.count(1, "Total"), Some(1));
        assert_eq!(s.wide.rows.len(), 2);
    }

    #[test]
    fn totals_add_up() {
        init();
        let mut b = TableBuilder::new(&["enum", "village", "SubmissionDate", "consent"]);
        b.add_row_simple(&["A", "Siaya", "Sep 10, 2025 9:05:00 AM", "1"]);
        b.add_row_simple(&["A", "Siaya", "Sep 10, 2025 2:32:00 PM", "0"]);
        b.add_row_simple(&["A", "Kisumu", "Sep 12, 2025 8:00:00 AM", "1"]);
        b.add_row_simple(&["", "Kisumu", "Sep 12, 2025 8:30:00 AM", "y"]);
        b.add_row_simple(&["B", "", "Sep 11, 2025 11:00:00 AM", ""]);
        b.add_row_simple(&["B", "Siaya", "", "yes"]);
        let s = run_productivity_summary(
            b.build(),
            &config(
                RoleMapping::new("enum", "SubmissionDate")
                    .consent("consent")
                    .grouping("village"),
            ),
        )
        .unwrap();
        for r in s.wide.rows.iter() {
            assert_eq!(r.total, r.counts.iter().sum::<u64>());
        }
        let grand_total: u64 = s.wide.rows.iter().map(|r| r.total).sum();
        assert_eq!(grand_total, s.diagnostics.valid_rows as u64);
        assert_eq!(s.diagnostics.valid_rows, 5);
        assert_eq!(s.diagnostics.input_rows, 6);
        assert_eq!(s.diagnostics.dropped_invalid_dates, 1);
        assert_eq!(s.diagnostics.truncated_timestamps, 5);
        assert_eq!(s.wide.dates.len(), 3);

        let keys: Vec<(String, String, String)> = s
            .display
            .rows
            .iter()
            .map(|r| (r[0].to_string(), r[1].to_string(), r[2].to_string()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("A".to_string(), "Kisumu".to_string(), "Yes".to_string()),
                ("A".to_string(), "Siaya".to_string(), "Yes".to_string()),
                ("A".to_string(), "Siaya".to_string(), "No".to_string()),
                ("B".to_string(), "Unknown".to_string(), "No".to_string()),
                ("Unknown".to_string(), "Kisumu".to_string(), "Yes".to_string()),
            ]
        );
        assert_eq!(
            &s.display.columns[..3],
            &["enum", "grouping_var", "consent_status"]
        );
    }

    #[test]
    fn same_day_timestamps_share_a_column() {
        init();
        let mut b = TableBuilder::new(&["enum", "starttime"]);
        b.add_row_simple(&["A", "2025-09-10T14:32:00"]);
        b.add_row_simple(&["A", "2025-09-10T09:05:00"]);
        let roles = RoleMapping::new("enum", "starttime");
        let s = run_productivity_summary(b.build(), &config(roles)).unwrap();
        assert_eq!(s.wide.column_names(), vec!["enum", "d_10Sep2025", "Total"]);
        assert_eq!(s.wide.count(0, "d_10Sep2025"), Some(2));
    }

    #[test]
    fn duplicated_columns_can_be_selected() {
        init();
        let mut b = TableBuilder::new(&["enum", "date", "date"]);
        b.add_row_simple(&["A", "garbage", "2025-09-10"]);
        let roles = RoleMapping::new("enum", "date_dup1");
        let s = run_productivity_summary(b.build(), &config(roles)).unwrap();
        assert_eq!(
            s.diagnostics.renamed_columns,
            vec![("date".to_string(), "date_dup1".to_string())]
        );
        assert_eq!(s.wide.count(0, "Total"), Some(1));
    }

    #[test]
    fn no_survivors() {
        init();
        let mut b = TableBuilder::new(&["enum", "date"]);
        b.add_row_simple(&["A", "tomorrow"]);
        b.add_row_simple(&["B", "13/45/2025"]);
        let res = run_productivity_summary(b.build(), &config(RoleMapping::new("enum", "date")));
        assert_eq!(res, Err(PipelineError::NoValidRows { dropped_dates: 2 }));
    }

    #[test]
    fn fatal_errors() {
        init();
        let res = run_productivity_summary(
            scenario(),
            &config(RoleMapping::new("enum", "date").grouping("village")),
        );
        assert_eq!(
            res,
            Err(PipelineError::RoleColumnNotFound {
                role: Role::Grouping,
                column: "village".to_string()
            })
        );
        let res = run_productivity_summary(
            TableBuilder::new(&["enum", "date"]).build(),
            &config(RoleMapping::new("enum", "date")),
        );
        assert_eq!(res, Err(PipelineError::EmptyTable {}));
    }
}
