use std::path::Path;

use daily_productivity::ColumnName;

use crate::survey::Provider;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Guesses the kind of input from the extension of the file.
pub fn provider_from_path(path: &str) -> Option<Provider> {
    let ext = Path::new(path).extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "csv" => Some(Provider::Csv),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(Provider::Excel),
        _ => None,
    }
}

/// Builds the column names from the header rows of a file.
///
/// With a single header row, the names are taken as they are. With more rows,
/// each column gets one part per row. Group labels are usually written once
/// above a span of columns, so the blank cells of the upper rows take the
/// label on their left.
pub fn assemble_header(header_rows: &[Vec<String>]) -> Vec<ColumnName> {
    let width = header_rows.iter().map(|r| r.len()).max().unwrap_or(0);
    let mut cleaned: Vec<Vec<String>> = header_rows
        .iter()
        .enumerate()
        .map(|(ridx, row)| {
            let mut r: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(cidx, s)| {
                    if ridx == 0 && cidx == 0 {
                        s.trim_start_matches('\u{feff}').to_string()
                    } else {
                        s.clone()
                    }
                })
                .collect();
            r.resize(width, String::new());
            r
        })
        .collect();

    if cleaned.len() == 1 {
        return cleaned[0]
            .iter()
            .map(|s| ColumnName::Simple(s.clone()))
            .collect();
    }

    let last = cleaned.len().saturating_sub(1);
    for row in cleaned.iter_mut().take(last) {
        let mut current = String::new();
        for cell in row.iter_mut() {
            if cell.trim().is_empty() {
                *cell = current.clone();
            } else {
                current = cell.clone();
            }
        }
    }
    (0..width)
        .map(|cidx| ColumnName::Composite(cleaned.iter().map(|r| r[cidx].clone()).collect()))
        .collect()
}

/// Line endings and trailing spaces do not count when comparing text outputs.
pub fn normalize_text(s: &str) -> String {
    let mut res: Vec<&str> = s.lines().map(|l| l.trim_end()).collect();
    while res.last().map(|l| l.is_empty()).unwrap_or(false) {
        res.pop();
    }
    res.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn single_header_row() {
        let h = assemble_header(&[row(&["\u{feff}enum", "date", ""])]);
        assert_eq!(
            h,
            vec![
                ColumnName::from("enum"),
                ColumnName::from("date"),
                ColumnName::from("")
            ]
        );
    }

    #[test]
    fn group_labels_span_columns() {
        let h = assemble_header(&[
            row(&["", "interview", "", "respondent"]),
            row(&["id", "enumerator", "date", "consent"]),
        ]);
        let names: Vec<String> = h
            .iter()
            .map(daily_productivity::schema::flatten_column_name)
            .collect();
        assert_eq!(
            names,
            vec!["id", "interview_enumerator", "interview_date", "respondent_consent"]
        );
    }

    #[test]
    fn ragged_header_rows() {
        let h = assemble_header(&[row(&["a"]), row(&["x", "y"])]);
        assert_eq!(h.len(), 2);
        assert_eq!(
            h[1],
            ColumnName::Composite(vec!["a".to_string(), "y".to_string()])
        );
    }

    #[test]
    fn providers() {
        assert_eq!(provider_from_path("data/export.CSV"), Some(Provider::Csv));
        assert_eq!(provider_from_path("export.xlsx"), Some(Provider::Excel));
        assert_eq!(provider_from_path("export.ods"), Some(Provider::Excel));
        assert_eq!(provider_from_path("export.sav"), None);
        assert_eq!(provider_from_path("export"), None);
    }

    #[test]
    fn text_normalization() {
        assert_eq!(normalize_text("a,b \r\n1,2\r\n\r\n"), "a,b\n1,2");
    }
}
