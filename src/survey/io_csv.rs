// Primitives for reading CSV files.

use std::fs::File;

use daily_productivity::builder::TableBuilder;

use crate::survey::{
    io_common::{assemble_header, simplify_file_name},
    *,
};

/// Reads a CSV export. All the cells are read as text, and blank cells are
/// missing values.
pub fn read_csv_table(path: &str, header_rows: usize) -> BSurveyResult<RawTable> {
    let mut records = get_records(path)?;

    let mut header: Vec<Vec<String>> = Vec::new();
    for idx in 0..header_rows {
        let line = match records.next() {
            Some(line_r) => line_r.context(CsvLineParseSnafu { lineno: idx + 1 })?,
            None => {
                return Err(Box::new(SurveyError::MissingHeader {
                    path: path.to_string(),
                    header_rows,
                }));
            }
        };
        header.push(line.iter().map(|s| s.to_string()).collect());
    }
    debug!("read_csv_table: header: {:?}", header);

    let mut builder = TableBuilder::with_columns(assemble_header(&header));
    for (idx, line_r) in records.enumerate() {
        let lineno = idx + header_rows + 1;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        if line.iter().all(|s| s.trim().is_empty()) {
            debug!("read_csv_table: skipping blank line {}", lineno);
            continue;
        }
        let row: Vec<Value> = line.iter().map(read_cell).collect();
        builder.add_row(row);
    }
    debug!(
        "read_csv_table: {} rows in {}",
        builder.num_rows(),
        simplify_file_name(path)
    );
    Ok(builder.build())
}

fn read_cell(s: &str) -> Value {
    if s.trim().is_empty() {
        Value::Null
    } else {
        Value::Text(s.to_string())
    }
}

fn get_records(path: &str) -> SurveyResult<csv::StringRecordsIntoIter<File>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    Ok(rdr.into_records())
}
