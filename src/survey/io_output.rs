// Rendering and writing of the summary.

use std::io::Write;

use serde_json::json;
use serde_json::Value as JSValue;

use crate::survey::*;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum OutputFormat {
    Csv,
    Json,
}

pub fn parse_output_format(s: &str) -> SurveyResult<OutputFormat> {
    match s.trim().to_lowercase().as_str() {
        "csv" => Ok(OutputFormat::Csv),
        "json" => Ok(OutputFormat::Json),
        x => whatever!("Output format not implemented {:?}", x),
    }
}

/// JSON for paths ending in `.json`, CSV for everything else.
pub fn format_from_path(path: &str) -> OutputFormat {
    if path.to_lowercase().ends_with(".json") {
        OutputFormat::Json
    } else {
        OutputFormat::Csv
    }
}

pub fn summary_to_csv(table: &DisplayTable) -> SurveyResult<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(&table.columns).context(CsvWriteSnafu {})?;
    for row in table.rows.iter() {
        wtr.write_record(row.iter().map(|c| c.to_string()))
            .context(CsvWriteSnafu {})?;
    }
    let bytes = match wtr.into_inner() {
        Ok(b) => b,
        Err(e) => whatever!("Cannot flush the CSV output: {}", e),
    };
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => whatever!("The CSV output is not valid UTF-8: {}", e),
    }
}

fn cell_to_json(cell: &Cell) -> JSValue {
    match cell {
        Cell::Text(s) => json!(s),
        Cell::Count(c) => json!(c),
    }
}

/// The summary as JSON: the displayed table and the diagnostics of the run.
pub fn summary_to_json(summary: &Summary) -> JSValue {
    let rows: Vec<JSValue> = summary
        .display
        .rows
        .iter()
        .map(|r| JSValue::Array(r.iter().map(cell_to_json).collect()))
        .collect();
    let d = &summary.diagnostics;
    let renamed: Vec<JSValue> = d
        .renamed_columns
        .iter()
        .map(|(from, to)| json!({"from": from, "to": to}))
        .collect();
    json!({
        "columns": summary.display.columns,
        "rows": rows,
        "diagnostics": {
            "inputRows": d.input_rows,
            "validRows": d.valid_rows,
            "droppedInvalidDates": d.dropped_invalid_dates,
            "truncatedTimestamps": d.truncated_timestamps,
            "renamedColumns": renamed
        }
    })
}

pub fn write_output(rendered: &str, target: &OutputTarget) -> SurveyResult<()> {
    match target {
        OutputTarget::Stdout => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(rendered.as_bytes())
                .context(WritingOutputSnafu { path: "stdout" })?;
            if !rendered.ends_with('\n') {
                handle
                    .write_all(b"\n")
                    .context(WritingOutputSnafu { path: "stdout" })?;
            }
        }
        OutputTarget::File(p) => {
            let path = p.display().to_string();
            if let Some(parent) = p.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)
                        .context(WritingOutputSnafu { path: path.clone() })?;
                }
            }
            fs::write(p, rendered).context(WritingOutputSnafu { path: path.clone() })?;
            info!("Wrote the summary to {}", path);
        }
    }
    Ok(())
}
