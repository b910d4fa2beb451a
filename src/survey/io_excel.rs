// Primitives for reading spreadsheets (Excel and OpenDocument).

use calamine::{open_workbook_auto, DataType, Reader};
use chrono::{Duration, NaiveDate, NaiveDateTime};

use daily_productivity::builder::TableBuilder;

use crate::survey::{io_common::assemble_header, *};

/// Reads a worksheet of a workbook.
///
/// Cells keep their types: numbers, booleans and dates are not turned into text.
pub fn read_excel_table(
    path: &str,
    worksheet: Option<&str>,
    header_rows: usize,
) -> BSurveyResult<RawTable> {
    let wrange = get_range(path, worksheet)?;

    let mut iter = wrange.rows();
    let mut header: Vec<Vec<String>> = Vec::new();
    for _ in 0..header_rows {
        let row = iter.next().context(MissingHeaderSnafu { path, header_rows })?;
        header.push(row.iter().map(header_cell).collect());
    }
    debug!("read_excel_table: header: {:?}", header);

    let mut builder = TableBuilder::with_columns(assemble_header(&header));
    for (idx, row) in iter.enumerate() {
        let lineno = (idx + header_rows + 1) as u64;
        if row.iter().all(|c| matches!(c, DataType::Empty)) {
            debug!("read_excel_table: skipping empty line {}", lineno);
            continue;
        }
        let values: Vec<Value> = row.iter().map(|c| read_cell(c, lineno)).collect();
        builder.add_row(values);
    }
    Ok(builder.build())
}

fn header_cell(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Empty => String::new(),
        x => x.to_string(),
    }
}

fn read_cell(cell: &DataType, lineno: u64) -> Value {
    match cell {
        DataType::Empty => Value::Null,
        DataType::String(s) if s.trim().is_empty() => Value::Null,
        DataType::String(s) => Value::Text(s.clone()),
        DataType::Int(i) => Value::Int(*i),
        DataType::Float(f) => Value::Float(*f),
        DataType::Bool(b) => Value::Bool(*b),
        // Not a calendar date: kept as the number, which no date parser accepts.
        DataType::DateTime(serial) => excel_serial_to_value(*serial).unwrap_or_else(|| {
            debug!("read_cell: line {}: serial {} is not a date", lineno, serial);
            Value::Float(*serial)
        }),
        DataType::Error(e) => {
            warn!("read_cell: line {}: error cell {:?}, read as missing", lineno, e);
            Value::Null
        }
    }
}

/// Converts a spreadsheet serial date (days since 1899-12-30) into a date, or
/// a date-time when it carries a time of day.
///
/// Serials below 1 are times without a date and are not read. Excel counts a
/// 29 February 1900 that never existed, so the serials before it (below 60)
/// start one day later.
fn excel_serial_to_value(serial: f64) -> Option<Value> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch_day = if serial < 60.0 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    let epoch: NaiveDateTime = epoch_day.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * 86_400.0).round() as i64;
    let dt = epoch.checked_add_signed(Duration::seconds(seconds))?;
    if seconds % 86_400 == 0 {
        Some(Value::Date(dt.date()))
    } else {
        Some(Value::DateTime(dt))
    }
}

fn get_range(path: &str, worksheet: Option<&str>) -> BSurveyResult<calamine::Range<DataType>> {
    debug!("get_range: path: {:?} worksheet: {:?}", path, worksheet);
    let mut workbook = open_workbook_auto(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet {
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                name: worksheet_name,
                path,
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let mut all_worksheets = workbook.worksheets();
        match all_worksheets.len() {
            0 => Err(Box::new(SurveyError::EmptyExcel {
                path: path.to_string(),
            })),
            1 => {
                let (worksheet_name, wrange) = all_worksheets.remove(0);
                debug!(
                    "get_range: path: {:?} worksheet: {:?}",
                    path, worksheet_name
                );
                Ok(wrange)
            }
            _ => Err(Box::new(SurveyError::AmbiguousWorksheet {
                path: path.to_string(),
                names: all_worksheets.into_iter().map(|(n, _)| n).collect(),
            })),
        }
    }
}
