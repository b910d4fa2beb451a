use crate::survey::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputSettings {
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    pub provider: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "headerRows")]
    _header_rows: Option<JSValue>,
}

impl InputSettings {
    pub fn header_rows(&self) -> SurveyResult<Option<usize>> {
        if self._header_rows.is_some() {
            read_js_int(&self._header_rows).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// The columns selected for each role. Empty strings mean that no column is selected.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnSettings {
    pub enumerator: Option<String>,
    pub date: Option<String>,
    pub consent: Option<String>,
    #[serde(rename = "groupingVar")]
    pub grouping_var: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "headerStyle")]
    pub header_style: Option<String>,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    pub format: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurveyConfig {
    #[serde(default)]
    pub input: InputSettings,
    #[serde(default)]
    pub columns: ColumnSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

pub fn read_config(path: &str) -> SurveyResult<SurveyConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read_config: content: {:?}", contents);
    let config: SurveyConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

/// Reads a JSON file and renders it in a canonical pretty form, for comparisons.
pub fn read_json_reference(path: &str) -> SurveyResult<String> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    serde_json::to_string_pretty(&js).context(ParsingJsonSnafu {})
}

fn read_js_int(x: &Option<JSValue>) -> SurveyResult<usize> {
    match x {
        Some(JSValue::Number(n)) => n
            .as_u64()
            .map(|x| x as usize)
            .context(ParsingJsonNumberSnafu {}),
        Some(JSValue::String(s)) => s
            .trim()
            .parse::<usize>()
            .ok()
            .context(ParsingJsonNumberSnafu {}),
        _ => None.context(ParsingJsonNumberSnafu {}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config() {
        let js = r#"{
            "columns": {"enumerator": "enum_lab", "date": "SubmissionDate", "groupingVar": ""}
        }"#;
        let config: SurveyConfig = serde_json::from_str(js).unwrap();
        assert_eq!(config.columns.enumerator, Some("enum_lab".to_string()));
        assert_eq!(config.columns.grouping_var, Some("".to_string()));
        assert_eq!(config.columns.consent, None);
        assert_eq!(config.input, InputSettings::default());
        assert_eq!(config.input.header_rows().unwrap(), None);
    }

    #[test]
    fn header_rows_as_number_or_string() {
        let config: SurveyConfig =
            serde_json::from_str(r#"{"input": {"headerRows": 2}}"#).unwrap();
        assert_eq!(config.input.header_rows().unwrap(), Some(2));
        let config: SurveyConfig =
            serde_json::from_str(r#"{"input": {"headerRows": "3"}}"#).unwrap();
        assert_eq!(config.input.header_rows().unwrap(), Some(3));
        let config: SurveyConfig =
            serde_json::from_str(r#"{"input": {"headerRows": "two"}}"#).unwrap();
        assert!(config.input.header_rows().is_err());
    }
}
