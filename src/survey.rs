use log::{debug, info, warn};

use daily_productivity::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use text_diff::print_diff;

use crate::args::Args;
use crate::survey::config_reader::*;
use crate::survey::io_output::OutputFormat;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_excel;
pub mod io_output;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SurveyError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::Error,
        path: String,
    },
    #[snafu(display("The workbook {path} does not contain any worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("Worksheet {name:?} not found in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display(
        "The workbook {path} has several worksheets {names:?}, the worksheet name must be provided"
    ))]
    AmbiguousWorksheet { path: String, names: Vec<String> },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of the CSV file"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("The file {path} does not have the {header_rows} header rows expected"))]
    MissingHeader { path: String, header_rows: usize },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a number in the configuration"))]
    ParsingJsonNumber {},
    #[snafu(display("Error writing the CSV output"))]
    CsvWrite { source: csv::Error },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading the reference file {path}"))]
    OpeningReference {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Cannot compute the summary: {source}"))]
    Pipeline { source: PipelineError },
    #[snafu(display("Difference detected between calculated summary and reference summary {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SurveyResult<T> = Result<T, SurveyError>;
pub type BSurveyResult<T> = Result<T, Box<SurveyError>>;

/// The kinds of inputs that can be read.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Provider {
    Csv,
    Excel,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

/// Everything needed for one run, once the configuration file and the flags are merged.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RunSettings {
    pub input_path: PathBuf,
    pub provider: Provider,
    pub excel_worksheet_name: Option<String>,
    pub header_rows: usize,
    pub pipeline: PipelineConfig,
    pub output: OutputTarget,
    pub output_format: OutputFormat,
    pub reference: Option<PathBuf>,
}

fn parse_provider(s: &str) -> SurveyResult<Provider> {
    match s.trim().to_lowercase().as_str() {
        "csv" => Ok(Provider::Csv),
        "excel" | "xlsx" | "xls" | "xlsm" | "ods" => Ok(Provider::Excel),
        x => whatever!("Provider not implemented {:?}", x),
    }
}

fn parse_header_style(s: &str) -> SurveyResult<HeaderStyle> {
    match s.parse::<HeaderStyle>() {
        Ok(style) => Ok(style),
        Err(msg) => whatever!("{}", msg),
    }
}

/// Merges the command line flags and the configuration file (if any).
///
/// Flags take precedence. Paths from the configuration file are relative to
/// its directory.
pub fn resolve_settings(
    args: &Args,
    config: &SurveyConfig,
    root: &Path,
) -> SurveyResult<RunSettings> {
    let input_path: PathBuf = match (&args.input, &config.input.file_path) {
        (Some(p), _) => PathBuf::from(p),
        (None, Some(p)) => root.join(p),
        (None, None) => whatever!("No input file provided"),
    };
    let input_display = input_path.display().to_string();

    let provider = match args.input_type.as_ref().or(config.input.provider.as_ref()) {
        Some(s) => parse_provider(s)?,
        None => match io_common::provider_from_path(&input_display) {
            Some(p) => p,
            None => whatever!(
                "Cannot guess the type of the input {:?}, please provide it",
                input_display
            ),
        },
    };

    let header_rows = match args.header_rows {
        Some(n) => n,
        None => config.input.header_rows()?.unwrap_or(1),
    };
    if header_rows == 0 {
        whatever!("The input must have at least one header row");
    }

    let pick =
        |flag: &Option<String>, conf: &Option<String>| flag.clone().or_else(|| conf.clone());
    let roles = RoleMapping {
        enumerator: pick(&args.enumerator, &config.columns.enumerator),
        date: pick(&args.date, &config.columns.date),
        consent: pick(&args.consent, &config.columns.consent),
        grouping: pick(&args.grouping, &config.columns.grouping_var),
    };

    let header_style = match pick(&args.header_style, &config.output.header_style) {
        Some(s) => parse_header_style(&s)?,
        None => HeaderStyle::default(),
    };

    let output = match (&args.out, &config.output.output_path) {
        (Some(p), _) if p == "stdout" || p.is_empty() => OutputTarget::Stdout,
        (Some(p), _) => OutputTarget::File(PathBuf::from(p)),
        (None, Some(p)) if p == "stdout" || p.is_empty() => OutputTarget::Stdout,
        (None, Some(p)) => OutputTarget::File(root.join(p)),
        (None, None) => OutputTarget::Stdout,
    };

    let output_format = match pick(&args.output_format, &config.output.format) {
        Some(s) => io_output::parse_output_format(&s)?,
        None => match &output {
            OutputTarget::File(p) => io_output::format_from_path(&p.display().to_string()),
            OutputTarget::Stdout => OutputFormat::Csv,
        },
    };

    Ok(RunSettings {
        input_path,
        provider,
        excel_worksheet_name: pick(
            &args.excel_worksheet_name,
            &config.input.excel_worksheet_name,
        ),
        header_rows,
        pipeline: PipelineConfig {
            roles,
            header_style,
        },
        output,
        output_format,
        reference: args.reference.as_ref().map(PathBuf::from),
    })
}

fn read_survey_data(settings: &RunSettings) -> BSurveyResult<RawTable> {
    let p = settings.input_path.display().to_string();
    info!("Attempting to read survey file {:?}", p);
    let table = match settings.provider {
        Provider::Csv => io_csv::read_csv_table(&p, settings.header_rows),
        Provider::Excel => io_excel::read_excel_table(
            &p,
            settings.excel_worksheet_name.as_deref(),
            settings.header_rows,
        ),
    }?;
    info!(
        "Loaded {} rows and {} columns from {}",
        table.rows.len(),
        table.columns.len(),
        io_common::simplify_file_name(&p)
    );
    Ok(table)
}

fn report_diagnostics(d: &Diagnostics) {
    for (from, to) in d.renamed_columns.iter() {
        warn!("Duplicate column name {:?}: renamed to {:?}", from, to);
    }
    if d.dropped_invalid_dates > 0 {
        warn!(
            "{} rows out of {} were skipped: missing or unreadable date",
            d.dropped_invalid_dates, d.input_rows
        );
    }
    info!(
        "Counted {} rows out of {} ({} timestamps reduced to their date)",
        d.valid_rows, d.input_rows, d.truncated_timestamps
    );
}

/// Compares the output with a reference file, and prints the differences if any.
fn check_reference(
    produced: &str,
    format: OutputFormat,
    reference_path: &Path,
) -> BSurveyResult<()> {
    let path = reference_path.display().to_string();
    let (expected, actual) = match format {
        OutputFormat::Json => {
            let expected = read_json_reference(&path)?;
            let js: serde_json::Value =
                serde_json::from_str(produced).context(ParsingJsonSnafu {})?;
            let actual = serde_json::to_string_pretty(&js).context(ParsingJsonSnafu {})?;
            (expected, actual)
        }
        OutputFormat::Csv => {
            let contents = fs::read_to_string(&path).context(OpeningReferenceSnafu {
                path: path.clone(),
            })?;
            (
                io_common::normalize_text(&contents),
                io_common::normalize_text(produced),
            )
        }
    };
    if expected != actual {
        warn!("Found differences with the reference file {}", path);
        print_diff(expected.as_str(), actual.as_str(), "\n");
        return Err(Box::new(SurveyError::ReferenceMismatch { path }));
    }
    info!("The summary matches the reference {}", path);
    Ok(())
}

/// Runs a full summary: reads the input, computes the summary, writes it out
/// and checks it against the reference if one is given.
///
/// Returns the rendered summary.
pub fn run_summary(settings: &RunSettings) -> BSurveyResult<String> {
    debug!("run_summary: settings: {:?}", settings);
    let table = read_survey_data(settings)?;

    let summary =
        run_productivity_summary(table, &settings.pipeline).context(PipelineSnafu {})?;
    report_diagnostics(&summary.diagnostics);

    let rendered = match settings.output_format {
        OutputFormat::Csv => io_output::summary_to_csv(&summary.display)?,
        OutputFormat::Json => {
            let js = io_output::summary_to_json(&summary);
            serde_json::to_string_pretty(&js).context(ParsingJsonSnafu {})?
        }
    };
    io_output::write_output(&rendered, &settings.output)?;

    if let Some(reference) = &settings.reference {
        check_reference(&rendered, settings.output_format, reference)?;
    }
    Ok(rendered)
}

pub fn run_summary_args(args: &Args) -> BSurveyResult<String> {
    let (config, root) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            info!("config: {:?}", config);
            let root = Path::new(config_path)
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            (config, root)
        }
        None => (SurveyConfig::default(), PathBuf::new()),
    };
    let settings = resolve_settings(args, &config, &root)?;
    run_summary(&settings)
}
