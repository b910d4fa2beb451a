use clap::Parser;

/// Builds a daily survey productivity sheet: the number of interviews per enumerator and per day.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file with the input, the column choices and the output options.
    /// The flags below override the values of the configuration file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The survey export to read (.xlsx, .xls, .xlsm, .ods or .csv).
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (excel or csv, optional) The type of the input. By default, it is guessed from the file extension.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// When using an Excel file with several worksheets, the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (default 1) The number of rows holding the column names. With more than one row, the names
    /// of each level are joined with an underscore.
    #[clap(long, value_parser)]
    pub header_rows: Option<usize>,

    /// The column with the enumerator (for example enum or enum_lab).
    #[clap(short, long, value_parser)]
    pub enumerator: Option<String>,

    /// The column with the date of the interview (for example int_date or SubmissionDate).
    #[clap(short, long, value_parser)]
    pub date: Option<String>,

    /// (optional) The column with the consent answer (1/0, yes/no, ...). The counts are then split by consent.
    #[clap(long, value_parser)]
    pub consent: Option<String>,

    /// (optional) A column to split the counts by, for example the village.
    #[clap(short, long, value_parser)]
    pub grouping: Option<String>,

    /// (pretty, safe, compact or iso; default pretty) The style of the date column headers.
    #[clap(long, value_parser)]
    pub header_style: Option<String>,

    /// (file path, 'stdout' or empty) Where to write the summary. Paths ending with .json produce JSON,
    /// the other ones CSV.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (csv or json, optional) The format of the summary, overriding the one guessed from --out.
    #[clap(long, value_parser)]
    pub output_format: Option<String>,

    /// (file path) A reference summary. If provided, the program checks that the output matches it.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging (on the standard error).
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
