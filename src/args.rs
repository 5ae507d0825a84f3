use clap::Parser;

/// Computes the ACLED conflict dashboard (summary statistics and chart data) for Israel and Palestine.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file describing the input, the filters and the output.
    /// Command line flags take precedence over the values of the configuration file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, default Israel-Palestine.xlsx) The file containing the incident records.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (xlsx or csv) The type of the input. Inferred from the extension of the file if not provided.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// When using an Excel file, the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (Israel, Palestine or Both; default Both) The country to show.
    #[clap(long, value_parser)]
    pub country: Option<String>,

    /// The first year to include. Defaults to the first year present in the data.
    #[clap(long, value_parser)]
    pub from_year: Option<i32>,

    /// The last year to include. Defaults to the last year present in the data.
    #[clap(long, value_parser)]
    pub to_year: Option<i32>,

    /// (repeated, optional) The disorder types to include. All the disorder types present
    /// for the selected country and years are included if not specified.
    #[clap(long, value_parser)]
    pub disorder_type: Option<Vec<String>>,

    /// (repeated, optional) The event types to include. All the event types present
    /// for the selected country and years are included if not specified.
    #[clap(long, value_parser)]
    pub event_type: Option<Vec<String>>,

    /// (file path, 'stdout' or empty) Where to write the dashboard in JSON format.
    /// Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// If passed, the filtered rows are included in the output.
    #[clap(long, takes_value = false)]
    pub rows: bool,

    /// (default 20) The number of locations kept in the location chart.
    #[clap(long, value_parser)]
    pub top_locations: Option<usize>,

    /// (file path) A reference dashboard in JSON format. If provided, acledash will
    /// check that the output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// If passed, reads one JSON filter object per line on the standard input after the first
    /// output, and prints the updated dashboard for each of them.
    #[clap(long, takes_value = false)]
    pub interactive: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
