use log::{debug, info, warn};

use conflict_stats::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::dashboard::config_reader::*;

pub mod config_reader;
mod io_common;
mod io_csv;
#[cfg(feature = "excel")]
mod io_excel;
mod output;

pub const DEFAULT_INPUT: &str = "Israel-Palestine.xlsx";
pub const DEFAULT_TOP_LOCATIONS: usize = 20;

#[derive(Debug, Snafu)]
pub enum DashboardError {
    #[snafu(display("The file '{path}' was not found. Please check the file path."))]
    FileNotFound { path: String },
    #[snafu(display(
        "Cannot read {provider} files: this program was built without the '{feature}' feature. Please ensure it is installed."
    ))]
    MissingReader {
        provider: String,
        feature: String,
    },
    #[snafu(display("Unknown input type {input_type:?} for file {path} (expected xlsx or csv)"))]
    UnknownProvider { input_type: String, path: String },
    #[snafu(display("Error opening file {path}: {message}"))]
    OpeningExcel { message: String, path: String },
    #[snafu(display("The workbook {path} has no worksheet {worksheet:?}"))]
    MissingWorksheet { path: String, worksheet: String },
    #[snafu(display("The file has no header row"))]
    EmptyInput {},
    #[snafu(display("Missing required column {column:?}"))]
    MissingColumn { column: String },
    #[snafu(display("Line {lineno}: could not read column {column:?} from {content:?}"))]
    InvalidCell {
        lineno: usize,
        column: String,
        content: String,
    },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing CSV line"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading the standard input"))]
    ReadingInput { source: std::io::Error },
    #[snafu(display("Invalid selection: {source}"))]
    Selection { source: FilterError },
    #[snafu(display("Difference detected between the dashboard and the reference {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashResult<T> = Result<T, DashboardError>;

/// The supported input formats.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Provider {
    Xlsx,
    Csv,
}

impl Provider {
    /// The provider given explicitly, or the one matching the extension of the file.
    pub fn resolve(input_type: Option<&str>, path: &str) -> DashResult<Provider> {
        let t = match input_type {
            Some(t) => t.to_lowercase(),
            None => Path::new(path)
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_lowercase(),
        };
        match t.as_str() {
            "xlsx" | "xlsm" | "xls" | "excel" => Ok(Provider::Xlsx),
            "csv" => Ok(Provider::Csv),
            _ => UnknownProviderSnafu {
                input_type: t,
                path: path.to_string(),
            }
            .fail(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Xlsx => "xlsx",
            Provider::Csv => "csv",
        }
    }
}

/// Where the table comes from.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct InputSource {
    pub path: String,
    pub provider: Provider,
    pub excel_worksheet_name: Option<String>,
}

/// Reads the whole table. Fails if the file is absent or cannot be parsed.
pub fn load_dataset(source: &InputSource) -> DashResult<Dataset> {
    let path = source.path.clone();
    info!(
        "Attempting to read {} file {:?}",
        source.provider.name(),
        path
    );
    ensure!(Path::new(&path).is_file(), FileNotFoundSnafu { path });
    let dataset = match source.provider {
        Provider::Csv => io_csv::read_csv_incidents(&path)?,
        Provider::Xlsx => read_excel(&path, source)?,
    };
    info!(
        "Read {} incidents from {:?}, schema: {:?}",
        dataset.len(),
        path,
        dataset.schema
    );
    Ok(dataset)
}

#[cfg(feature = "excel")]
fn read_excel(path: &str, source: &InputSource) -> DashResult<Dataset> {
    io_excel::read_excel_incidents(path, source.excel_worksheet_name.as_deref())
}

#[cfg(not(feature = "excel"))]
fn read_excel(_path: &str, _source: &InputSource) -> DashResult<Dataset> {
    MissingReaderSnafu {
        provider: Provider::Xlsx.name(),
        feature: "excel",
    }
    .fail()
}

/// The table, loaded on first access and then kept for the lifetime of the cache.
///
/// A failed load is not remembered: the next call reads the file again.
#[derive(Debug)]
pub struct DatasetCache {
    source: InputSource,
    dataset: OnceLock<Dataset>,
}

impl DatasetCache {
    pub fn new(source: InputSource) -> DatasetCache {
        DatasetCache {
            source,
            dataset: OnceLock::new(),
        }
    }

    pub fn source(&self) -> &InputSource {
        &self.source
    }

    pub fn get(&self) -> DashResult<&Dataset> {
        if let Some(ds) = self.dataset.get() {
            debug!("DatasetCache: hit for {:?}", self.source.path);
            return Ok(ds);
        }
        let ds = load_dataset(&self.source)?;
        Ok(self.dataset.get_or_init(|| ds))
    }
}

/// The complete settings of one run, after merging the configuration file and the flags.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RunSettings {
    pub input: InputSource,
    pub filters: FilterSettings,
    pub output_path: Option<String>,
    pub include_rows: bool,
    pub top_locations: usize,
    pub reference_path: Option<String>,
    pub interactive: bool,
}

impl RunSettings {
    pub fn from_args(args: &Args) -> DashResult<RunSettings> {
        let config: Option<DashboardConfig> = match &args.config {
            Some(p) => Some(read_config(p)?),
            None => None,
        };
        let root_dir: Option<PathBuf> = args
            .config
            .as_ref()
            .and_then(|p| Path::new(p).parent().map(|d| d.to_path_buf()));

        let input_settings = config
            .as_ref()
            .and_then(|c| c.input_settings.clone())
            .unwrap_or_default();
        let path = match (&args.input, &input_settings.file_path) {
            (Some(p), _) => p.clone(),
            (None, Some(p)) => resolve_relative(root_dir.as_deref(), p),
            (None, None) => DEFAULT_INPUT.to_string(),
        };
        let input_type = args
            .input_type
            .clone()
            .or_else(|| input_settings.provider.clone());
        let provider = Provider::resolve(input_type.as_deref(), &path)?;
        let input = InputSource {
            path,
            provider,
            excel_worksheet_name: args
                .excel_worksheet_name
                .clone()
                .or(input_settings.excel_worksheet_name),
        };

        let config_filters = config
            .as_ref()
            .and_then(|c| c.filters.clone())
            .unwrap_or_default();
        let filters = FilterSettings {
            country: args.country.clone().or(config_filters.country),
            from_year: args.from_year.or(config_filters.from_year),
            to_year: args.to_year.or(config_filters.to_year),
            disorder_types: args.disorder_type.clone().or(config_filters.disorder_types),
            event_types: args.event_type.clone().or(config_filters.event_types),
        };

        let output_settings = config
            .as_ref()
            .and_then(|c| c.output_settings.clone())
            .unwrap_or_default();
        let output_path = args.out.clone().or_else(|| {
            output_settings
                .output_path
                .map(|p| resolve_relative(root_dir.as_deref(), &p))
        });

        Ok(RunSettings {
            input,
            filters,
            output_path,
            include_rows: args.rows || output_settings.include_rows.unwrap_or(false),
            top_locations: args
                .top_locations
                .or(output_settings.top_locations)
                .unwrap_or(DEFAULT_TOP_LOCATIONS),
            reference_path: args.reference.clone(),
            interactive: args.interactive,
        })
    }
}

fn resolve_relative(root_dir: Option<&Path>, p: &str) -> String {
    if p == "stdout" || Path::new(p).is_absolute() {
        return p.to_string();
    }
    match root_dir {
        Some(dir) => {
            let full: PathBuf = [dir, Path::new(p)].iter().collect();
            full.display().to_string()
        }
        None => p.to_string(),
    }
}

/// Runs the pipeline once with the given filters, from the cached table.
pub fn render(
    cache: &DatasetCache,
    filters: &FilterSettings,
    settings: &RunSettings,
) -> DashResult<JSValue> {
    let dataset = cache.get()?;
    let builder = filters.to_builder().context(SelectionSnafu {})?;
    let result = run_dashboard(dataset, &builder).context(SelectionSnafu {})?;
    Ok(output::build_dashboard_js(
        &cache.source().path,
        &result,
        settings.include_rows,
        settings.top_locations,
    ))
}

fn write_output(js: &JSValue, output_path: &Option<String>) -> DashResult<String> {
    let pretty = serde_json::to_string_pretty(js).context(ParsingJsonSnafu {})?;
    match output_path.as_deref() {
        None | Some("") | Some("stdout") => {
            println!("{}", pretty);
        }
        Some(p) => {
            info!("Writing dashboard to {:?}", p);
            fs::write(p, &pretty).context(WritingOutputSnafu { path: p })?;
        }
    }
    Ok(pretty)
}

fn check_reference(pretty_js: &str, reference_path: &str) -> DashResult<()> {
    let reference = read_reference(reference_path)?;
    let pretty_reference = serde_json::to_string_pretty(&reference).context(ParsingJsonSnafu {})?;
    if pretty_reference != pretty_js {
        warn!("Found differences with the reference {:?}", reference_path);
        print_diff(pretty_reference.as_str(), pretty_js, "\n");
        return ReferenceMismatchSnafu {
            path: reference_path,
        }
        .fail();
    }
    info!("The dashboard matches the reference {:?}", reference_path);
    Ok(())
}

/// Reads filter lines until the end of the input. Each line re-runs the pipeline
/// from the cached table. Bad lines are reported and skipped.
fn run_session(
    cache: &DatasetCache,
    settings: &RunSettings,
    input: impl BufRead,
    mut out: impl Write,
) -> DashResult<()> {
    for line_r in input.lines() {
        let line = line_r.context(ReadingInputSnafu {})?;
        if line.trim().is_empty() {
            continue;
        }
        debug!("run_session: line: {:?}", line);
        let res = parse_filters(&line).and_then(|filters| render(cache, &filters, settings));
        match res {
            Ok(js) => {
                writeln!(out, "{}", js).context(WritingOutputSnafu { path: "stdout" })?;
            }
            Err(e @ DashboardError::ParsingJson { .. })
            | Err(e @ DashboardError::Selection { .. }) => {
                warn!("run_session: skipping line {:?}: {}", line, e);
                eprintln!("Error: {}", e);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

pub fn run_dashboard_cli(args: &Args) -> DashResult<()> {
    let settings = RunSettings::from_args(args)?;
    info!("settings: {:?}", settings);
    let cache = DatasetCache::new(settings.input.clone());

    let js = render(&cache, &settings.filters, &settings)?;
    let pretty_js = write_output(&js, &settings.output_path)?;

    if let Some(reference_path) = &settings.reference_path {
        check_reference(&pretty_js, reference_path)?;
    }

    if settings.interactive {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        run_session(&cache, &settings, stdin.lock(), stdout.lock())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "event_id_cnty,event_date,year,time_precision,disorder_type,event_type,sub_event_type,actor1,country,location,latitude,longitude,notes,fatalities";

    fn write_csv(dir: &Path, name: &str, lines: &[&str]) -> String {
        let p = dir.join(name);
        fs::write(&p, lines.join("\n")).unwrap();
        p.display().to_string()
    }

    fn sample_csv(dir: &Path) -> String {
        write_csv(
            dir,
            "incidents.csv",
            &[
                HEADER,
                "ISR1,2020-03-01,2020,1,Demonstrations,Riots,Mob violence,Rioters (Israel),Israel,Jerusalem,31.77,35.21,Clashes,2",
                "PSE1,2021-07-11,2021,1,Demonstrations,Protests,Peaceful protest,Protesters (Palestine),Palestine,Hebron,31.53,35.09,,0",
                "LBN1,2021-08-02,2021,2,Political violence,Battles,Armed clash,Hezbollah,Lebanon,Naqoura,33.11,35.14,,4",
            ],
        )
    }

    fn settings_for(path: &str) -> RunSettings {
        let args = Args {
            input: Some(path.to_string()),
            ..Args::default()
        };
        RunSettings::from_args(&args).unwrap()
    }

    #[test]
    fn provider_from_extension() {
        assert_eq!(Provider::resolve(None, "a/Israel-Palestine.xlsx").unwrap(), Provider::Xlsx);
        assert_eq!(Provider::resolve(None, "data.CSV").unwrap(), Provider::Csv);
        assert_eq!(Provider::resolve(Some("csv"), "data.txt").unwrap(), Provider::Csv);
        assert!(matches!(
            Provider::resolve(None, "data.parquet"),
            Err(DashboardError::UnknownProvider { .. })
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Israel-Palestine.xlsx").display().to_string();
        let cache = DatasetCache::new(InputSource {
            path: path.clone(),
            provider: Provider::Xlsx,
            excel_worksheet_name: None,
        });
        let err = cache.get().unwrap_err();
        assert!(matches!(err, DashboardError::FileNotFound { .. }));
        assert_eq!(
            err.to_string(),
            format!("The file '{}' was not found. Please check the file path.", path)
        );
    }

    #[cfg(not(feature = "excel"))]
    #[test]
    fn xlsx_without_reader() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "data.xlsx", &["not a workbook"]);
        let err = load_dataset(&InputSource {
            path,
            provider: Provider::Xlsx,
            excel_worksheet_name: None,
        })
        .unwrap_err();
        assert!(matches!(err, DashboardError::MissingReader { .. }));
    }

    #[test]
    fn cache_reads_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample_csv(dir.path());
        let cache = DatasetCache::new(InputSource {
            path: path.clone(),
            provider: Provider::Csv,
            excel_worksheet_name: None,
        });
        let first: *const Dataset = cache.get().unwrap();
        fs::remove_file(&path).unwrap();
        let second: *const Dataset = cache.get().unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.get().unwrap().len(), 3);
    }

    #[test]
    fn render_default_dashboard() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample_csv(dir.path());
        let settings = settings_for(&path);
        let cache = DatasetCache::new(settings.input.clone());
        let js = render(&cache, &settings.filters, &settings).unwrap();
        assert_eq!(js["summary"]["totalEvents"], 2);
        assert_eq!(js["summary"]["totalFatalities"], 2);
        assert_eq!(js["summary"]["totalCivilianFatalities"], JSValue::Null);
        assert_eq!(js["summary"]["mostFrequentEventType"], "Protests");
        assert_eq!(js["config"]["country"], "Both");
        assert!(js.get("rows").is_none());
    }

    #[test]
    fn flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        sample_csv(dir.path());
        let config_path = dir.path().join("config.json");
        fs::write(
            &config_path,
            r#"{
                "inputSettings": {"filePath": "incidents.csv"},
                "filters": {"country": "Israel", "fromYear": 2019},
                "outputSettings": {"includeRows": true, "topLocations": 5}
            }"#,
        )
        .unwrap();
        let args = Args {
            config: Some(config_path.display().to_string()),
            country: Some("Palestine".to_string()),
            ..Args::default()
        };
        let settings = RunSettings::from_args(&args).unwrap();
        assert_eq!(settings.input.provider, Provider::Csv);
        assert!(settings.input.path.ends_with("incidents.csv"));
        assert!(Path::new(&settings.input.path).is_file());
        assert_eq!(settings.filters.country, Some("Palestine".to_string()));
        assert_eq!(settings.filters.from_year, Some(2019));
        assert!(settings.include_rows);
        assert_eq!(settings.top_locations, 5);
        assert_eq!(settings.output_path, None);
    }

    #[test]
    fn session_reruns_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample_csv(dir.path());
        let settings = settings_for(&path);
        let cache = DatasetCache::new(settings.input.clone());
        cache.get().unwrap();
        fs::remove_file(&path).unwrap();

        let input = Cursor::new(
            "{\"country\": \"Israel\"}\n\nnot json\n{\"fromYear\": 2022, \"toYear\": 2020}\n{\"eventTypes\": [\"Sieges\"]}\n",
        );
        let mut out: Vec<u8> = Vec::new();
        run_session(&cache, &settings, input, &mut out).unwrap();
        let lines: Vec<JSValue> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["summary"]["totalEvents"], 1);
        assert_eq!(lines[0]["summary"]["mostFrequentEventType"], "Riots");
        assert_eq!(lines[1]["summary"]["totalEvents"], 0);
        assert_eq!(lines[1]["summary"]["averageEventsPerYear"], 0.0);
        assert_eq!(lines[1]["summary"]["mostFrequentEventType"], JSValue::Null);
    }

    #[test]
    fn reference_mismatch_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample_csv(dir.path());
        let settings = settings_for(&path);
        let cache = DatasetCache::new(settings.input.clone());
        let js = render(&cache, &settings.filters, &settings).unwrap();
        let pretty = serde_json::to_string_pretty(&js).unwrap();

        let same = dir.path().join("same.json");
        fs::write(&same, &pretty).unwrap();
        check_reference(&pretty, &same.display().to_string()).unwrap();

        let other = dir.path().join("other.json");
        fs::write(&other, "{\"summary\": {}}").unwrap();
        assert!(matches!(
            check_reference(&pretty, &other.display().to_string()),
            Err(DashboardError::ReferenceMismatch { .. })
        ));
    }
}
