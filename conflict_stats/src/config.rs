// ********* Input data structures ***********

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;

pub const ISRAEL: &str = "Israel";
pub const PALESTINE: &str = "Palestine";

/// How precisely the date of an event is known.
///
/// ACLED encodes this as an integer code in the `time_precision` column.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum TimePrecision {
    /// 1: the event happened on the recorded day.
    Exact,
    /// 2: the event happened within a few days of the recorded date.
    Approximate,
    /// 3: the event is aggregated to a longer period (week, month).
    AggregatedPeriod,
}

impl TimePrecision {
    pub fn from_code(code: i64) -> Option<TimePrecision> {
        match code {
            1 => Some(TimePrecision::Exact),
            2 => Some(TimePrecision::Approximate),
            3 => Some(TimePrecision::AggregatedPeriod),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            TimePrecision::Exact => 1,
            TimePrecision::Approximate => 2,
            TimePrecision::AggregatedPeriod => 3,
        }
    }
}

/// One reported conflict event (one row of the source spreadsheet).
///
/// Text columns that are frequently blank in the source are optional.
#[derive(PartialEq, Debug, Clone)]
pub struct Incident {
    pub event_id_cnty: String,
    pub event_date: NaiveDate,
    pub year: i32,
    pub time_precision: Option<TimePrecision>,
    pub disorder_type: String,
    pub event_type: String,
    pub sub_event_type: String,
    pub actor1: String,
    pub assoc_actor_1: Option<String>,
    pub inter1: Option<String>,
    pub actor2: Option<String>,
    pub assoc_actor_2: Option<String>,
    pub inter2: Option<String>,
    pub interaction: Option<String>,
    pub civilian_targeting: Option<String>,
    pub iso: Option<String>,
    pub region: String,
    pub country: String,
    pub admin1: Option<String>,
    pub admin2: Option<String>,
    pub admin3: Option<String>,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub geo_precision: Option<String>,
    pub source: Option<String>,
    pub source_scale: Option<String>,
    pub notes: Option<String>,
    /// Zero when the source has no fatalities column, see [Schema].
    pub fatalities: u64,
    pub civilian_fatalities: Option<u64>,
}

impl Incident {
    /// A record with only its key and date filled in. The year is derived from the date.
    pub fn new(event_id_cnty: &str, event_date: NaiveDate) -> Incident {
        Incident {
            event_id_cnty: event_id_cnty.to_string(),
            event_date,
            year: event_date.year(),
            time_precision: None,
            disorder_type: String::new(),
            event_type: String::new(),
            sub_event_type: String::new(),
            actor1: String::new(),
            assoc_actor_1: None,
            inter1: None,
            actor2: None,
            assoc_actor_2: None,
            inter2: None,
            interaction: None,
            civilian_targeting: None,
            iso: None,
            region: String::new(),
            country: String::new(),
            admin1: None,
            admin2: None,
            admin3: None,
            location: String::new(),
            latitude: None,
            longitude: None,
            geo_precision: None,
            source: None,
            source_scale: None,
            notes: None,
            fatalities: 0,
            civilian_fatalities: None,
        }
    }

    /// The coordinates of the event, if both are present and within the valid ranges.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon))
                if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) =>
            {
                Some((lat, lon))
            }
            _ => None,
        }
    }
}

/// The optional columns that were found in the source file.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct Schema {
    pub fatalities: bool,
    pub civilian_fatalities: bool,
}

/// The full loaded table. It is never modified after loading.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Dataset {
    pub incidents: Vec<Incident>,
    pub schema: Schema,
}

impl Dataset {
    pub fn new(incidents: Vec<Incident>, schema: Schema) -> Dataset {
        Dataset { incidents, schema }
    }

    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }
}

// ********* Selection **********

/// The country selector of the dashboard.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum CountrySelection {
    Israel,
    Palestine,
    /// Israel and Palestine together.
    Both,
}

impl CountrySelection {
    pub const ALL: [CountrySelection; 3] = [
        CountrySelection::Palestine,
        CountrySelection::Israel,
        CountrySelection::Both,
    ];

    pub fn matches(&self, country: &str) -> bool {
        match self {
            CountrySelection::Israel => country == ISRAEL,
            CountrySelection::Palestine => country == PALESTINE,
            CountrySelection::Both => country == ISRAEL || country == PALESTINE,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CountrySelection::Israel => ISRAEL,
            CountrySelection::Palestine => PALESTINE,
            CountrySelection::Both => "Both",
        }
    }
}

impl Default for CountrySelection {
    fn default() -> Self {
        CountrySelection::Both
    }
}

impl Display for CountrySelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for CountrySelection {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "israel" => Ok(CountrySelection::Israel),
            "palestine" => Ok(CountrySelection::Palestine),
            "both" | "israel and palestine" => Ok(CountrySelection::Both),
            _ => Err(FilterError::UnknownCountry(s.to_string())),
        }
    }
}

/// Inclusive bounds on the year of an incident.
///
/// Invariant: lo <= hi.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct YearRange {
    lo: i32,
    hi: i32,
}

impl YearRange {
    pub fn new(lo: i32, hi: i32) -> Result<YearRange, FilterError> {
        if lo > hi {
            return Err(FilterError::InvalidYearRange { lo, hi });
        }
        Ok(YearRange { lo, hi })
    }

    pub fn lo(&self) -> i32 {
        self.lo
    }

    pub fn hi(&self) -> i32 {
        self.hi
    }

    pub fn contains(&self, year: i32) -> bool {
        self.lo <= year && year <= self.hi
    }

    /// Number of years covered, always at least 1.
    pub fn span(&self) -> u64 {
        u64::from(self.hi.abs_diff(self.lo)) + 1
    }
}

/// A complete set of filter values. All the predicates are applied together.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Selection {
    pub country: CountrySelection,
    /// None when no year could be observed: no bound is applied.
    pub years: Option<YearRange>,
    pub disorder_types: BTreeSet<String>,
    pub event_types: BTreeSet<String>,
}

/// The values offered by each filter control, given the upstream choices.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct FilterOptions {
    pub years: Vec<i32>,
    pub disorder_types: Vec<String>,
    pub event_types: Vec<String>,
}

// ******** Output data structures *********

#[derive(PartialEq, Debug, Clone)]
pub struct Summary {
    pub total_events: u64,
    pub unique_event_types: u64,
    pub unique_disorder_types: u64,
    pub average_events_per_year: f64,
    /// None if the source has no fatalities column.
    pub total_fatalities: Option<u64>,
    /// None if the source has no civilian_fatalities column.
    pub total_civilian_fatalities: Option<u64>,
    pub most_frequent_event_type: Option<String>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct CountEntry {
    pub name: String,
    pub count: u64,
    /// Fraction of the rows of the view, 0 on an empty view.
    pub share: f64,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct YearCount {
    pub year: i32,
    pub count: u64,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FatalityEntry {
    pub event_type: String,
    pub fatalities: u64,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SubEventCount {
    pub event_type: String,
    pub sub_event_type: String,
    pub count: u64,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct LocationStats {
    pub location: String,
    pub country: String,
    pub fatalities: u64,
    pub events: u64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct MapPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub location: String,
    pub event_type: String,
    pub notes: Option<String>,
    pub fatalities: u64,
}

/// The data behind every chart of the dashboard.
#[derive(PartialEq, Debug, Clone)]
pub struct Charts {
    pub incidents_per_year: Vec<YearCount>,
    pub event_types: Vec<CountEntry>,
    pub disorder_types: Vec<CountEntry>,
    pub fatalities_by_event_type: Option<Vec<FatalityEntry>>,
    pub civilian_fatalities_by_event_type: Option<Vec<FatalityEntry>>,
    pub sub_event_types: Vec<SubEventCount>,
    pub locations: Vec<LocationStats>,
    pub map: Vec<MapPoint>,
}

/// Errors in the user selection. Filtering itself never fails.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum FilterError {
    UnknownCountry(String),
    InvalidYearRange { lo: i32, hi: i32 },
}

impl Error for FilterError {}

impl Display for FilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterError::UnknownCountry(s) => write!(
                f,
                "Unknown country {:?}: expected one of Israel, Palestine, Both",
                s
            ),
            FilterError::InvalidYearRange { lo, hi } => {
                write!(f, "Invalid year range: {} is after {}", lo, hi)
            }
        }
    }
}
