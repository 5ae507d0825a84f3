use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};

use crate::dashboard::*;

/// A cell as read by one of the readers, before interpretation.
#[derive(PartialEq, Debug, Clone)]
pub enum RawCell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    /// Excel serial date (days since 1899-12-30).
    ExcelDate(f64),
}

impl RawCell {
    pub fn describe(&self) -> String {
        match self {
            RawCell::Empty => "".to_string(),
            RawCell::Text(s) => s.clone(),
            RawCell::Int(i) => i.to_string(),
            RawCell::Float(f) => f.to_string(),
            RawCell::ExcelDate(f) => format!("excel date {}", f),
        }
    }

    fn text(&self) -> Option<String> {
        match self {
            RawCell::Empty => None,
            RawCell::Text(s) if s.trim().is_empty() => None,
            RawCell::Text(s) => Some(s.trim().to_string()),
            RawCell::Int(i) => Some(i.to_string()),
            RawCell::Float(f) if f.fract() == 0.0 => Some(format!("{}", *f as i64)),
            RawCell::Float(f) => Some(f.to_string()),
            RawCell::ExcelDate(_) => excel_serial_to_date(self).map(|d| d.to_string()),
        }
    }

    /// None for blank cells, Some(None) when the content is not an integer.
    fn int(&self) -> Option<Option<i64>> {
        match self {
            RawCell::Int(i) => Some(Some(*i)),
            RawCell::Float(f) if f.fract() == 0.0 => Some(Some(*f as i64)),
            RawCell::Float(_) | RawCell::ExcelDate(_) => Some(None),
            _ => self.text().map(|s| {
                s.parse::<i64>()
                    .ok()
                    .or_else(|| {
                        s.parse::<f64>()
                            .ok()
                            .filter(|f| f.fract() == 0.0)
                            .map(|f| f as i64)
                    })
            }),
        }
    }

    fn float(&self) -> Option<Option<f64>> {
        match self {
            RawCell::Int(i) => Some(Some(*i as f64)),
            RawCell::Float(f) => Some(Some(*f)),
            RawCell::ExcelDate(_) => Some(None),
            _ => self.text().map(|s| s.parse::<f64>().ok()),
        }
    }

    fn date(&self) -> Option<Option<NaiveDate>> {
        match self {
            RawCell::ExcelDate(_) | RawCell::Float(_) | RawCell::Int(_) => {
                Some(excel_serial_to_date(self))
            }
            _ => self.text().map(|s| parse_date(&s)),
        }
    }
}

fn excel_serial_to_date(cell: &RawCell) -> Option<NaiveDate> {
    let serial = match cell {
        RawCell::ExcelDate(f) | RawCell::Float(f) => *f,
        RawCell::Int(i) => *i as f64,
        _ => return None,
    };
    if !(1.0..2_958_466.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

static EMPTY_CELL: RawCell = RawCell::Empty;

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d %B %Y", "%d-%B-%Y", "%m/%d/%Y"];

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    // Some exports carry a time part: keep the date only.
    let s = s
        .split(['T', ' '])
        .next()
        .filter(|d| d.contains('-') || d.contains('/'))
        .unwrap_or(s);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s.trim(), fmt).ok())
}

/// All the columns known to the reader.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Column {
    EventIdCnty,
    EventDate,
    Year,
    TimePrecision,
    DisorderType,
    EventType,
    SubEventType,
    Actor1,
    AssocActor1,
    Inter1,
    Actor2,
    AssocActor2,
    Inter2,
    Interaction,
    CivilianTargeting,
    Iso,
    Region,
    Country,
    Admin1,
    Admin2,
    Admin3,
    Location,
    Latitude,
    Longitude,
    GeoPrecision,
    Source,
    SourceScale,
    Notes,
    Fatalities,
    CivilianFatalities,
}

impl Column {
    pub const ALL: [Column; 30] = [
        Column::EventIdCnty,
        Column::EventDate,
        Column::Year,
        Column::TimePrecision,
        Column::DisorderType,
        Column::EventType,
        Column::SubEventType,
        Column::Actor1,
        Column::AssocActor1,
        Column::Inter1,
        Column::Actor2,
        Column::AssocActor2,
        Column::Inter2,
        Column::Interaction,
        Column::CivilianTargeting,
        Column::Iso,
        Column::Region,
        Column::Country,
        Column::Admin1,
        Column::Admin2,
        Column::Admin3,
        Column::Location,
        Column::Latitude,
        Column::Longitude,
        Column::GeoPrecision,
        Column::Source,
        Column::SourceScale,
        Column::Notes,
        Column::Fatalities,
        Column::CivilianFatalities,
    ];

    pub const REQUIRED: [Column; 5] = [
        Column::EventIdCnty,
        Column::EventDate,
        Column::Country,
        Column::DisorderType,
        Column::EventType,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Column::EventIdCnty => "event_id_cnty",
            Column::EventDate => "event_date",
            Column::Year => "year",
            Column::TimePrecision => "time_precision",
            Column::DisorderType => "disorder_type",
            Column::EventType => "event_type",
            Column::SubEventType => "sub_event_type",
            Column::Actor1 => "actor1",
            Column::AssocActor1 => "assoc_actor_1",
            Column::Inter1 => "inter1",
            Column::Actor2 => "actor2",
            Column::AssocActor2 => "assoc_actor_2",
            Column::Inter2 => "inter2",
            Column::Interaction => "interaction",
            Column::CivilianTargeting => "civilian_targeting",
            Column::Iso => "iso",
            Column::Region => "region",
            Column::Country => "country",
            Column::Admin1 => "admin1",
            Column::Admin2 => "admin2",
            Column::Admin3 => "admin3",
            Column::Location => "location",
            Column::Latitude => "latitude",
            Column::Longitude => "longitude",
            Column::GeoPrecision => "geo_precision",
            Column::Source => "source",
            Column::SourceScale => "source_scale",
            Column::Notes => "notes",
            Column::Fatalities => "fatalities",
            Column::CivilianFatalities => "civilian_fatalities",
        }
    }
}

/// Given the header of a file (names of each of the columns), finds the
/// position of each known column.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ColumnIndex {
    positions: HashMap<Column, usize>,
}

impl ColumnIndex {
    pub fn from_header(header: &[Option<String>]) -> DashResult<ColumnIndex> {
        let col_names: HashMap<String, usize> = header
            .iter()
            .enumerate()
            .filter_map(|(idx, x)| x.as_ref().map(|s| (s.trim().to_lowercase(), idx)))
            .collect();
        debug!("from_header: col_names: {:?}", col_names);

        let positions: HashMap<Column, usize> = Column::ALL
            .iter()
            .filter_map(|c| col_names.get(c.name()).map(|idx| (*c, *idx)))
            .collect();
        for c in Column::REQUIRED.iter() {
            ensure!(
                positions.contains_key(c),
                MissingColumnSnafu { column: c.name() }
            );
        }
        Ok(ColumnIndex { positions })
    }

    pub fn has(&self, column: Column) -> bool {
        self.positions.contains_key(&column)
    }

    pub fn schema(&self) -> Schema {
        Schema {
            fatalities: self.has(Column::Fatalities),
            civilian_fatalities: self.has(Column::CivilianFatalities),
        }
    }

    fn cell<'r>(&self, row: &'r [RawCell], column: Column) -> &'r RawCell {
        self.positions
            .get(&column)
            .and_then(|idx| row.get(*idx))
            .unwrap_or(&EMPTY_CELL)
    }
}

/// Interprets one data row. `lineno` is the line in the file, starting at 1 with the header.
pub fn build_incident(index: &ColumnIndex, row: &[RawCell], lineno: usize) -> DashResult<Incident> {
    let text = |c: Column| index.cell(row, c).text();
    let required_text = |c: Column| -> DashResult<String> {
        text(c).context(InvalidCellSnafu {
            lineno,
            column: c.name(),
            content: index.cell(row, c).describe(),
        })
    };
    let invalid = |c: Column| InvalidCellSnafu {
        lineno,
        column: c.name(),
        content: index.cell(row, c).describe(),
    };
    let optional_int = |c: Column| -> DashResult<Option<i64>> {
        match index.cell(row, c).int() {
            None => Ok(None),
            Some(Some(i)) => Ok(Some(i)),
            Some(None) => invalid(c).fail(),
        }
    };
    let optional_count = |c: Column| -> DashResult<Option<u64>> {
        match optional_int(c)? {
            Some(i) if i < 0 => invalid(c).fail(),
            x => Ok(x.map(|i| i as u64)),
        }
    };
    let optional_float = |c: Column| -> DashResult<Option<f64>> {
        match index.cell(row, c).float() {
            None => Ok(None),
            Some(Some(f)) => Ok(Some(f)),
            Some(None) => invalid(c).fail(),
        }
    };

    let event_date = match index.cell(row, Column::EventDate).date() {
        Some(Some(d)) => d,
        _ => return invalid(Column::EventDate).fail(),
    };
    let year = match optional_int(Column::Year)? {
        Some(y) => {
            let y = i32::try_from(y).ok().context(invalid(Column::Year))?;
            if y != event_date.year() {
                warn!(
                    "build_incident: line {}: year {} does not match event_date {}",
                    lineno, y, event_date
                );
            }
            y
        }
        None => event_date.year(),
    };
    let time_precision = match optional_int(Column::TimePrecision)? {
        Some(code) => Some(
            TimePrecision::from_code(code).context(invalid(Column::TimePrecision))?,
        ),
        None => None,
    };

    let incident = Incident {
        event_id_cnty: required_text(Column::EventIdCnty)?,
        event_date,
        year,
        time_precision,
        disorder_type: required_text(Column::DisorderType)?,
        event_type: required_text(Column::EventType)?,
        sub_event_type: text(Column::SubEventType).unwrap_or_default(),
        actor1: text(Column::Actor1).unwrap_or_default(),
        assoc_actor_1: text(Column::AssocActor1),
        inter1: text(Column::Inter1),
        actor2: text(Column::Actor2),
        assoc_actor_2: text(Column::AssocActor2),
        inter2: text(Column::Inter2),
        interaction: text(Column::Interaction),
        civilian_targeting: text(Column::CivilianTargeting),
        iso: text(Column::Iso),
        region: text(Column::Region).unwrap_or_default(),
        country: required_text(Column::Country)?,
        admin1: text(Column::Admin1),
        admin2: text(Column::Admin2),
        admin3: text(Column::Admin3),
        location: text(Column::Location).unwrap_or_default(),
        latitude: optional_float(Column::Latitude)?,
        longitude: optional_float(Column::Longitude)?,
        geo_precision: text(Column::GeoPrecision),
        source: text(Column::Source),
        source_scale: text(Column::SourceScale),
        notes: text(Column::Notes),
        fatalities: optional_count(Column::Fatalities)?.unwrap_or(0),
        civilian_fatalities: if index.has(Column::CivilianFatalities) {
            Some(optional_count(Column::CivilianFatalities)?.unwrap_or(0))
        } else {
            None
        },
    };
    Ok(incident)
}
