use log::debug;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::config::*;
use crate::filter::View;

/// A categorical column of the incident table.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Category {
    EventType,
    DisorderType,
    SubEventType,
    Country,
}

impl Category {
    pub fn of<'i>(&self, incident: &'i Incident) -> &'i str {
        match self {
            Category::EventType => &incident.event_type,
            Category::DisorderType => &incident.disorder_type,
            Category::SubEventType => &incident.sub_event_type,
            Category::Country => &incident.country,
        }
    }
}

/// The summary cards of the dashboard.
///
/// `years` is the selected year range. When it is unbounded, the years
/// observed in the view are used to compute the average.
pub fn summarize(view: &View, years: Option<YearRange>) -> Summary {
    let schema = view.schema();
    let total_events = view.len() as u64;

    let average_events_per_year = if total_events == 0 {
        0.0
    } else {
        let span = match years {
            Some(yr) => yr.span(),
            None => observed_span(view),
        };
        total_events as f64 / span as f64
    };

    let total_fatalities: Option<u64> = if schema.fatalities {
        Some(view.incidents().map(|i| i.fatalities).sum())
    } else {
        None
    };
    let total_civilian_fatalities: Option<u64> = if schema.civilian_fatalities {
        Some(
            view.incidents()
                .map(|i| i.civilian_fatalities.unwrap_or(0))
                .sum(),
        )
    } else {
        None
    };

    let res = Summary {
        total_events,
        unique_event_types: distinct_count(view, Category::EventType),
        unique_disorder_types: distinct_count(view, Category::DisorderType),
        average_events_per_year,
        total_fatalities,
        total_civilian_fatalities,
        most_frequent_event_type: most_frequent(view, Category::EventType),
    };
    debug!("summarize: {:?}", res);
    res
}

fn observed_span(view: &View) -> u64 {
    let years = view.years();
    match (years.first(), years.last()) {
        (Some(lo), Some(hi)) => u64::from(hi.abs_diff(*lo)) + 1,
        _ => 1,
    }
}

pub fn distinct_count(view: &View, category: Category) -> u64 {
    let values: BTreeSet<&str> = view.incidents().map(|i| category.of(i)).collect();
    values.len() as u64
}

/// The most common value of a column. Ties go to the smallest value.
pub fn most_frequent(view: &View, category: Category) -> Option<String> {
    // value_counts is sorted by decreasing count, then by name.
    value_counts(view, category).first().map(|e| e.name.clone())
}

/// Number of rows for each value of a column, by decreasing count.
/// Values with the same count are sorted by name.
pub fn value_counts(view: &View, category: Category) -> Vec<CountEntry> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for i in view.incidents() {
        *counts.entry(category.of(i)).or_insert(0) += 1;
    }
    let total = view.len();
    let mut res: Vec<CountEntry> = counts
        .into_iter()
        .map(|(name, count)| CountEntry {
            name: name.to_string(),
            count,
            share: if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            },
        })
        .collect();
    // Stable sort: the names stay in order for equal counts.
    res.sort_by(|a, b| b.count.cmp(&a.count));
    res
}

/// Number of incidents for each year present in the view, by increasing year.
pub fn incidents_per_year(view: &View) -> Vec<YearCount> {
    let mut counts: BTreeMap<i32, u64> = BTreeMap::new();
    for i in view.incidents() {
        *counts.entry(i.year).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect()
}

/// Total fatalities for each event type, sorted by event type.
/// None if the source has no fatalities column.
pub fn fatalities_by_event_type(view: &View) -> Option<Vec<FatalityEntry>> {
    if !view.schema().fatalities {
        return None;
    }
    Some(sum_by_event_type(view, |i| i.fatalities))
}

/// Total civilian fatalities for each event type, sorted by event type.
/// None if the source has no civilian_fatalities column.
pub fn civilian_fatalities_by_event_type(view: &View) -> Option<Vec<FatalityEntry>> {
    if !view.schema().civilian_fatalities {
        return None;
    }
    Some(sum_by_event_type(view, |i| i.civilian_fatalities.unwrap_or(0)))
}

fn sum_by_event_type(view: &View, f: impl Fn(&Incident) -> u64) -> Vec<FatalityEntry> {
    let mut sums: BTreeMap<&str, u64> = BTreeMap::new();
    for i in view.incidents() {
        *sums.entry(i.event_type.as_str()).or_insert(0) += f(i);
    }
    sums.into_iter()
        .map(|(event_type, fatalities)| FatalityEntry {
            event_type: event_type.to_string(),
            fatalities,
        })
        .collect()
}

/// Number of incidents for each (event type, sub-event type) pair.
pub fn sub_event_types(view: &View) -> Vec<SubEventCount> {
    let mut counts: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    for i in view.incidents() {
        let key = (Category::EventType.of(i), Category::SubEventType.of(i));
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|((event_type, sub_event_type), count)| SubEventCount {
            event_type: event_type.to_string(),
            sub_event_type: sub_event_type.to_string(),
            count,
        })
        .collect()
}

/// Fatalities and number of events for each (location, country) pair.
///
/// Sorted by decreasing fatalities, then decreasing number of events, then
/// location and country.
pub fn locations(view: &View) -> Vec<LocationStats> {
    let mut stats: HashMap<(&str, &str), (u64, u64)> = HashMap::new();
    for i in view.incidents() {
        let e = stats
            .entry((i.location.as_str(), i.country.as_str()))
            .or_insert((0, 0));
        e.0 += i.fatalities;
        e.1 += 1;
    }
    let mut res: Vec<LocationStats> = stats
        .into_iter()
        .map(|((location, country), (fatalities, events))| LocationStats {
            location: location.to_string(),
            country: country.to_string(),
            fatalities,
            events,
        })
        .collect();
    res.sort_by(|a, b| {
        b.fatalities
            .cmp(&a.fatalities)
            .then(b.events.cmp(&a.events))
            .then_with(|| a.location.cmp(&b.location))
            .then_with(|| a.country.cmp(&b.country))
    });
    res
}

/// One point per incident with valid coordinates, in table order.
pub fn map_points(view: &View) -> Vec<MapPoint> {
    view.incidents()
        .filter_map(|i| {
            i.coordinates().map(|(latitude, longitude)| MapPoint {
                latitude,
                longitude,
                location: i.location.clone(),
                event_type: i.event_type.clone(),
                notes: i.notes.clone(),
                fatalities: i.fatalities,
            })
        })
        .collect()
}

pub fn charts(view: &View) -> Charts {
    Charts {
        incidents_per_year: incidents_per_year(view),
        event_types: value_counts(view, Category::EventType),
        disorder_types: value_counts(view, Category::DisorderType),
        fatalities_by_event_type: fatalities_by_event_type(view),
        civilian_fatalities_by_event_type: civilian_fatalities_by_event_type(view),
        sub_event_types: sub_event_types(view),
        locations: locations(view),
        map: map_points(view),
    }
}
