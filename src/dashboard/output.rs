// Renders the results of the pipeline as a JSON document.

use serde_json::{json, Map as JSMap, Value as JSValue};

use conflict_stats::filter::View;

use crate::dashboard::*;

pub fn build_dashboard_js(
    input_path: &str,
    result: &DashboardResult,
    include_rows: bool,
    top_locations: usize,
) -> JSValue {
    let mut js = JSMap::new();
    js.insert("config".to_string(), config_js(input_path, result));
    js.insert("summary".to_string(), summary_js(&result.summary));
    js.insert("charts".to_string(), charts_js(&result.charts, top_locations));
    if include_rows {
        js.insert("rows".to_string(), rows_js(&result.view));
    }
    JSValue::Object(js)
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn config_js(input_path: &str, result: &DashboardResult) -> JSValue {
    let selection = &result.selection;
    let year_range = match &selection.years {
        Some(yr) => json!([yr.lo(), yr.hi()]),
        None => JSValue::Null,
    };
    json!({
        "input": input_path,
        "country": selection.country.label(),
        "yearRange": year_range,
        "disorderTypes": selection.disorder_types,
        "eventTypes": selection.event_types,
        "options": {
            "years": result.options.years,
            "disorderTypes": result.options.disorder_types,
            "eventTypes": result.options.event_types,
        }
    })
}

fn summary_js(summary: &Summary) -> JSValue {
    json!({
        "totalEvents": summary.total_events,
        "uniqueEventTypes": summary.unique_event_types,
        "uniqueDisorderTypes": summary.unique_disorder_types,
        "averageEventsPerYear": round2(summary.average_events_per_year),
        "totalFatalities": summary.total_fatalities,
        "totalCivilianFatalities": summary.total_civilian_fatalities,
        "mostFrequentEventType": summary.most_frequent_event_type,
    })
}

fn counts_js(entries: &[CountEntry]) -> Vec<JSValue> {
    entries
        .iter()
        .map(|e| json!({"name": e.name, "count": e.count, "share": e.share}))
        .collect()
}

fn fatalities_js(entries: &Option<Vec<FatalityEntry>>) -> JSValue {
    match entries {
        Some(l) => JSValue::Array(
            l.iter()
                .map(|e| json!({"eventType": e.event_type, "fatalities": e.fatalities}))
                .collect(),
        ),
        None => JSValue::Null,
    }
}

fn charts_js(charts: &Charts, top_locations: usize) -> JSValue {
    let incidents_per_year: Vec<JSValue> = charts
        .incidents_per_year
        .iter()
        .map(|yc| json!({"year": yc.year, "count": yc.count}))
        .collect();
    let sub_event_types: Vec<JSValue> = charts
        .sub_event_types
        .iter()
        .map(|s| {
            json!({
                "eventType": s.event_type,
                "subEventType": s.sub_event_type,
                "count": s.count
            })
        })
        .collect();
    // The locations are already ranked, only the top ones are displayed.
    let locations: Vec<JSValue> = charts
        .locations
        .iter()
        .take(top_locations)
        .map(|l| {
            json!({
                "location": l.location,
                "country": l.country,
                "fatalities": l.fatalities,
                "events": l.events
            })
        })
        .collect();
    let map: Vec<JSValue> = charts
        .map
        .iter()
        .map(|p| {
            json!({
                "latitude": p.latitude,
                "longitude": p.longitude,
                "location": p.location,
                "eventType": p.event_type,
                "notes": p.notes,
                "fatalities": p.fatalities
            })
        })
        .collect();
    json!({
        "incidentsPerYear": incidents_per_year,
        "eventTypes": counts_js(&charts.event_types),
        "disorderTypes": counts_js(&charts.disorder_types),
        "fatalitiesByEventType": fatalities_js(&charts.fatalities_by_event_type),
        "civilianFatalitiesByEventType": fatalities_js(&charts.civilian_fatalities_by_event_type),
        "subEventTypes": sub_event_types,
        "locations": locations,
        "map": map,
    })
}

fn row_js(incident: &Incident, schema: Schema) -> JSValue {
    let mut row = JSMap::new();
    let mut put = |k: &str, v: JSValue| {
        row.insert(k.to_string(), v);
    };
    put("event_id_cnty", json!(incident.event_id_cnty));
    put("event_date", json!(incident.event_date.format("%Y-%m-%d").to_string()));
    put("year", json!(incident.year));
    put("time_precision", json!(incident.time_precision.as_ref().map(|tp| tp.code())));
    put("disorder_type", json!(incident.disorder_type));
    put("event_type", json!(incident.event_type));
    put("sub_event_type", json!(incident.sub_event_type));
    put("actor1", json!(incident.actor1));
    put("assoc_actor_1", json!(incident.assoc_actor_1));
    put("inter1", json!(incident.inter1));
    put("actor2", json!(incident.actor2));
    put("assoc_actor_2", json!(incident.assoc_actor_2));
    put("inter2", json!(incident.inter2));
    put("interaction", json!(incident.interaction));
    put("civilian_targeting", json!(incident.civilian_targeting));
    put("iso", json!(incident.iso));
    put("region", json!(incident.region));
    put("country", json!(incident.country));
    put("admin1", json!(incident.admin1));
    put("admin2", json!(incident.admin2));
    put("admin3", json!(incident.admin3));
    put("location", json!(incident.location));
    put("latitude", json!(incident.latitude));
    put("longitude", json!(incident.longitude));
    put("geo_precision", json!(incident.geo_precision));
    put("source", json!(incident.source));
    put("source_scale", json!(incident.source_scale));
    put("notes", json!(incident.notes));
    if schema.fatalities {
        put("fatalities", json!(incident.fatalities));
    }
    if schema.civilian_fatalities {
        put("civilian_fatalities", json!(incident.civilian_fatalities));
    }
    JSValue::Object(row)
}

fn rows_js(view: &View) -> JSValue {
    let schema = view.schema();
    JSValue::Array(view.incidents().map(|i| row_js(i, schema)).collect())
}
