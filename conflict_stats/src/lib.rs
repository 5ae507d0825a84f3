/*!
Filtering and aggregation of ACLED armed-conflict incident records.

The crate takes a loaded [Dataset] and a partial user selection, fills in
the dashboard defaults, applies the filters and computes the summary
statistics and the data behind each chart.

```
use conflict_stats::builder::SelectionBuilder;
use conflict_stats::{run_dashboard, Dataset};
# use conflict_stats::FilterError;

let dataset = Dataset::default();
let res = run_dashboard(&dataset, &SelectionBuilder::new())?;
assert_eq!(res.summary.total_events, 0);
assert_eq!(res.summary.most_frequent_event_type, None);

# Ok::<(), FilterError>(())
```

See the [manual] for the expected columns of the input.
*/
mod config;
use log::info;

pub use crate::config::*;

pub mod builder;
pub mod filter;
pub mod manual;
pub mod stats;

use crate::builder::SelectionBuilder;
use crate::filter::View;

/// Everything displayed by the dashboard for one selection.
#[derive(PartialEq, Debug, Clone)]
pub struct DashboardResult<'a> {
    pub selection: Selection,
    pub options: FilterOptions,
    /// The filtered rows (the raw table).
    pub view: View<'a>,
    pub summary: Summary,
    pub charts: Charts,
}

/// Runs the full pipeline: defaults, filters, statistics and charts.
///
/// Arguments:
/// * `dataset` the loaded table. It is not modified.
/// * `builder` the choices of the user. Unset filters take their defaults.
pub fn run_dashboard<'a>(
    dataset: &'a Dataset,
    builder: &SelectionBuilder,
) -> Result<DashboardResult<'a>, FilterError> {
    info!(
        "run_dashboard: Processing {:?} incidents, schema: {:?}",
        dataset.len(),
        dataset.schema
    );
    let resolved = builder.resolve(dataset)?;
    let selection = resolved.selection;
    info!(
        "run_dashboard: country: {} years: {:?} disorder types: {:?} event types: {:?}",
        selection.country, selection.years, selection.disorder_types, selection.event_types
    );

    let view = filter::filter(dataset, &selection);
    info!("run_dashboard: {} incidents after filtering", view.len());

    let summary = stats::summarize(&view, selection.years);
    let charts = stats::charts(&view);
    Ok(DashboardResult {
        selection,
        options: resolved.options,
        view,
        summary,
        charts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn incident(id: &str, country: &str, year: i32, event: &str, fatalities: u64) -> Incident {
        Incident {
            country: country.to_string(),
            disorder_type: "Political violence".to_string(),
            event_type: event.to_string(),
            fatalities,
            ..Incident::new(id, NaiveDate::from_ymd_opt(year, 5, 4).unwrap())
        }
    }

    fn sample() -> Dataset {
        Dataset::new(
            vec![
                incident("ISR1", "Israel", 2020, "Riots", 2),
                incident("PSE1", "Palestine", 2021, "Protests", 0),
                incident("PSE2", "Palestine", 2021, "Protests", 5),
            ],
            Schema {
                fatalities: true,
                civilian_fatalities: false,
            },
        )
    }

    #[test]
    fn full_pipeline_with_defaults() {
        let _ = env_logger::builder().is_test(true).try_init();
        let ds = sample();
        let res = run_dashboard(&ds, &SelectionBuilder::new()).unwrap();
        assert_eq!(res.view.len(), 3);
        assert_eq!(res.summary.total_events, 3);
        assert_eq!(res.summary.total_fatalities, Some(7));
        assert_eq!(res.summary.average_events_per_year, 1.5);
        assert_eq!(
            res.summary.most_frequent_event_type,
            Some("Protests".to_string())
        );
        assert_eq!(res.options.years, vec![2020, 2021]);
        assert_eq!(res.charts.incidents_per_year.len(), 2);
    }

    #[test]
    fn repeated_runs_do_not_change_dataset() {
        let ds = sample();
        let before = ds.clone();
        let israel = SelectionBuilder::new().country(CountrySelection::Israel);
        let first = run_dashboard(&ds, &israel).unwrap();
        let _ = run_dashboard(&ds, &SelectionBuilder::new()).unwrap();
        let again = run_dashboard(&ds, &israel).unwrap();
        assert_eq!(first, again);
        assert_eq!(first.summary.total_events, 1);
        assert_eq!(ds, before);
    }

    #[test]
    fn invalid_selection_is_reported() {
        let ds = sample();
        let res = run_dashboard(
            &ds,
            &SelectionBuilder::new().from_year(2022).to_year(2020),
        );
        assert!(matches!(res, Err(FilterError::InvalidYearRange { .. })));
    }

    #[test]
    fn extreme_year_bounds() {
        let ds = sample();
        let builder = SelectionBuilder::new()
            .from_year(-2_000_000_000)
            .to_year(2_000_000_000);
        let res = run_dashboard(&ds, &builder).unwrap();
        assert_eq!(res.summary.total_events, 3);
        assert_eq!(
            res.summary.average_events_per_year,
            3.0 / 4_000_000_001.0
        );

        let all = YearRange::new(i32::MIN, i32::MAX).unwrap();
        assert_eq!(all.span(), 1 << 32);
        assert_eq!(YearRange::new(2020, 2020).unwrap().span(), 1);
    }
}
