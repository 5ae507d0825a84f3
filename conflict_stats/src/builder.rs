use log::{debug, warn};
use std::collections::BTreeSet;

pub use crate::config::*;
use crate::filter::{Predicate, View};

/// A selection together with the choices that were offered for it.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ResolvedSelection {
    pub selection: Selection,
    pub options: FilterOptions,
}

/// A builder for the filter selection.
///
/// Filters that are left unset take the dashboard defaults. The defaults
/// depend on the upstream filters: the year bounds come from the rows of the
/// selected country, and the disorder and event types from the rows of the
/// selected country and years.
///
/// ```
/// use conflict_stats::builder::SelectionBuilder;
/// use conflict_stats::{CountrySelection, Dataset};
/// # use conflict_stats::FilterError;
///
/// let dataset = Dataset::default();
/// let selection = SelectionBuilder::new()
///     .country(CountrySelection::Israel)
///     .from_year(2020)
///     .build(&dataset)?;
/// assert_eq!(selection.years.map(|yr| yr.lo()), Some(2020));
///
/// # Ok::<(), FilterError>(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct SelectionBuilder {
    pub(crate) _country: Option<CountrySelection>,
    pub(crate) _from_year: Option<i32>,
    pub(crate) _to_year: Option<i32>,
    pub(crate) _disorder_types: Option<Vec<String>>,
    pub(crate) _event_types: Option<Vec<String>>,
}

impl SelectionBuilder {
    pub fn new() -> SelectionBuilder {
        SelectionBuilder::default()
    }

    pub fn country(self, country: CountrySelection) -> SelectionBuilder {
        SelectionBuilder {
            _country: Some(country),
            ..self
        }
    }

    pub fn from_year(self, year: i32) -> SelectionBuilder {
        SelectionBuilder {
            _from_year: Some(year),
            ..self
        }
    }

    pub fn to_year(self, year: i32) -> SelectionBuilder {
        SelectionBuilder {
            _to_year: Some(year),
            ..self
        }
    }

    pub fn disorder_types(self, types: &[String]) -> SelectionBuilder {
        SelectionBuilder {
            _disorder_types: Some(types.to_vec()),
            ..self
        }
    }

    pub fn event_types(self, types: &[String]) -> SelectionBuilder {
        SelectionBuilder {
            _event_types: Some(types.to_vec()),
            ..self
        }
    }

    pub fn build(&self, dataset: &Dataset) -> Result<Selection, FilterError> {
        self.resolve(dataset).map(|r| r.selection)
    }

    /// Fills in the defaults against the given dataset.
    pub fn resolve(&self, dataset: &Dataset) -> Result<ResolvedSelection, FilterError> {
        let country = self._country.unwrap_or_default();
        let by_country = View::all(dataset).filter(&Predicate::Country(country));

        let observed_years = by_country.years();
        let years = resolve_years(&observed_years, self._from_year, self._to_year)?;
        debug!(
            "resolve: country: {} observed years: {:?} selected: {:?}",
            country, observed_years, years
        );

        let by_years = match years {
            Some(yr) => by_country.filter(&Predicate::Years(yr)),
            None => by_country,
        };
        let disorder_options = by_years.disorder_types();
        let event_options = by_years.event_types();

        let disorder_types = resolve_types("disorder", &self._disorder_types, &disorder_options);
        let event_types = resolve_types("event", &self._event_types, &event_options);

        Ok(ResolvedSelection {
            selection: Selection {
                country,
                years,
                disorder_types,
                event_types,
            },
            options: FilterOptions {
                years: observed_years,
                disorder_types: disorder_options,
                event_types: event_options,
            },
        })
    }
}

// A missing bound falls back to the observed extreme, then to the other bound.
fn resolve_years(
    observed: &[i32],
    from_year: Option<i32>,
    to_year: Option<i32>,
) -> Result<Option<YearRange>, FilterError> {
    let lo = from_year.or_else(|| observed.first().cloned()).or(to_year);
    let hi = to_year.or_else(|| observed.last().cloned()).or(from_year);
    match (lo, hi) {
        (Some(lo), Some(hi)) => YearRange::new(lo, hi).map(Some),
        _ => Ok(None),
    }
}

fn resolve_types(kind: &str, chosen: &Option<Vec<String>>, options: &[String]) -> BTreeSet<String> {
    match chosen {
        Some(types) => {
            for t in types.iter().filter(|t| !options.contains(t)) {
                warn!("resolve: {} type {:?} is not present in the data", kind, t);
            }
            types.iter().cloned().collect()
        }
        None => options.iter().cloned().collect(),
    }
}
