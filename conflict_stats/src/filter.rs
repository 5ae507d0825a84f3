use log::debug;
use std::collections::BTreeSet;

use crate::config::*;

/// A single row test. Each predicate only looks at one row at a time, so
/// predicates can be applied in any order.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Predicate<'s> {
    Country(CountrySelection),
    Years(YearRange),
    DisorderTypes(&'s BTreeSet<String>),
    EventTypes(&'s BTreeSet<String>),
}

impl<'s> Predicate<'s> {
    pub fn matches(&self, incident: &Incident) -> bool {
        match self {
            Predicate::Country(c) => c.matches(&incident.country),
            Predicate::Years(yr) => yr.contains(incident.year),
            Predicate::DisorderTypes(types) => types.contains(&incident.disorder_type),
            Predicate::EventTypes(types) => types.contains(&incident.event_type),
        }
    }
}

impl Selection {
    /// The predicates of this selection. A missing year range adds no predicate.
    pub fn predicates(&self) -> Vec<Predicate<'_>> {
        let mut res = vec![Predicate::Country(self.country)];
        if let Some(yr) = self.years {
            res.push(Predicate::Years(yr));
        }
        res.push(Predicate::DisorderTypes(&self.disorder_types));
        res.push(Predicate::EventTypes(&self.event_types));
        res
    }
}

/// A filtered view over a dataset.
///
/// The view only holds the positions of the rows that passed the filters,
/// in the order of the dataset. Filtering a view returns a new view.
#[derive(PartialEq, Debug, Clone)]
pub struct View<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> View<'a> {
    /// The view with every row of the dataset.
    pub fn all(dataset: &'a Dataset) -> View<'a> {
        View {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    pub fn filter(&self, predicate: &Predicate) -> View<'a> {
        let dataset = self.dataset;
        let indices: Vec<usize> = self
            .indices
            .iter()
            .cloned()
            .filter(|idx| predicate.matches(&dataset.incidents[*idx]))
            .collect();
        debug!(
            "filter: {:?}: {} -> {} rows",
            predicate,
            self.indices.len(),
            indices.len()
        );
        View { dataset, indices }
    }

    /// Keeps the rows that pass all the predicates.
    pub fn filter_all(&self, predicates: &[Predicate]) -> View<'a> {
        let dataset = self.dataset;
        let indices: Vec<usize> = self
            .indices
            .iter()
            .cloned()
            .filter(|idx| {
                let incident = &dataset.incidents[*idx];
                predicates.iter().all(|p| p.matches(incident))
            })
            .collect();
        View { dataset, indices }
    }

    pub fn incidents(&self) -> impl Iterator<Item = &'a Incident> + '_ {
        let dataset = self.dataset;
        self.indices.iter().map(move |idx| &dataset.incidents[*idx])
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn schema(&self) -> Schema {
        self.dataset.schema
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The distinct years of the view, sorted.
    pub fn years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self.incidents().map(|i| i.year).collect();
        years.into_iter().collect()
    }

    /// The distinct disorder types, in order of first appearance.
    pub fn disorder_types(&self) -> Vec<String> {
        unique_in_order(self.incidents().map(|i| i.disorder_type.as_str()))
    }

    /// The distinct event types, in order of first appearance.
    pub fn event_types(&self) -> Vec<String> {
        unique_in_order(self.incidents().map(|i| i.event_type.as_str()))
    }
}

fn unique_in_order<'i>(values: impl Iterator<Item = &'i str>) -> Vec<String> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut res: Vec<String> = Vec::new();
    for v in values {
        if seen.insert(v) {
            res.push(v.to_string());
        }
    }
    res
}

/// Applies a complete selection to the dataset.
pub fn filter<'a>(dataset: &'a Dataset, selection: &Selection) -> View<'a> {
    View::all(dataset).filter_all(&selection.predicates())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn incident(id: &str, country: &str, year: i32, disorder: &str, event: &str) -> Incident {
        let date = NaiveDate::from_ymd_opt(year, 3, 1).unwrap();
        Incident {
            country: country.to_string(),
            disorder_type: disorder.to_string(),
            event_type: event.to_string(),
            ..Incident::new(id, date)
        }
    }

    fn sample() -> Dataset {
        Dataset::new(
            vec![
                incident("ISR1", "Israel", 2016, "Demonstrations", "Protests"),
                incident("PSE1", "Palestine", 2017, "Political violence", "Riots"),
                incident("ISR2", "Israel", 2018, "Political violence", "Battles"),
                incident("PSE2", "Palestine", 2018, "Demonstrations", "Protests"),
                incident("LBN1", "Lebanon", 2018, "Political violence", "Battles"),
                incident(
                    "PSE3",
                    "Palestine",
                    2020,
                    "Political violence",
                    "Explosions/Remote violence",
                ),
            ],
            Schema::default(),
        )
    }

    fn ids(view: &View) -> Vec<String> {
        view.incidents().map(|i| i.event_id_cnty.clone()).collect()
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn year_range_is_inclusive() {
        let ds = sample();
        let yr = YearRange::new(2017, 2018).unwrap();
        let view = View::all(&ds).filter(&Predicate::Years(yr));
        assert_eq!(ids(&view), vec!["PSE1", "ISR2", "PSE2", "LBN1"]);
        assert!(view.incidents().all(|i| yr.contains(i.year)));
    }

    #[test]
    fn both_is_union_of_countries() {
        let ds = sample();
        let all = View::all(&ds);
        let both = all.filter(&Predicate::Country(CountrySelection::Both));
        let israel = all.filter(&Predicate::Country(CountrySelection::Israel));
        let palestine = all.filter(&Predicate::Country(CountrySelection::Palestine));

        let mut union: Vec<usize> = israel.indices().to_vec();
        union.extend(palestine.indices());
        union.sort_unstable();
        union.dedup();
        assert_eq!(both.indices(), union.as_slice());
        assert_eq!(both.len(), israel.len() + palestine.len());
        assert!(!ids(&both).contains(&"LBN1".to_string()));
    }

    #[test]
    fn predicate_order_does_not_matter() {
        let ds = sample();
        let selection = Selection {
            country: CountrySelection::Both,
            years: Some(YearRange::new(2017, 2020).unwrap()),
            disorder_types: set(&["Political violence"]),
            event_types: set(&["Riots", "Battles", "Protests"]),
        };
        let direct = filter(&ds, &selection);

        let preds = selection.predicates();
        let mut reversed = View::all(&ds);
        for p in preds.iter().rev() {
            reversed = reversed.filter(p);
        }
        let mut chained = View::all(&ds);
        for p in preds.iter() {
            chained = chained.filter(p);
        }
        assert_eq!(direct, reversed);
        assert_eq!(direct, chained);
        assert_eq!(ids(&direct), vec!["PSE1", "ISR2"]);
    }

    #[test]
    fn absent_type_gives_empty_view() {
        let ds = sample();
        let selection = Selection {
            country: CountrySelection::Both,
            years: None,
            disorder_types: set(&["Strategic developments"]),
            event_types: set(&["Protests"]),
        };
        let view = filter(&ds, &selection);
        assert!(view.is_empty());
        assert!(view.years().is_empty());
    }

    #[test]
    fn filtering_leaves_dataset_untouched() {
        let ds = sample();
        let before = ds.clone();
        let view = View::all(&ds).filter(&Predicate::Country(CountrySelection::Israel));
        assert_eq!(view.len(), 2);
        assert_eq!(ds, before);
    }

    #[test]
    fn distinct_values() {
        let ds = sample();
        let view = View::all(&ds).filter(&Predicate::Country(CountrySelection::Palestine));
        assert_eq!(view.years(), vec![2017, 2018, 2020]);
        assert_eq!(
            view.event_types(),
            vec!["Riots", "Protests", "Explosions/Remote violence"]
        );
        assert_eq!(
            view.disorder_types(),
            vec!["Political violence", "Demonstrations"]
        );
    }
}
