//! Multi-predicate filter engine.
//!
//! A [`FilterSpec`] expands into independent [`Predicate`]s that are combined
//! with logical AND. Filtering borrows from its input and never copies or
//! mutates records, so views can be filtered again in any order with the same
//! result.

use std::collections::BTreeSet;
use tracing::debug;

use crate::record::{CommuneRecord, PopulationCategory};

/// Department value that disables the department predicate.
pub const ALL_DEPARTMENTS: &str = "All";

/// A single test on a record. All range bounds are inclusive.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Department(String),
    PopulationRange(u64, u64),
    EurPerCapitaRange(f64, f64),
    PoliticalColors(BTreeSet<String>),
    NameContains(String),
    FeeRange(f64, f64),
    RatioRange(f64, f64),
    Category(PopulationCategory),
}

impl Predicate {
    pub fn matches(&self, r: &CommuneRecord) -> bool {
        match self {
            Predicate::Department(d) => r.department == *d,
            Predicate::PopulationRange(min, max) => (*min..=*max).contains(&r.population),
            Predicate::EurPerCapitaRange(min, max) => in_range(r.eur_per_capita, *min, *max),
            Predicate::PoliticalColors(set) => set.contains(&r.political_color),
            Predicate::NameContains(needle) => {
                r.name.to_lowercase().contains(&needle.to_lowercase())
            }
            Predicate::FeeRange(min, max) => in_range(r.representation_fee, *min, *max),
            Predicate::RatioRange(min, max) => in_range(r.fee_ratio, *min, *max),
            Predicate::Category(c) => r.population_category == *c,
        }
    }
}

fn in_range(value: f64, min: f64, max: f64) -> bool {
    min <= value && value <= max
}

/// User-facing filter selection. `None` fields match everything.
///
/// `political_colors: Some(empty set)` matches nothing, as an empty
/// multi-select would.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub department: Option<String>,
    pub population_range: Option<(u64, u64)>,
    pub eur_per_capita_range: Option<(f64, f64)>,
    pub political_colors: Option<BTreeSet<String>>,
    pub name_substring: Option<String>,
    pub fee_range: Option<(f64, f64)>,
    pub ratio_range: Option<(f64, f64)>,
    pub population_category: Option<PopulationCategory>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// `"All"` clears the department predicate.
    pub fn with_department(mut self, department: &str) -> Self {
        self.department =
            (department != ALL_DEPARTMENTS).then(|| department.to_string());
        self
    }

    pub fn with_population_range(mut self, min: u64, max: u64) -> Self {
        self.population_range = Some((min, max));
        self
    }

    pub fn with_eur_per_capita_range(mut self, min: f64, max: f64) -> Self {
        self.eur_per_capita_range = Some((min, max));
        self
    }

    pub fn with_political_colors<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.political_colors = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_name_substring(mut self, needle: &str) -> Self {
        self.name_substring = Some(needle.to_string());
        self
    }

    pub fn with_fee_range(mut self, min: f64, max: f64) -> Self {
        self.fee_range = Some((min, max));
        self
    }

    pub fn with_ratio_range(mut self, min: f64, max: f64) -> Self {
        self.ratio_range = Some((min, max));
        self
    }

    pub fn with_population_category(mut self, category: PopulationCategory) -> Self {
        self.population_category = Some(category);
        self
    }

    /// Expands the selection into predicates, omitting no-ops
    /// (`"All"` department, empty substring).
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut out = Vec::new();

        if let Some(d) = self.department.as_deref().filter(|d| *d != ALL_DEPARTMENTS) {
            out.push(Predicate::Department(d.to_string()));
        }
        if let Some((min, max)) = self.population_range {
            out.push(Predicate::PopulationRange(min, max));
        }
        if let Some((min, max)) = self.eur_per_capita_range {
            out.push(Predicate::EurPerCapitaRange(min, max));
        }
        if let Some(set) = &self.political_colors {
            out.push(Predicate::PoliticalColors(set.clone()));
        }
        if let Some(needle) = self.name_substring.as_deref().filter(|n| !n.is_empty()) {
            out.push(Predicate::NameContains(needle.to_string()));
        }
        if let Some((min, max)) = self.fee_range {
            out.push(Predicate::FeeRange(min, max));
        }
        if let Some((min, max)) = self.ratio_range {
            out.push(Predicate::RatioRange(min, max));
        }
        if let Some(c) = self.population_category {
            out.push(Predicate::Category(c));
        }

        out
    }

    pub fn apply<'a, I>(&self, records: I) -> Vec<&'a CommuneRecord>
    where
        I: IntoIterator<Item = &'a CommuneRecord>,
    {
        apply_predicates(records, &self.predicates())
    }
}

/// Keeps the records that satisfy every predicate, in input order.
///
/// An empty predicate list returns the input unchanged.
pub fn apply_predicates<'a, I>(records: I, predicates: &[Predicate]) -> Vec<&'a CommuneRecord>
where
    I: IntoIterator<Item = &'a CommuneRecord>,
{
    let view: Vec<_> = records
        .into_iter()
        .filter(|r| predicates.iter().all(|p| p.matches(r)))
        .collect();
    debug!(predicates = predicates.len(), matched = view.len(), "Filter applied");
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{commune, commune_with};

    fn sample() -> Vec<CommuneRecord> {
        let mut records = vec![
            commune_with("01001", 100, 0.5, 50.0, 0.01, "Gauche"),
            commune_with("13055", 5000, 10.0, 50000.0, 0.2, "Droite"),
            commune_with("75056", 200000, 3.0, 600000.0, 0.0, "Unclassified"),
            commune_with("69123", 1500, 2.0, 0.0, 0.0, "Centre"),
        ];
        records[0].name = "Saint-Denis".into();
        records[1].name = "Marseille".into();
        records[2].name = "Paris".into();
        records[2].department = "75".into();
        records[3].name = "SAINT-GENIS".into();
        records
    }

    fn codes(view: &[&CommuneRecord]) -> Vec<String> {
        view.iter().map(|r| r.insee_code.clone()).collect()
    }

    #[test]
    fn test_no_predicates_returns_input() {
        let records = sample();
        let view = FilterSpec::new().apply(&records);
        assert_eq!(view.len(), records.len());
    }

    #[test]
    fn test_ranges_are_inclusive() {
        let records = sample();
        let view = FilterSpec::new()
            .with_population_range(100, 5000)
            .with_eur_per_capita_range(0.5, 10.0)
            .apply(&records);
        assert_eq!(codes(&view), vec!["01001", "13055", "69123"]);
    }

    #[test]
    fn test_all_department_is_noop() {
        let records = sample();
        assert_eq!(FilterSpec::new().with_department("All").apply(&records).len(), 4);
        assert_eq!(
            codes(&FilterSpec::new().with_department("75").apply(&records)),
            vec!["75056"]
        );
    }

    #[test]
    fn test_name_substring_case_insensitive() {
        let records = sample();
        let view = FilterSpec::new().with_name_substring("saint").apply(&records);
        assert_eq!(codes(&view), vec!["01001", "69123"]);

        let view = FilterSpec::new().with_name_substring("").apply(&records);
        assert_eq!(view.len(), 4);
    }

    #[test]
    fn test_political_color_set() {
        let records = sample();
        let view = FilterSpec::new()
            .with_political_colors(["Gauche", "Centre"])
            .apply(&records);
        assert_eq!(codes(&view), vec!["01001", "69123"]);

        let none: [&str; 0] = [];
        assert!(FilterSpec::new().with_political_colors(none).apply(&records).is_empty());
    }

    #[test]
    fn test_fee_ratio_and_category_predicates() {
        let records = sample();
        let view = FilterSpec::new()
            .with_fee_range(0.0, 50.0)
            .with_ratio_range(0.0, 0.05)
            .apply(&records);
        assert_eq!(codes(&view), vec!["01001", "69123"]);

        let view = FilterSpec::new()
            .with_population_category(PopulationCategory::Over50000)
            .apply(&records);
        assert_eq!(codes(&view), vec!["75056"]);
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let records = sample();
        let view = FilterSpec::new().with_population_range(10, 20).apply(&records);
        assert!(view.is_empty());
    }

    #[test]
    fn test_partitioned_application_matches_single_pass() {
        let records = sample();
        let all = FilterSpec::new()
            .with_population_range(150, 300000)
            .with_eur_per_capita_range(1.0, 20.0)
            .with_name_substring("a")
            .predicates();

        let single = apply_predicates(&records, &all);

        for split in 0..=all.len() {
            let (head, tail) = all.split_at(split);
            let staged = apply_predicates(apply_predicates(&records, tail), head);
            assert_eq!(staged, single, "split at {split}");
        }

        let mut reversed = all.clone();
        reversed.reverse();
        assert_eq!(apply_predicates(&records, &reversed), single);
    }

    #[test]
    fn test_filtering_does_not_touch_source() {
        let records = vec![commune("1", "A", 10, 1.0)];
        let before = records.clone();
        let _ = FilterSpec::new().with_population_range(0, 1).apply(&records);
        assert_eq!(records, before);
    }
}
