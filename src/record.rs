//! Canonical record model: one [`CommuneRecord`] per administrative unit.

use serde::{Serialize, Serializer};
use std::fmt;

/// Sentinel political label for communes with no usable affiliation.
pub const UNCLASSIFIED: &str = "Unclassified";

/// Population size class, derived once from `population`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PopulationCategory {
    Under500,
    From500To2000,
    From2000To10000,
    From10000To50000,
    Over50000,
}

use PopulationCategory::*;

/// Right-inclusive upper edges. Anything above the last edge is [`Over50000`].
static POPULATION_BINS: &[(u64, PopulationCategory)] = &[
    (500, Under500),
    (2000, From500To2000),
    (10000, From2000To10000),
    (50000, From10000To50000),
];

impl PopulationCategory {
    pub const ALL: [PopulationCategory; 5] = [
        Under500,
        From500To2000,
        From2000To10000,
        From10000To50000,
        Over50000,
    ];

    /// Looks up the bin for a population count.
    ///
    /// | Population        | Category      |
    /// |-------------------|---------------|
    /// | 0 ..= 500         | `< 500 hab`   |
    /// | 501 ..= 2000      | `500-2000`    |
    /// | 2001 ..= 10000    | `2000-10000`  |
    /// | 10001 ..= 50000   | `10000-50000` |
    /// | > 50000           | `> 50000`     |
    pub fn from_population(population: u64) -> Self {
        POPULATION_BINS
            .iter()
            .find(|(upper, _)| population <= *upper)
            .map(|(_, category)| *category)
            .unwrap_or(Over50000)
    }

    pub fn label(self) -> &'static str {
        match self {
            Under500 => "< 500 hab",
            From500To2000 => "500-2000",
            From2000To10000 => "2000-10000",
            From10000To50000 => "10000-50000",
            Over50000 => "> 50000",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl fmt::Display for PopulationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for PopulationCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// A single commune after normalization.
///
/// Amount fields are always present (zero is a real value). Coordinates are
/// `None` whenever the source value was missing, unparseable or out of range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommuneRecord {
    pub insee_code: String,
    pub name: String,
    pub department: String,
    pub population: u64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    // amounts
    pub representation_fee: f64,
    pub eur_per_capita: f64,
    pub total_charges: f64,
    pub charges_personnel: f64,
    pub charges_purchases_services: f64,
    pub charges_financial: f64,
    pub charges_exceptional: f64,
    pub charges_other_management: f64,
    pub fee_ratio: f64,

    pub political_color: String,
    pub population_category: PopulationCategory,
}

impl CommuneRecord {
    /// Returns `(lat, lon)` when both coordinates are present and in bounds.
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if valid_latitude(lat) && valid_longitude(lon) => {
                Some((lat, lon))
            }
            _ => None,
        }
    }
}

pub fn valid_latitude(lat: f64) -> bool {
    (-90.0..=90.0).contains(&lat)
}

pub fn valid_longitude(lon: f64) -> bool {
    (-180.0..=180.0).contains(&lon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::commune;

    #[test]
    fn test_category_bin_edges_are_right_inclusive() {
        assert_eq!(PopulationCategory::from_population(0), Under500);
        assert_eq!(PopulationCategory::from_population(500), Under500);
        assert_eq!(PopulationCategory::from_population(501), From500To2000);
        assert_eq!(PopulationCategory::from_population(2000), From500To2000);
        assert_eq!(PopulationCategory::from_population(2001), From2000To10000);
        assert_eq!(PopulationCategory::from_population(10000), From2000To10000);
        assert_eq!(PopulationCategory::from_population(50000), From10000To50000);
        assert_eq!(PopulationCategory::from_population(50001), Over50000);
        assert_eq!(PopulationCategory::from_population(u64::MAX), Over50000);
    }

    #[test]
    fn test_labels_round_trip() {
        for category in PopulationCategory::ALL {
            assert_eq!(PopulationCategory::from_label(category.label()), Some(category));
        }
        assert_eq!(PopulationCategory::from_label("huge"), None);
    }

    #[test]
    fn test_category_serializes_as_label() {
        let json = serde_json::to_string(&From2000To10000).unwrap();
        assert_eq!(json, "\"2000-10000\"");
    }

    #[test]
    fn test_position_requires_both_coordinates_in_bounds() {
        let mut c = commune("01001", "Abergement", 800, 1.0);
        c.latitude = Some(46.1);
        c.longitude = Some(5.2);
        assert_eq!(c.position(), Some((46.1, 5.2)));

        c.longitude = None;
        assert_eq!(c.position(), None);

        c.longitude = Some(181.0);
        assert_eq!(c.position(), None);

        c.longitude = Some(-180.0);
        c.latitude = Some(-90.0);
        assert_eq!(c.position(), Some((-90.0, -180.0)));
    }
}
