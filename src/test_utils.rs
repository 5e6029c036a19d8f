//! Record builders shared by unit tests.

use crate::normalize::normalize_row;
use crate::parser::RawCommune;
use crate::record::CommuneRecord;

/// Creates a record through the normalizer so derived fields stay consistent.
pub fn commune(code: &str, name: &str, population: u64, eur_per_capita: f64) -> CommuneRecord {
    normalize_row(&RawCommune {
        insee_code: Some(code.to_string()),
        name: Some(name.to_string()),
        department: Some("01".to_string()),
        population: Some(population.to_string()),
        eur_per_capita: Some(eur_per_capita.to_string()),
        ..Default::default()
    })
}

/// Same as [`commune`] with fee, ratio and political colour set.
pub fn commune_with(
    code: &str,
    population: u64,
    eur_per_capita: f64,
    fee: f64,
    ratio: f64,
    political_color: &str,
) -> CommuneRecord {
    CommuneRecord {
        representation_fee: fee,
        fee_ratio: ratio,
        political_color: political_color.to_string(),
        ..commune(code, &format!("Commune {code}"), population, eur_per_capita)
    }
}
