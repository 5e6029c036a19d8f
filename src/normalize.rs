//! Locale-aware coercion of raw rows into [`CommuneRecord`] values.
//!
//! Numbers use a comma as decimal separator and may be space-grouped
//! (`"1 234,5"`). Coercion never fails: amounts and population fall back to
//! zero, coordinates to `None`, political colour to [`UNCLASSIFIED`].

use std::collections::HashSet;
use tracing::{debug, warn};

use crate::parser::RawCommune;
use crate::record::{
    CommuneRecord, PopulationCategory, UNCLASSIFIED, valid_latitude, valid_longitude,
};

/// Cell values treated as missing, compared after trimming.
pub const MISSING_MARKERS: &[&str] = &["", "N/A", "#N/D", "#N/A"];

/// Political colour values that map to [`UNCLASSIFIED`] besides the missing markers.
const UNCLASSIFIED_ALIASES: &[&str] = &["Non classé", UNCLASSIFIED];

pub fn is_missing(raw: Option<&str>) -> bool {
    raw.is_none_or(|s| MISSING_MARKERS.contains(&s.trim()))
}

/// Parses a locale numeric string: whitespace removed, `,` read as `.`.
///
/// Returns `None` for missing markers, unparseable text and non-finite values.
pub fn parse_locale_number(raw: Option<&str>) -> Option<f64> {
    if is_missing(raw) {
        return None;
    }
    let cleaned: String = raw?
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Amount semantics: anything that is not a non-negative number is `0.0`.
pub fn coerce_amount(raw: Option<&str>) -> f64 {
    match parse_locale_number(raw) {
        Some(v) if v > 0.0 => v,
        _ => 0.0,
    }
}

/// Parses then truncates toward zero. Negative or invalid input gives 0.
pub fn coerce_population(raw: Option<&str>) -> u64 {
    match parse_locale_number(raw) {
        Some(v) if v > 0.0 => v.trunc() as u64,
        _ => 0,
    }
}

pub fn coerce_latitude(raw: Option<&str>) -> Option<f64> {
    parse_locale_number(raw).filter(|v| valid_latitude(*v))
}

pub fn coerce_longitude(raw: Option<&str>) -> Option<f64> {
    parse_locale_number(raw).filter(|v| valid_longitude(*v))
}

/// Missing markers and "not classified" tokens become [`UNCLASSIFIED`];
/// any other label is kept as-is.
pub fn normalize_political_color(raw: Option<&str>) -> String {
    match raw {
        Some(label) if !is_missing(raw) && !UNCLASSIFIED_ALIASES.contains(&label.trim()) => {
            label.to_string()
        }
        _ => UNCLASSIFIED.to_string(),
    }
}

fn text(raw: Option<&str>) -> String {
    raw.map(str::trim).unwrap_or_default().to_string()
}

/// Coerces a single row. Never fails.
pub fn normalize_row(raw: &RawCommune) -> CommuneRecord {
    let population = coerce_population(raw.population.as_deref());

    CommuneRecord {
        insee_code: text(raw.insee_code.as_deref()),
        name: text(raw.name.as_deref()),
        department: text(raw.department.as_deref()),
        population,
        latitude: coerce_latitude(raw.latitude.as_deref()),
        longitude: coerce_longitude(raw.longitude.as_deref()),
        representation_fee: coerce_amount(raw.representation_fee.as_deref()),
        eur_per_capita: coerce_amount(raw.eur_per_capita.as_deref()),
        total_charges: coerce_amount(raw.total_charges.as_deref()),
        charges_personnel: coerce_amount(raw.charges_personnel.as_deref()),
        charges_purchases_services: coerce_amount(raw.charges_purchases_services.as_deref()),
        charges_financial: coerce_amount(raw.charges_financial.as_deref()),
        charges_exceptional: coerce_amount(raw.charges_exceptional.as_deref()),
        charges_other_management: coerce_amount(raw.charges_other_management.as_deref()),
        fee_ratio: coerce_amount(raw.fee_ratio.as_deref()),
        political_color: normalize_political_color(raw.political_color.as_deref()),
        population_category: PopulationCategory::from_population(population),
    }
}

/// Builds the canonical collection, one record per `insee_code`.
///
/// Input order is preserved. A repeated non-empty `insee_code` keeps its
/// first occurrence; later duplicates are logged and skipped. Rows without a
/// code are always kept.
pub fn normalize<I>(rows: I) -> Vec<CommuneRecord>
where
    I: IntoIterator<Item = RawCommune>,
{
    let mut seen = HashSet::new();
    let mut records = Vec::new();
    let mut duplicates = 0usize;

    for raw in rows {
        let record = normalize_row(&raw);
        if !record.insee_code.is_empty() && !seen.insert(record.insee_code.clone()) {
            duplicates += 1;
            warn!(insee_code = %record.insee_code, "Duplicate commune code, keeping first row");
            continue;
        }
        records.push(record);
    }

    debug!(records = records.len(), duplicates, "Normalization complete");
    records
}

/// Canonical text form of a number: shortest round-trip digits, comma decimal.
pub fn locale_number_text(value: f64) -> String {
    value.to_string().replace('.', ",")
}

impl From<&CommuneRecord> for RawCommune {
    /// Renders a canonical record back to raw text, so it can be re-normalized.
    fn from(r: &CommuneRecord) -> Self {
        let amount = |v: f64| Some(locale_number_text(v));
        RawCommune {
            insee_code: Some(r.insee_code.clone()),
            name: Some(r.name.clone()),
            department: Some(r.department.clone()),
            population: Some(r.population.to_string()),
            latitude: r.latitude.map(locale_number_text),
            longitude: r.longitude.map(locale_number_text),
            political_color: Some(r.political_color.clone()),
            representation_fee: amount(r.representation_fee),
            eur_per_capita: amount(r.eur_per_capita),
            total_charges: amount(r.total_charges),
            charges_personnel: amount(r.charges_personnel),
            charges_purchases_services: amount(r.charges_purchases_services),
            charges_financial: amount(r.charges_financial),
            charges_exceptional: amount(r.charges_exceptional),
            charges_other_management: amount(r.charges_other_management),
            fee_ratio: amount(r.fee_ratio),
        }
    }
}
