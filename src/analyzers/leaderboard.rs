//! Top-N rankings and table ordering.
//!
//! All rankings are stable: records with equal keys keep their view order.
//! Asking for more entries than qualify returns every qualifying record.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::record::CommuneRecord;

/// Stable descending ranking of the qualifying records, truncated to `n`.
fn top_n<'a, Q, K>(view: &[&'a CommuneRecord], n: usize, qualifies: Q, key: K) -> Vec<&'a CommuneRecord>
where
    Q: Fn(&CommuneRecord) -> bool,
    K: Fn(&CommuneRecord) -> f64,
{
    let mut ranked: Vec<&CommuneRecord> = view.iter().copied().filter(|r| qualifies(r)).collect();
    ranked.sort_by(|a, b| key(b).total_cmp(&key(a)));
    ranked.truncate(n);
    ranked
}

/// Highest eur_per_capita first.
pub fn top_by_eur_per_capita<'a>(view: &[&'a CommuneRecord], n: usize) -> Vec<&'a CommuneRecord> {
    top_n(view, n, |_| true, |r| r.eur_per_capita)
}

/// Communes that declared no representation fee, most populous first.
pub fn top_zero_fee_by_population<'a>(
    view: &[&'a CommuneRecord],
    n: usize,
) -> Vec<&'a CommuneRecord> {
    top_n(
        view,
        n,
        |r| r.representation_fee == 0.0,
        |r| r.population as f64,
    )
}

/// Highest fee_ratio first, among communes with a positive ratio.
pub fn top_by_fee_ratio<'a>(view: &[&'a CommuneRecord], n: usize) -> Vec<&'a CommuneRecord> {
    top_n(view, n, |r| r.fee_ratio > 0.0, |r| r.fee_ratio)
}

pub fn top_by_total_charges<'a>(view: &[&'a CommuneRecord], n: usize) -> Vec<&'a CommuneRecord> {
    top_n(view, n, |_| true, |r| r.total_charges)
}

/// The three leaderboards shown side by side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leaderboards<'a> {
    pub top_eur_per_capita: Vec<&'a CommuneRecord>,
    pub zero_fee_by_population: Vec<&'a CommuneRecord>,
    pub top_fee_ratio: Vec<&'a CommuneRecord>,
}

pub fn leaderboards<'a>(view: &[&'a CommuneRecord], n: usize) -> Leaderboards<'a> {
    Leaderboards {
        top_eur_per_capita: top_by_eur_per_capita(view, n),
        zero_fee_by_population: top_zero_fee_by_population(view, n),
        top_fee_ratio: top_by_fee_ratio(view, n),
    }
}

/// Column a table view can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    EurPerCapita,
    RepresentationFee,
    Population,
    Name,
    TotalCharges,
    ChargesPersonnel,
    FeeRatio,
}

impl SortKey {
    fn compare(self, a: &CommuneRecord, b: &CommuneRecord) -> Ordering {
        match self {
            SortKey::EurPerCapita => a.eur_per_capita.total_cmp(&b.eur_per_capita),
            SortKey::RepresentationFee => a.representation_fee.total_cmp(&b.representation_fee),
            SortKey::Population => a.population.cmp(&b.population),
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::TotalCharges => a.total_charges.total_cmp(&b.total_charges),
            SortKey::ChargesPersonnel => a.charges_personnel.total_cmp(&b.charges_personnel),
            SortKey::FeeRatio => a.fee_ratio.total_cmp(&b.fee_ratio),
        }
    }
}

/// Returns a new, stably sorted view.
pub fn sort_view<'a>(view: &[&'a CommuneRecord], key: SortKey, descending: bool) -> Vec<&'a CommuneRecord> {
    let mut sorted = view.to_vec();
    sorted.sort_by(|a, b| {
        let ord = key.compare(a, b);
        if descending { ord.reverse() } else { ord }
    });
    sorted
}
