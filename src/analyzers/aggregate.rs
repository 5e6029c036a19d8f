use chrono::Utc;
use tracing::debug;

use crate::analyzers::leaderboard::top_by_total_charges;
use crate::analyzers::types::{
    BudgetSummary, CategoryStats, ChargeBreakdown, PoliticalStats, StatsReport, Summary,
};
use crate::analyzers::utility::{max, mean, median, stddev};
use crate::record::{CommuneRecord, PopulationCategory};

fn eur_values<'a, 'b: 'a>(records: impl IntoIterator<Item = &'a &'b CommuneRecord>) -> Vec<f64> {
    records.into_iter().map(|r| r.eur_per_capita).collect()
}

/// Groups by population class. All five classes are reported, in bin order,
/// with `None` mean and median for empty classes.
pub fn category_stats(view: &[&CommuneRecord]) -> Vec<CategoryStats> {
    PopulationCategory::ALL
        .into_iter()
        .map(|category| {
            let values = eur_values(view.iter().filter(|r| r.population_category == category));
            CategoryStats {
                category,
                mean: mean(&values),
                median: median(&values),
                count: values.len(),
            }
        })
        .collect()
}

/// Groups by political label, sorted by descending mean eur_per_capita.
///
/// Groups are formed in first-seen order and the sort is stable, so equal
/// means keep that order.
pub fn political_stats(view: &[&CommuneRecord]) -> Vec<PoliticalStats> {
    let mut groups: Vec<(&str, Vec<&CommuneRecord>)> = Vec::new();
    for &r in view {
        match groups.iter_mut().find(|(label, _)| *label == r.political_color) {
            Some((_, members)) => members.push(r),
            None => groups.push((r.political_color.as_str(), vec![r])),
        }
    }

    let mut stats: Vec<PoliticalStats> = groups
        .into_iter()
        .map(|(label, members)| {
            let values = eur_values(&members);
            // groups are never empty
            let avg = mean(&values).unwrap_or(0.0);
            PoliticalStats {
                political_color: label.to_string(),
                mean: avg,
                median: median(&values).unwrap_or(0.0),
                stddev: stddev(&values, avg),
                total_fee: members.iter().map(|r| r.representation_fee).sum(),
                count: members.len(),
            }
        })
        .collect();

    stats.sort_by(|a, b| b.mean.total_cmp(&a.mean));
    debug!(groups = stats.len(), "Political stats computed");
    stats
}

pub fn summary(view: &[&CommuneRecord]) -> Summary {
    let values = eur_values(view);
    Summary {
        communes: view.len(),
        total_fee: view.iter().map(|r| r.representation_fee).sum(),
        mean_eur_per_capita: mean(&values),
        median_eur_per_capita: median(&values),
        max_eur_per_capita: max(&values),
    }
}

pub fn budget_summary(view: &[&CommuneRecord]) -> BudgetSummary {
    let total_charges: f64 = view.iter().map(|r| r.total_charges).sum();
    let positive_ratios: Vec<f64> = view
        .iter()
        .map(|r| r.fee_ratio)
        .filter(|v| *v > 0.0)
        .collect();
    let ratios: Vec<f64> = view.iter().map(|r| r.fee_ratio).collect();

    BudgetSummary {
        has_budget_data: total_charges > 0.0,
        total_charges,
        total_personnel: view.iter().map(|r| r.charges_personnel).sum(),
        mean_fee_ratio: mean(&positive_ratios),
        max_fee_ratio: max(&ratios),
    }
}

/// Charge composition of the `n` communes with the largest total charges.
pub fn charge_breakdown(view: &[&CommuneRecord], n: usize) -> Vec<ChargeBreakdown> {
    top_by_total_charges(view, n)
        .into_iter()
        .map(|r| ChargeBreakdown {
            insee_code: r.insee_code.clone(),
            name: r.name.clone(),
            total_charges: r.total_charges,
            personnel: r.charges_personnel,
            purchases_services: r.charges_purchases_services,
            other_management: r.charges_other_management,
            financial: r.charges_financial,
            exceptional: r.charges_exceptional,
        })
        .collect()
}

/// Builds the combined statistics report for a view.
pub fn stats_report(view: &[&CommuneRecord]) -> StatsReport {
    StatsReport {
        generated_at: Utc::now(),
        summary: summary(view),
        categories: category_stats(view),
        political: political_stats(view),
        budget: budget_summary(view),
    }
}
