//! Result types produced by the aggregation routines.
//!
//! Statistics that cannot be computed for a group are `None`, which
//! serializes to JSON `null`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::record::PopulationCategory;

/// eur_per_capita statistics for one population class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub category: PopulationCategory,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub count: usize,
}

/// eur_per_capita statistics and fee total for one political label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoliticalStats {
    pub political_color: String,
    pub mean: f64,
    pub median: f64,
    pub stddev: Option<f64>,
    pub total_fee: f64,
    pub count: usize,
}

/// Headline figures for a view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub communes: usize,
    pub total_fee: f64,
    pub mean_eur_per_capita: Option<f64>,
    pub median_eur_per_capita: Option<f64>,
    pub max_eur_per_capita: Option<f64>,
}

/// Budget-level figures for a view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetSummary {
    pub has_budget_data: bool,
    pub total_charges: f64,
    pub total_personnel: f64,
    /// Mean over communes with a positive ratio.
    pub mean_fee_ratio: Option<f64>,
    pub max_fee_ratio: Option<f64>,
}

/// Charge breakdown of one commune, for stacked budget charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeBreakdown {
    pub insee_code: String,
    pub name: String,
    pub total_charges: f64,
    pub personnel: f64,
    pub purchases_services: f64,
    pub other_management: f64,
    pub financial: f64,
    pub exceptional: f64,
}

/// Everything the statistics pane shows, as one serializable report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub generated_at: DateTime<Utc>,
    pub summary: Summary,
    pub categories: Vec<CategoryStats>,
    pub political: Vec<PoliticalStats>,
    pub budget: BudgetSummary,
}
