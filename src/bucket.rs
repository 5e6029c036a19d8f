//! Percentile-relative colour tiers for map display.
//!
//! Numeric modes scale each value by the 95th percentile of the metric over
//! the current view (the "cap") and cut the scaled value at 0.33 and 0.66.
//! The cap is recomputed per view, so tiers are relative to the active
//! filter selection. The political mode maps labels through a fixed palette.

use serde::Serialize;
use tracing::debug;

use crate::analyzers::utility::percentile;
use crate::record::{CommuneRecord, UNCLASSIFIED};

pub const CAP_PERCENTILE: f64 = 0.95;
pub const LOW_UPPER: f64 = 0.33;
pub const MID_UPPER: f64 = 0.66;

/// Colour for unknown political labels and the [`UNCLASSIFIED`] sentinel.
pub const FALLBACK_COLOR: &str = "#95a5a6";

static POLITICAL_PALETTE: &[(&str, &str)] = &[
    ("Gauche", "#e74c3c"),
    ("Droite", "#3498db"),
    ("Centre", "#f39c12"),
    ("Extrême droite", "#1a1a2e"),
    ("Courants politiques divers", "#9b59b6"),
    (UNCLASSIFIED, FALLBACK_COLOR),
];

pub fn political_color_hex(label: &str) -> &'static str {
    POLITICAL_PALETTE
        .iter()
        .find(|(l, _)| *l == label)
        .map(|(_, hex)| *hex)
        .unwrap_or(FALLBACK_COLOR)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    EurPerCapita,
    RepresentationFee,
    FeeRatio,
}

impl Metric {
    pub fn value(self, r: &CommuneRecord) -> f64 {
        match self {
            Metric::EurPerCapita => r.eur_per_capita,
            Metric::RepresentationFee => r.representation_fee,
            Metric::FeeRatio => r.fee_ratio,
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::EurPerCapita => "€/hab",
            Metric::RepresentationFee => "€",
            Metric::FeeRatio => "%",
        }
    }

    /// Display decimals used for tooltips and legends.
    pub fn decimals(self) -> usize {
        match self {
            Metric::RepresentationFee => 0,
            Metric::EurPerCapita | Metric::FeeRatio => 2,
        }
    }

    /// Zero ratios are not calibration points for the cap.
    fn excludes_zero_from_cap(self) -> bool {
        matches!(self, Metric::FeeRatio)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    Metric(Metric),
    PoliticalColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Low,
    Mid,
    High,
}

impl Tier {
    /// `[0, 0.33)` low, `[0.33, 0.66)` mid, `[0.66, 1]` high.
    pub fn from_scaled(scaled: f64) -> Self {
        if scaled < LOW_UPPER {
            Tier::Low
        } else if scaled < MID_UPPER {
            Tier::Mid
        } else {
            Tier::High
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Tier::Low => "#2ecc71",
            Tier::Mid => "#f39c12",
            Tier::High => "#e74c3c",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Low => "low",
            Tier::Mid => "mid",
            Tier::High => "high",
        }
    }
}

/// 95th percentile of `metric` over the view, `0.0` when nothing qualifies.
pub fn percentile_cap(view: &[&CommuneRecord], metric: Metric) -> f64 {
    let values: Vec<f64> = view
        .iter()
        .map(|r| metric.value(r))
        .filter(|v| !metric.excludes_zero_from_cap() || *v > 0.0)
        .collect();
    percentile(&values, CAP_PERCENTILE).unwrap_or(0.0)
}

/// `min(value / cap, 1)`, or `0` when the cap is not positive.
pub fn scale(value: f64, cap: f64) -> f64 {
    if cap > 0.0 { (value / cap).min(1.0) } else { 0.0 }
}

/// Value bounds of the three tiers for a given cap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Legend {
    pub metric: Metric,
    pub cap: f64,
    pub low_upper: f64,
    pub mid_upper: f64,
    pub unit: &'static str,
    pub decimals: usize,
}

impl Legend {
    pub fn new(metric: Metric, cap: f64) -> Self {
        Self {
            metric,
            cap,
            low_upper: cap * LOW_UPPER,
            mid_upper: cap * MID_UPPER,
            unit: metric.unit(),
            decimals: metric.decimals(),
        }
    }
}

/// Colour assignment for one record. `tier` is `None` in the political mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucketed<'a> {
    pub record: &'a CommuneRecord,
    pub tier: Option<Tier>,
    pub color: &'static str,
}

/// Result of bucketizing a view; `entries` follows the view order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucketing<'a> {
    pub mode: ColorMode,
    pub legend: Option<Legend>,
    pub entries: Vec<Bucketed<'a>>,
}

impl Bucketing<'_> {
    pub fn count(&self, tier: Tier) -> usize {
        self.entries.iter().filter(|e| e.tier == Some(tier)).count()
    }
}

/// Assigns a colour to every record of the view.
pub fn bucketize<'a>(view: &[&'a CommuneRecord], mode: ColorMode) -> Bucketing<'a> {
    match mode {
        ColorMode::Metric(metric) => {
            let cap = percentile_cap(view, metric);
            debug!(?metric, cap, records = view.len(), "Bucketizing");

            let entries = view
                .iter()
                .map(|&r| {
                    let tier = Tier::from_scaled(scale(metric.value(r), cap));
                    Bucketed {
                        record: r,
                        tier: Some(tier),
                        color: tier.color(),
                    }
                })
                .collect();

            Bucketing {
                mode,
                legend: Some(Legend::new(metric, cap)),
                entries,
            }
        }
        ColorMode::PoliticalColor => Bucketing {
            mode,
            legend: None,
            entries: view
                .iter()
                .map(|&r| Bucketed {
                    record: r,
                    tier: None,
                    color: political_color_hex(&r.political_color),
                })
                .collect(),
        },
    }
}
