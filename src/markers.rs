//! Map marker descriptors built from a [`Bucketing`].
//!
//! This is the only stage allowed to drop records: anything without a valid
//! position is skipped silently. The dropped records remain in every other
//! view.

use serde::Serialize;
use tracing::debug;

use crate::bucket::{Bucketing, ColorMode, Metric, Tier};
use crate::output::format_number;
use crate::record::CommuneRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailField {
    pub label: &'static str,
    pub value: String,
}

/// One point for the map layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub insee_code: String,
    pub position: (f64, f64),
    pub color: &'static str,
    pub tier: Option<Tier>,
    pub label_text: String,
    pub detail_fields: Vec<DetailField>,
}

/// Tooltip text for a record under the given colour mode.
pub fn label_text(r: &CommuneRecord, mode: ColorMode) -> String {
    match mode {
        ColorMode::Metric(metric) => format!(
            "{}: {} {}",
            r.name,
            format_number(metric.value(r), metric.decimals()),
            metric.unit()
        ),
        ColorMode::PoliticalColor => format!("{}: {}", r.name, r.political_color),
    }
}

fn detail_fields(r: &CommuneRecord, mode: ColorMode) -> Vec<DetailField> {
    let field = |label, value| DetailField { label, value };

    let mut fields = vec![
        field("Department", r.department.clone()),
        field("Population", format_number(r.population as f64, 0)),
        field("Fee", format!("{} €", format_number(r.representation_fee, 2))),
        field("EUR/capita", format!("{} €", format_number(r.eur_per_capita, 2))),
    ];
    if matches!(mode, ColorMode::Metric(_)) {
        fields.push(field(
            "Ratio",
            format!("{} %", format_number(r.fee_ratio, Metric::FeeRatio.decimals())),
        ));
    }
    fields.push(field("Political color", r.political_color.clone()));
    fields
}

/// Builds markers for every bucketed record that has a valid position.
pub fn build_markers(bucketing: &Bucketing<'_>) -> Vec<Marker> {
    let markers: Vec<Marker> = bucketing
        .entries
        .iter()
        .filter_map(|entry| {
            let r = entry.record;
            let position = r.position()?;
            Some(Marker {
                insee_code: r.insee_code.clone(),
                position,
                color: entry.color,
                tier: entry.tier,
                label_text: label_text(r, bucketing.mode),
                detail_fields: detail_fields(r, bucketing.mode),
            })
        })
        .collect();

    debug!(
        bucketed = bucketing.entries.len(),
        markers = markers.len(),
        "Markers built"
    );
    markers
}
