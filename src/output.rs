//! Display formatting, JSON printing and the semicolon export.
//!
//! Display numbers use a space as thousands separator and a comma as decimal
//! separator (`1 234 567,89`). The export keeps full precision with a decimal
//! comma so it can be loaded again by the normalizer.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::normalize::locale_number_text;
use crate::record::CommuneRecord;

/// Rendered in place of statistics that have no data.
pub const NO_DATA: &str = "no data";

/// Formats `value` with `decimals` places, grouped thousands and a decimal comma.
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return NO_DATA.to_string();
    }

    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(fixed.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(digit);
    }
    if let Some(frac) = frac_part {
        grouped.push(',');
        grouped.push_str(frac);
    }

    // no "-0,00"
    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    if value.is_sign_negative() && !is_zero {
        grouped.insert(0, '-');
    }
    grouped
}

/// Like [`format_number`], with [`NO_DATA`] for `None`.
pub fn format_stat(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| NO_DATA.to_string(), |v| format_number(v, decimals))
}

/// Writes a value as pretty-printed JSON to stdout.
pub fn write_json(value: &impl Serialize) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

/// Column order of the export, matching the canonical field names.
pub const EXPORT_COLUMNS: &[&str] = &[
    "insee_code",
    "name",
    "department",
    "population",
    "latitude",
    "longitude",
    "representation_fee",
    "eur_per_capita",
    "total_charges",
    "charges_personnel",
    "charges_purchases_services",
    "charges_financial",
    "charges_exceptional",
    "charges_other_management",
    "fee_ratio",
    "political_color",
    "population_category",
];

fn export_row(r: &CommuneRecord) -> [String; 17] {
    let opt = |v: Option<f64>| v.map(locale_number_text).unwrap_or_default();
    [
        r.insee_code.clone(),
        r.name.clone(),
        r.department.clone(),
        r.population.to_string(),
        opt(r.latitude),
        opt(r.longitude),
        locale_number_text(r.representation_fee),
        locale_number_text(r.eur_per_capita),
        locale_number_text(r.total_charges),
        locale_number_text(r.charges_personnel),
        locale_number_text(r.charges_purchases_services),
        locale_number_text(r.charges_financial),
        locale_number_text(r.charges_exceptional),
        locale_number_text(r.charges_other_management),
        locale_number_text(r.fee_ratio),
        r.political_color.clone(),
        r.population_category.label().to_string(),
    ]
}

/// Writes the view as `;`-delimited text with a header row.
pub fn export_csv<W: Write>(view: &[&CommuneRecord], writer: W) -> Result<()> {
    let mut writer = WriterBuilder::new().delimiter(b';').from_writer(writer);

    writer.write_record(EXPORT_COLUMNS)?;
    for r in view {
        writer.write_record(export_row(r))?;
    }
    writer.flush()?;

    debug!(rows = view.len(), "Export written");
    Ok(())
}

/// Creates (or truncates) `path` and writes the export into it.
pub fn export_to_path(view: &[&CommuneRecord], path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create export file {}", path.display()))?;
    export_csv(view, file)?;
    info!(path = %path.display(), rows = view.len(), "Export complete");
    Ok(())
}
