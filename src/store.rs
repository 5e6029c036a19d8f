//! Load-once dataset store.
//!
//! The canonical collection is read and normalized a single time per process
//! and then shared read-only. There is no reload or mutation API.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::normalize::normalize;
use crate::parser::read_rows;
use crate::record::CommuneRecord;

static DATASET: OnceLock<Dataset> = OnceLock::new();

/// The immutable canonical collection plus load metadata.
#[derive(Debug)]
pub struct Dataset {
    records: Vec<CommuneRecord>,
    source: PathBuf,
    loaded_at: DateTime<Utc>,
}

impl Dataset {
    pub fn from_records(records: Vec<CommuneRecord>, source: impl Into<PathBuf>) -> Self {
        Self {
            records,
            source: source.into(),
            loaded_at: Utc::now(),
        }
    }

    /// Reads and normalizes the file at `path`.
    #[tracing::instrument(skip(path), fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let rows = read_rows(path)?;
        let row_count = rows.len();
        let records = normalize(rows);
        info!(rows = row_count, records = records.len(), "Dataset loaded");
        Ok(Self::from_records(records, path))
    }

    pub fn records(&self) -> &[CommuneRecord] {
        &self.records
    }

    /// Borrowed view over every record, the starting point for filtering.
    pub fn view(&self) -> Vec<&CommuneRecord> {
        self.records.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Distinct department codes, sorted.
    pub fn departments(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.department.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct political labels in first-seen order.
    pub fn political_colors(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for r in &self.records {
            if !labels.contains(&r.political_color.as_str()) {
                labels.push(&r.political_color);
            }
        }
        labels
    }

    pub fn max_population(&self) -> u64 {
        self.records.iter().map(|r| r.population).max().unwrap_or(0)
    }

    pub fn max_eur_per_capita(&self) -> f64 {
        self.max_of(|r| r.eur_per_capita)
    }

    pub fn max_representation_fee(&self) -> f64 {
        self.max_of(|r| r.representation_fee)
    }

    pub fn max_fee_ratio(&self) -> f64 {
        self.max_of(|r| r.fee_ratio)
    }

    fn max_of(&self, f: impl Fn(&CommuneRecord) -> f64) -> f64 {
        self.records.iter().map(f).fold(0.0, f64::max)
    }
}

/// Loads the process-wide dataset on first call and returns the cached one afterwards.
///
/// Later calls ignore `path`; a differing path is logged.
pub fn init(path: &Path) -> Result<&'static Dataset> {
    if let Some(existing) = DATASET.get() {
        if existing.source() != path {
            warn!(
                cached = %existing.source().display(),
                requested = %path.display(),
                "Dataset already loaded, ignoring new path"
            );
        }
        return Ok(existing);
    }

    let loaded = Dataset::load(path)?;
    Ok(DATASET.get_or_init(|| loaded))
}

/// The cached dataset, if [`init`] has succeeded.
pub fn get() -> Option<&'static Dataset> {
    DATASET.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::commune;
    use std::io::Write;

    #[test]
    fn test_load_reads_and_normalizes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "CODE_COMMUNE,NOM_COMMUNE,DEPARTEMENT,POP_2022,COUL_POL").unwrap();
        writeln!(file, "13055,Marseille,13,\"873 076\",#N/D").unwrap();
        writeln!(file, "01001,L'Abergement,01,800,Droite").unwrap();

        let dataset = Dataset::load(file.path()).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[0].population, 873076);
        assert_eq!(dataset.departments(), vec!["01", "13"]);
        assert_eq!(dataset.political_colors(), vec!["Unclassified", "Droite"]);
        assert_eq!(dataset.max_population(), 873076);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        assert!(Dataset::load(Path::new("/nonexistent/data.csv")).is_err());
    }

    #[test]
    fn test_init_loads_once() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "insee_code;name;population").unwrap();
        writeln!(file, "75056;Paris;2133111").unwrap();

        let first = init(file.path()).unwrap();
        let second = init(Path::new("/nonexistent/other.csv")).unwrap();

        assert!(std::ptr::eq(first, second));
        assert!(std::ptr::eq(get().unwrap(), first));
    }

    #[test]
    fn test_maxima_on_empty_dataset() {
        let dataset = Dataset::from_records(vec![], "memory");
        assert!(dataset.is_empty());
        assert_eq!(dataset.max_population(), 0);
        assert_eq!(dataset.max_fee_ratio(), 0.0);
        assert!(dataset.departments().is_empty());
    }

    #[test]
    fn test_view_borrows_every_record() {
        let mut b = commune("2", "B", 20, 3.5);
        b.representation_fee = 1250.0;
        b.fee_ratio = 0.04;
        let dataset = Dataset::from_records(vec![commune("1", "A", 10, 1.0), b], "memory");
        assert_eq!(dataset.view().len(), 2);
        assert_eq!(dataset.max_eur_per_capita(), 3.5);
        assert_eq!(dataset.max_representation_fee(), 1250.0);
        assert_eq!(dataset.max_fee_ratio(), 0.04);
    }
}
