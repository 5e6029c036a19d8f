//! CLI entry point for the commune representation-fee explorer.
//!
//! Loads the dataset once, applies the shared filter options, and prints the
//! requested view (statistics, table, map markers, leaderboards) as JSON or
//! writes the semicolon export.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use commune_fees::{
    analyzers::{
        aggregate::{budget_summary, charge_breakdown, stats_report, summary},
        leaderboard::{SortKey, leaderboards, sort_view},
    },
    bucket::{ColorMode, Metric, bucketize},
    filter::{ALL_DEPARTMENTS, FilterSpec},
    markers::build_markers,
    output::{export_to_path, format_number, format_stat, write_json},
    record::{CommuneRecord, PopulationCategory},
    store,
};
use serde::Serialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEFAULT_DATA_PATH: &str = "data/donnees_analyse.csv";

#[derive(Parser)]
#[command(name = "commune_fees")]
#[command(about = "Explore mayors' representation fees per commune", long_about = None)]
struct Cli {
    /// Dataset to load (overrides COMMUNE_DATA_PATH)
    #[arg(long, global = true, value_name = "CSV")]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Headline and budget figures for the selection
    Summary {
        #[command(flatten)]
        filters: FilterArgs,

        /// Number of communes in the charge breakdown
        #[arg(long, default_value_t = 10)]
        breakdown: usize,
    },
    /// Category and political statistics for the selection
    Stats {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Sorted table of the selection
    Table {
        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long, value_enum, default_value_t = SortArg::EurPerCapita)]
        sort: SortArg,

        /// Sort ascending instead of descending
        #[arg(long, default_value_t = false)]
        ascending: bool,
    },
    /// Map markers coloured by a metric or political colour
    Map {
        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long, value_enum, default_value_t = ColorArg::EurPerCapita)]
        color_by: ColorArg,
    },
    /// Top-N leaderboards
    Leaderboard {
        #[command(flatten)]
        filters: FilterArgs,

        #[arg(short = 'n', long, default_value_t = 20)]
        top: usize,
    },
    /// Write the selection as semicolon-delimited text
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        #[arg(short, long, default_value = "frais_representation_filtrees.csv")]
        output: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
struct FilterArgs {
    /// Department code, or "All"
    #[arg(long, default_value = ALL_DEPARTMENTS)]
    department: String,

    #[arg(long)]
    min_population: Option<u64>,
    #[arg(long)]
    max_population: Option<u64>,

    #[arg(long)]
    min_eur_per_capita: Option<f64>,
    #[arg(long)]
    max_eur_per_capita: Option<f64>,

    /// Political colour to keep (repeatable); all when omitted
    #[arg(long = "political-color")]
    political_colors: Vec<String>,

    /// Case-insensitive substring of the commune name
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    min_fee: Option<f64>,
    #[arg(long)]
    max_fee: Option<f64>,

    #[arg(long)]
    min_ratio: Option<f64>,
    #[arg(long)]
    max_ratio: Option<f64>,

    /// Population category label, e.g. "500-2000"
    #[arg(long, value_parser = parse_category)]
    category: Option<PopulationCategory>,
}

fn parse_category(label: &str) -> Result<PopulationCategory, String> {
    PopulationCategory::from_label(label).ok_or_else(|| {
        let labels: Vec<_> = PopulationCategory::ALL.iter().map(|c| c.label()).collect();
        format!("expected one of: {}", labels.join(", "))
    })
}

fn bounds<T: Copy>(min: Option<T>, max: Option<T>, lowest: T, highest: T) -> Option<(T, T)> {
    (min.is_some() || max.is_some()).then(|| (min.unwrap_or(lowest), max.unwrap_or(highest)))
}

impl FilterArgs {
    fn to_spec(&self) -> FilterSpec {
        let mut spec = FilterSpec::new().with_department(&self.department);
        spec.population_range = bounds(self.min_population, self.max_population, 0, u64::MAX);
        spec.eur_per_capita_range =
            bounds(self.min_eur_per_capita, self.max_eur_per_capita, 0.0, f64::INFINITY);
        spec.fee_range = bounds(self.min_fee, self.max_fee, 0.0, f64::INFINITY);
        spec.ratio_range = bounds(self.min_ratio, self.max_ratio, 0.0, f64::INFINITY);
        if !self.political_colors.is_empty() {
            spec = spec.with_political_colors(self.political_colors.iter().cloned());
        }
        if let Some(name) = &self.name {
            spec = spec.with_name_substring(name);
        }
        spec.population_category = self.category;
        spec
    }
}

#[derive(Copy, Clone, ValueEnum)]
enum SortArg {
    EurPerCapita,
    RepresentationFee,
    Population,
    Name,
    TotalCharges,
    ChargesPersonnel,
    FeeRatio,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::EurPerCapita => SortKey::EurPerCapita,
            SortArg::RepresentationFee => SortKey::RepresentationFee,
            SortArg::Population => SortKey::Population,
            SortArg::Name => SortKey::Name,
            SortArg::TotalCharges => SortKey::TotalCharges,
            SortArg::ChargesPersonnel => SortKey::ChargesPersonnel,
            SortArg::FeeRatio => SortKey::FeeRatio,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
enum ColorArg {
    EurPerCapita,
    RepresentationFee,
    FeeRatio,
    PoliticalColor,
}

impl From<ColorArg> for ColorMode {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::EurPerCapita => ColorMode::Metric(Metric::EurPerCapita),
            ColorArg::RepresentationFee => ColorMode::Metric(Metric::RepresentationFee),
            ColorArg::FeeRatio => ColorMode::Metric(Metric::FeeRatio),
            ColorArg::PoliticalColor => ColorMode::PoliticalColor,
        }
    }
}

/// Display row of the table command.
#[derive(Serialize)]
struct TableRow<'a> {
    insee_code: &'a str,
    name: &'a str,
    department: &'a str,
    population: String,
    representation_fee: String,
    eur_per_capita: String,
    political_color: &'a str,
    total_charges: String,
    charges_personnel: String,
    fee_ratio: String,
}

impl<'a> From<&'a CommuneRecord> for TableRow<'a> {
    fn from(r: &'a CommuneRecord) -> Self {
        TableRow {
            insee_code: &r.insee_code,
            name: &r.name,
            department: &r.department,
            population: format_number(r.population as f64, 0),
            representation_fee: format_number(r.representation_fee, 2),
            eur_per_capita: format_number(r.eur_per_capita, 2),
            political_color: &r.political_color,
            total_charges: format_number(r.total_charges, 0),
            charges_personnel: format_number(r.charges_personnel, 0),
            fee_ratio: format_number(r.fee_ratio, 3),
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/commune_fees.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("commune_fees.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let data_path = cli
        .data
        .or_else(|| std::env::var_os("COMMUNE_DATA_PATH").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
    let dataset = store::init(&data_path)
        .with_context(|| format!("could not load dataset from {}", data_path.display()))?;

    info!(
        communes = dataset.len(),
        departments = dataset.departments().len(),
        political_colors = dataset.political_colors().len(),
        "Dataset ready"
    );

    match cli.command {
        Commands::Summary { filters, breakdown } => {
            let view = filters.to_spec().apply(dataset.records());
            let headline = summary(&view);
            info!(
                communes = %format_number(headline.communes as f64, 0),
                total_fee = %format_number(headline.total_fee, 0),
                mean_eur_per_capita = %format_stat(headline.mean_eur_per_capita, 2),
                median_eur_per_capita = %format_stat(headline.median_eur_per_capita, 2),
                "Selection summary"
            );
            write_json(&serde_json::json!({
                "summary": headline,
                "budget": budget_summary(&view),
                "charge_breakdown": charge_breakdown(&view, breakdown),
            }))?;
        }
        Commands::Stats { filters } => {
            let view = filters.to_spec().apply(dataset.records());
            write_json(&stats_report(&view))?;
        }
        Commands::Table {
            filters,
            sort,
            ascending,
        } => {
            let view = filters.to_spec().apply(dataset.records());
            let sorted = sort_view(&view, sort.into(), !ascending);
            info!(rows = sorted.len(), "Table rows");
            let rows: Vec<TableRow> = sorted.into_iter().map(TableRow::from).collect();
            write_json(&rows)?;
        }
        Commands::Map { filters, color_by } => {
            let view = filters.to_spec().apply(dataset.records());
            let bucketing = bucketize(&view, color_by.into());
            let markers = build_markers(&bucketing);
            info!(
                communes = view.len(),
                markers = markers.len(),
                skipped = view.len() - markers.len(),
                "Map markers built"
            );
            write_json(&serde_json::json!({
                "legend": bucketing.legend,
                "markers": markers,
            }))?;
        }
        Commands::Leaderboard { filters, top } => {
            let view = filters.to_spec().apply(dataset.records());
            write_json(&leaderboards(&view, top))?;
        }
        Commands::Export { filters, output } => {
            let view = filters.to_spec().apply(dataset.records());
            export_to_path(&view, &output)?;
        }
    }

    Ok(())
}
