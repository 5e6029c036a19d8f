use commune_fees::analyzers::aggregate::{category_stats, political_stats, summary};
use commune_fees::analyzers::leaderboard::leaderboards;
use commune_fees::bucket::{ColorMode, Metric, Tier, bucketize};
use commune_fees::filter::FilterSpec;
use commune_fees::markers::build_markers;
use commune_fees::normalize::normalize;
use commune_fees::output::export_csv;
use commune_fees::parser::{RawCommune, parse_rows};
use commune_fees::record::{CommuneRecord, UNCLASSIFIED};
use commune_fees::store::Dataset;
use std::path::Path;

const SAMPLE: &str = "tests/fixtures/communes_sample.csv";

fn sample() -> Dataset {
    Dataset::load(Path::new(SAMPLE)).expect("Failed to load sample dataset")
}

fn find<'a>(dataset: &'a Dataset, code: &str) -> &'a CommuneRecord {
    dataset
        .records()
        .iter()
        .find(|r| r.insee_code == code)
        .unwrap_or_else(|| panic!("missing commune {code}"))
}

fn synthetic(code: &str, population: u64, eur_per_capita: f64) -> RawCommune {
    RawCommune {
        insee_code: Some(code.to_string()),
        name: Some(format!("Commune {code}")),
        department: Some("01".to_string()),
        population: Some(population.to_string()),
        eur_per_capita: Some(eur_per_capita.to_string().replace('.', ",")),
        ..Default::default()
    }
}

#[test]
fn test_load_sample_dataset() {
    let dataset = sample();

    // 11 rows, one duplicate code
    assert_eq!(dataset.len(), 10);
    assert_eq!(find(&dataset, "13055").name, "Marseille");

    let amberieu = find(&dataset, "01004");
    assert_eq!(amberieu.population, 14514);
    assert_eq!(amberieu.representation_fee, 7257.0);
    assert_eq!(amberieu.total_charges, 18_250_400.12);
    assert_eq!(amberieu.position(), Some((45.9583, 5.3583)));

    let brest = find(&dataset, "29019");
    assert_eq!(brest.political_color, UNCLASSIFIED);
    assert_eq!(brest.representation_fee, 0.0);
    assert_eq!(brest.eur_per_capita, 0.0);
    assert_eq!(brest.fee_ratio, 0.0);

    assert_eq!(find(&dataset, "33063").political_color, UNCLASSIFIED);
    assert_eq!(find(&dataset, "33063").charges_exceptional, 0.0);
    assert_eq!(find(&dataset, "69123").position(), None);
    assert_eq!(find(&dataset, "2A004").latitude, None);

    let departments = dataset.departments();
    assert_eq!(departments.first(), Some(&"01"));
    assert!(departments.contains(&"2A"));
}

#[test]
fn test_rows_without_code_survive_loading() {
    let data = "insee_code;name;population\n;Alpha;10\n;Beta;20\n01;Gamma;5\n";
    let records = normalize(parse_rows(data.as_bytes()).unwrap());

    let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Beta", "Gamma"]);
}

#[test]
fn test_filter_bucket_end_to_end() {
    let records = normalize(vec![
        synthetic("A", 100, 0.5),
        synthetic("B", 5000, 10.0),
        synthetic("C", 200_000, 3.0),
    ]);
    let dataset = Dataset::from_records(records, "synthetic");

    let view = FilterSpec::new()
        .with_population_range(150, 300_000)
        .apply(dataset.records());
    let codes: Vec<_> = view.iter().map(|r| r.insee_code.as_str()).collect();
    assert_eq!(codes, vec!["B", "C"]);

    // cap = p95 of {10, 3} = 9.65
    let bucketing = bucketize(&view, ColorMode::Metric(Metric::EurPerCapita));
    let legend = bucketing.legend.expect("metric mode has a legend");
    assert!((legend.cap - 9.65).abs() < 1e-9);
    assert_eq!(bucketing.entries[0].tier, Some(Tier::High));
    assert_eq!(bucketing.entries[1].tier, Some(Tier::Low));

    // the canonical collection is untouched by filtering
    assert_eq!(dataset.len(), 3);
}

#[test]
fn test_export_reloads_to_same_records() {
    let dataset = sample();
    let view = dataset.view();

    let mut buf = Vec::new();
    export_csv(&view, &mut buf).unwrap();
    let reloaded = normalize(parse_rows(buf.as_slice()).unwrap());

    assert_eq!(reloaded.as_slice(), dataset.records());
}

#[test]
fn test_leaderboards_are_subsets_of_the_view() {
    let dataset = sample();
    let view = FilterSpec::new()
        .with_population_range(500, u64::MAX)
        .apply(dataset.records());

    let boards = leaderboards(&view, 3);
    for entry in boards
        .top_eur_per_capita
        .iter()
        .chain(&boards.zero_fee_by_population)
        .chain(&boards.top_fee_ratio)
    {
        assert!(view.iter().any(|r| std::ptr::eq(*r, *entry)));
    }

    assert_eq!(boards.top_eur_per_capita.len(), 3);
    assert_eq!(boards.zero_fee_by_population[0].insee_code, "75056");
    assert!(boards.top_fee_ratio.iter().all(|r| r.fee_ratio > 0.0));
}

#[test]
fn test_markers_skip_invalid_positions_but_tables_keep_them() {
    let dataset = sample();
    let view = dataset.view();

    let markers = build_markers(&bucketize(&view, ColorMode::PoliticalColor));
    assert_eq!(markers.len(), 8);
    assert!(markers.iter().all(|m| m.insee_code != "69123"));
    assert!(markers.iter().all(|m| m.insee_code != "2A004"));

    let total: usize = category_stats(&view).iter().map(|c| c.count).sum();
    assert_eq!(total, view.len());
    let political: usize = political_stats(&view).iter().map(|p| p.count).sum();
    assert_eq!(political, view.len());
    assert_eq!(summary(&view).communes, view.len());
}
