use aldeias_tui::binder::{Catalog, StaleStatePolicy, ViewBinder};
use aldeias_tui::data::{Dataset, LoadError};
use aldeias_tui::filter::{aggregate, filter_localities, Choice};
use aldeias_tui::options::available_states;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/aldeias_sample.csv")
}

fn catalog() -> Arc<Catalog> {
    let dataset = Dataset::load(&sample_path(), b',').expect("sample dataset loads");
    Arc::new(Catalog::new(dataset))
}

const THREE_ROWS: &str = "\
ID,NM_LOCALID,LAT,LONG,ALT,UF,UF_SIGLA,NM_REGIAO,REGIAO_SIGLA
1,ALDEIA UM,-3.1,-60.0,40,AMAZONAS,AM,Norte,N
2,ALDEIA DOIS,-1.4,-48.5,12,PARÁ,PA,Norte,N
3,ALDEIA TRÊS,-30.0,-51.2,100,RIO GRANDE DO SUL,RS,Sul,S
";

#[test]
fn three_row_scenario() {
    let dataset = Dataset::load_from_reader(THREE_ROWS.as_bytes(), b',').unwrap();
    let catalog = Arc::new(Catalog::new(dataset));
    let mut binder = ViewBinder::new(catalog.clone(), StaleStatePolicy::Prune);

    let views = binder.region_selection_changed(["Norte"]);
    assert_eq!(views.state_options, ["AM", "PA"]);
    assert_eq!(views.localities, catalog.dataset.localities()[..2].to_vec());

    let counts = aggregate(catalog.dataset.localities());
    assert_eq!(counts.len(), 3);
    assert!(counts.iter().all(|c| c.count == 1));

    let views = binder.region_selection_changed(Vec::<String>::new());
    let views_all = binder.state_selection_changed(Vec::<String>::new());
    assert_eq!(views.localities.len(), 3);
    assert_eq!(views_all.localities, catalog.dataset.localities().to_vec());

    binder.region_selection_changed(["Sul"]);
    let views = binder.state_selection_changed(["AM"]);
    assert!(views.localities.is_empty());
    assert!(views.counts.is_empty());
}

#[test]
fn sample_counts_sum_to_rows() {
    let catalog = catalog();
    assert_eq!(catalog.dataset.len(), 25);
    let total: u64 = catalog.counts.iter().map(|c| c.count).sum();
    assert_eq!(total, 25);

    let states: BTreeSet<&str> = catalog.counts.iter().map(|c| c.state.as_str()).collect();
    assert_eq!(states.len(), catalog.counts.len(), "one aggregate row per state");
}

#[test]
fn every_region_offers_exactly_its_states() {
    let catalog = catalog();
    let localities = catalog.dataset.localities();
    for region in catalog.index.regions() {
        let expected: BTreeSet<String> = localities
            .iter()
            .filter(|l| l.region == region)
            .map(|l| l.state.clone())
            .collect();
        let offered: BTreeSet<String> =
            available_states(&catalog.index, &Choice::from_selection([region]))
                .into_iter()
                .collect();
        assert_eq!(offered, expected, "region {}", region);
    }
}

#[test]
fn default_selection_equals_selecting_everything() {
    let catalog = catalog();
    let localities = catalog.dataset.localities();
    let all_regions = Choice::from_selection(catalog.index.regions());
    let all_states = Choice::from_selection(available_states(&catalog.index, &Choice::All));

    let everything = filter_localities(localities, &all_regions, &all_states);
    let defaulted = filter_localities(localities, &Choice::All, &Choice::All);
    assert_eq!(everything, defaulted);
    assert_eq!(defaulted, localities.to_vec());
}

#[test]
fn cascade_then_state_filter() {
    let mut binder = ViewBinder::new(catalog(), StaleStatePolicy::Prune);

    let views = binder.region_selection_changed(["Norte", "Sul"]);
    assert_eq!(views.state_options, ["AC", "AM", "PA", "RR", "PR", "RS", "SC"]);
    assert_eq!(views.localities.len(), 12);

    let views = binder.state_selection_changed(["PA", "SC"]);
    assert_eq!(views.localities.len(), 4);
    let bars: Vec<(&str, u64)> = views.counts.iter().map(|c| (c.state.as_str(), c.count)).collect();
    assert_eq!(bars, [("PA", 3), ("SC", 1)]);

    let views = binder.region_selection_changed(["Sul"]);
    assert_eq!(binder.selection().states.iter().collect::<Vec<_>>(), ["SC"]);
    assert_eq!(views.localities.len(), 1);
}

#[test]
fn identical_selection_gives_identical_json() {
    let mut binder = ViewBinder::new(catalog(), StaleStatePolicy::Prune);
    binder.region_selection_changed(["Nordeste"]);
    let first = serde_json::to_vec(&binder.state_selection_changed(["BA"])).unwrap();
    binder.region_selection_changed(["Nordeste"]);
    let second = serde_json::to_vec(&binder.state_selection_changed(["BA"])).unwrap();
    assert_eq!(first, second);
}

#[test]
fn missing_dataset_is_a_load_error() {
    let err = Dataset::load(&sample_path().with_file_name("absent.csv"), b',').unwrap_err();
    assert!(matches!(err, LoadError::Open { .. }));
    assert!(err.to_string().contains("absent.csv"));
}
