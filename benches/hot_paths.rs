use aldeias_tui::binder::{Catalog, StaleStatePolicy, ViewBinder};
use aldeias_tui::data::{Dataset, Locality};
use aldeias_tui::filter::{aggregate, filter_aggregate, filter_localities, Choice};
use aldeias_tui::map::{AltitudeBands, MapRenderer, Viewport};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

const REGIONS: [(&str, &str, &[&str]); 5] = [
    ("Norte", "N", &["AC", "AM", "AP", "PA", "RO", "RR", "TO"]),
    ("Nordeste", "NE", &["AL", "BA", "CE", "MA", "PB", "PE", "PI", "RN", "SE"]),
    ("Centro-Oeste", "CO", &["DF", "GO", "MS", "MT"]),
    ("Sudeste", "SE", &["ES", "MG", "RJ", "SP"]),
    ("Sul", "S", &["PR", "RS", "SC"]),
];

/// Deterministic table shaped like the full village dataset
fn synthetic_localities(n: usize) -> Vec<Locality> {
    (0..n)
        .map(|i| {
            let (region, code, states) = REGIONS[i % REGIONS.len()];
            let state = states[(i / REGIONS.len()) % states.len()];
            Locality {
                id: i.to_string(),
                name: format!("ALDEIA {}", i),
                lat: -33.0 + (i * 7 % 380) as f64 / 10.0,
                lon: -73.0 + (i * 13 % 380) as f64 / 10.0,
                alt: (i * 37 % 900) as f64,
                state_name: state.to_string(),
                state: state.to_string(),
                region: region.to_string(),
                region_code: code.to_string(),
            }
        })
        .collect()
}

fn bench_filter(c: &mut Criterion) {
    let data = synthetic_localities(5_000);
    let counts = aggregate(&data);
    let regions = Choice::from_selection(["Norte", "Sul"]);
    let states = Choice::from_selection(["AM", "PA", "RS"]);

    c.bench_function("filter_localities", |b| {
        b.iter(|| filter_localities(black_box(&data), &regions, &states))
    });
    c.bench_function("aggregate", |b| b.iter(|| aggregate(black_box(&data))));
    c.bench_function("filter_aggregate", |b| {
        b.iter(|| filter_aggregate(black_box(&counts), &regions, &states))
    });
}

fn bench_binder(c: &mut Criterion) {
    let catalog = Arc::new(Catalog::new(Dataset::new(synthetic_localities(5_000))));
    let mut binder = ViewBinder::new(catalog, StaleStatePolicy::Prune);

    c.bench_function("region_then_state_change", |b| {
        b.iter(|| {
            binder.region_selection_changed(black_box(["Nordeste"]));
            binder.state_selection_changed(black_box(["BA", "PE"]))
        })
    });
}

fn bench_render(c: &mut Criterion) {
    let data = synthetic_localities(5_000);
    let renderer = MapRenderer::new(AltitudeBands::new(Some((0.0, 900.0))));
    let viewport = Viewport::fit((-73.9, -33.7, -34.8, 5.2), 200, 160);

    c.bench_function("render_map", |b| {
        b.iter(|| renderer.render(black_box(&data), Some(10), 100, 40, &viewport))
    });
}

criterion_group!(benches, bench_filter, bench_binder, bench_render);
criterion_main!(benches);
