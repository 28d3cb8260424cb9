//! Criterion benchmarks for catalog scoring.
//!
//! - Single product, population weighted
//! - Full catalog (13 products), parallel, cold cache
//! - Full catalog, warm cache

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use product_fit_scorer::{
    compute_attach, defaults::default_current_mix, AppState, CatalogScorer, CountryTotals, Region, SegmentMix,
};

fn weighted_state() -> AppState {
    let mut state = AppState::new();
    let totals: CountryTotals = Region::ALL
        .iter()
        .enumerate()
        .map(|(i, &region)| (region, 1_000 + 250 * i as u64))
        .collect();
    state.set_current_mix_with_totals(default_current_mix(), totals);

    for (i, product) in state.products.iter_mut().enumerate() {
        let base = 10.0 + 5.0 * i as f64;
        product.fit_by_segment = SegmentMix::new(base, base + 5.0, base - 5.0, base + 10.0, base);
    }
    state
}

fn bench_single_product(c: &mut Criterion) {
    let state = weighted_state();
    let product = &state.products[4];

    c.bench_function("compute_attach_weighted", |b| {
        b.iter(|| {
            compute_attach(
                black_box(product),
                black_box(&state.new_mix),
                Some(&state.country_totals),
                Some(&state.current_mix),
            )
        })
    });
}

fn bench_catalog(c: &mut Criterion) {
    let state = weighted_state();

    c.bench_function("score_all_cold_cache", |b| {
        b.iter(|| {
            let scorer = CatalogScorer::default();
            scorer.score_all(black_box(&state))
        })
    });

    let warm = CatalogScorer::default();
    warm.score_all(&state);
    c.bench_function("score_all_warm_cache", |b| b.iter(|| warm.score_all(black_box(&state))));
}

criterion_group!(benches, bench_single_product, bench_catalog);
criterion_main!(benches);
