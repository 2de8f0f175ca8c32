//! Benchmarks for catalog retrieval
//!
//! Run with: cargo bench --package agents
//!
//! Scoring is measured against a synthetically grown catalog so the parallel
//! scan has enough work to be representative.

use agents::RetrievalUnit;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::{sample_catalog, CatalogIndex, Product};
use std::sync::Arc;

fn grown_catalog(copies: usize) -> Arc<CatalogIndex> {
    let sample = sample_catalog();
    let mut index = CatalogIndex::new();
    for copy in 0..copies {
        for product in sample.products() {
            index.insert_product(Product {
                id: format!("{}-{copy}", product.id),
                ..product.clone()
            });
        }
    }
    Arc::new(index)
}

fn bench_retrieve(c: &mut Criterion) {
    let unit = RetrievalUnit::new(grown_catalog(1_000));

    c.bench_function("retrieve_top_3", |b| {
        b.iter(|| {
            let results = unit.retrieve(black_box("gaming laptop"), black_box(3));
            black_box(results)
        })
    });
}

fn bench_retrieve_no_match(c: &mut Criterion) {
    let unit = RetrievalUnit::new(grown_catalog(1_000));

    c.bench_function("retrieve_no_match", |b| {
        b.iter(|| {
            let results = unit.retrieve(black_box("submarine periscope"), black_box(3));
            black_box(results)
        })
    });
}

criterion_group!(benches, bench_retrieve, bench_retrieve_no_match);
criterion_main!(benches);
