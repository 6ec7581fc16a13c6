use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::prelude::*;
use rough::text::TermVectorExtractor;
use rough::{ClusteringConfig, Document, Similarity, TermRegistry, ToleranceSpace, TolerantClusterer};
use std::sync::Arc;

/// Snippet-like documents drawn from a few overlapping topic vocabularies.
fn synthetic_documents(n: usize, seed: u64) -> Vec<Document> {
    let mut rng = StdRng::seed_from_u64(seed);
    let topics = 8;
    let words_per_topic = 40;
    (0..n)
        .map(|i| {
            let topic = rng.random_range(0..topics);
            let len = rng.random_range(6..20);
            let tokens: Vec<String> = (0..len)
                .map(|_| {
                    let t = if rng.random::<f64>() < 0.8 {
                        topic
                    } else {
                        rng.random_range(0..topics)
                    };
                    format!("t{t}w{}", rng.random_range(0..words_per_topic))
                })
                .collect();
            Document::from_tokens(i, tokens)
        })
        .collect()
}

fn bench_tolerance_space(c: &mut Criterion) {
    let mut group = c.benchmark_group("tolerance_space");
    let docs = synthetic_documents(500, 42);
    let reg = TermRegistry::new();
    let corpus = TermVectorExtractor::default().extract(&docs, &reg);

    group.bench_function("build_n500_tau0.3", |b| {
        b.iter(|| ToleranceSpace::build(black_box(&corpus), 0.3, &Similarity::GeometricMean).unwrap())
    });

    group.finish();
}

fn bench_cluster(c: &mut Criterion) {
    let mut group = c.benchmark_group("cluster");

    for n in [100, 500] {
        let docs = synthetic_documents(n, 7);
        let clusterer = TolerantClusterer::new(ClusteringConfig::default().with_tolerance_threshold(0.3))
            .unwrap()
            .with_registry(Arc::new(TermRegistry::new()));
        group.bench_function(format!("cluster_n{n}"), |b| {
            b.iter(|| clusterer.cluster(black_box(&docs)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tolerance_space, bench_cluster);
criterion_main!(benches);
