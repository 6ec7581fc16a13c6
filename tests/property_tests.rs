use proptest::prelude::*;
use rough::text::TermVectorExtractor;
use rough::tolerance::upper_approximation;
use rough::{
    ClusteringConfig, Document, Pool, PoolConfig, Similarity, TermRegistry, ToleranceSpace,
    TolerantClusterer,
};
use std::sync::Arc;

fn corpus_strategy() -> impl Strategy<Value = Vec<Vec<usize>>> {
    prop::collection::vec(prop::collection::vec(0usize..12, 0..8), 0..16)
}

fn documents(raw: &[Vec<usize>]) -> Vec<Document> {
    raw.iter()
        .enumerate()
        .map(|(i, words)| Document::from_tokens(i, words.iter().map(|w| format!("w{w}"))))
        .collect()
}

fn similarity_strategy() -> impl Strategy<Value = Similarity> {
    prop_oneof![
        Just(Similarity::GeometricMean),
        Just(Similarity::Minimum),
        Just(Similarity::HarmonicMean),
        Just(Similarity::Jaccard),
    ]
}

proptest! {
    #[test]
    fn prop_relation_reflexive_and_symmetric(
        raw in corpus_strategy(),
        tau in 0.05f64..=1.0,
        sim in similarity_strategy(),
    ) {
        let reg = TermRegistry::new();
        let corpus = TermVectorExtractor::default().extract(&documents(&raw), &reg);
        let space = ToleranceSpace::build(&corpus, tau, &sim).unwrap();

        for &a in space.terms() {
            prop_assert!(space.are_tolerant(a, a));
            for &b in space.terms() {
                prop_assert_eq!(space.are_tolerant(a, b), space.are_tolerant(b, a));
            }
        }
    }

    #[test]
    fn prop_classes_grow_as_tau_drops(
        raw in corpus_strategy(),
        low in 0.05f64..0.5,
        high in 0.5f64..=1.0,
    ) {
        let reg = TermRegistry::new();
        let corpus = TermVectorExtractor::default().extract(&documents(&raw), &reg);
        let strict = ToleranceSpace::build(&corpus, high, &Similarity::default()).unwrap();
        let loose = ToleranceSpace::build(&corpus, low, &Similarity::default()).unwrap();

        for class in strict.classes() {
            let wider = loose.class(class.term).unwrap();
            prop_assert!(class.is_subset(&wider));

            let a = upper_approximation(&strict, &corpus, class.members.clone(), 0.3);
            let b = upper_approximation(&loose, &corpus, wider.members.clone(), 0.3);
            prop_assert!(a.positions().all(|p| b.contains(p)));
        }
    }

    #[test]
    fn prop_approximation_grows_as_threshold_drops(
        raw in corpus_strategy(),
        low in 0.0f64..0.5,
        high in 0.5f64..=1.0,
    ) {
        let reg = TermRegistry::new();
        let corpus = TermVectorExtractor::default().extract(&documents(&raw), &reg);
        let space = ToleranceSpace::build(&corpus, 0.5, &Similarity::default()).unwrap();

        for class in space.classes() {
            let strict = upper_approximation(&space, &corpus, class.members.clone(), high);
            let loose = upper_approximation(&space, &corpus, class.members.clone(), low);
            prop_assert!(strict.positions().all(|p| loose.contains(p)));
            prop_assert!(loose.members.iter().all(|(_, m)| *m > 0.0 && *m <= 1.0));
        }
    }

    #[test]
    fn prop_every_document_in_topic_xor_residual(
        raw in corpus_strategy(),
        tau in 0.1f64..=1.0,
        mu in 0.0f64..=1.0,
        theta in 0.0f64..=1.0,
    ) {
        let config = ClusteringConfig::default()
            .with_tolerance_threshold(tau)
            .with_min_membership(mu)
            .with_merge_threshold(theta);
        let clusterer = TolerantClusterer::new(config)
            .unwrap()
            .with_registry(Arc::new(TermRegistry::new()));
        let docs = documents(&raw);
        let result = clusterer.cluster(&docs).unwrap();

        for doc in &docs {
            let in_topic = !result.clusters_of(doc.id).is_empty();
            let in_residual = result.other_topics.contains(doc.id);
            prop_assert!(in_topic != in_residual, "document {} topic={} residual={}", doc.id, in_topic, in_residual);
        }
        for m in &result.other_topics.members {
            prop_assert!(m.membership < mu || m.membership == 0.0, "residual {} has membership {}", m.document, m.membership);
        }
        for c in &result.clusters {
            prop_assert!(c.members.iter().all(|m| m.membership >= mu && m.membership > 0.0));
            prop_assert!(c.labels.len() <= 3);
        }
        for pair in result.clusters.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn prop_runs_are_deterministic(raw in corpus_strategy()) {
        let clusterer = TolerantClusterer::new(ClusteringConfig::default())
            .unwrap()
            .with_registry(Arc::new(TermRegistry::new()));
        let docs = documents(&raw);
        let first = clusterer.cluster(&docs).unwrap();
        let second = clusterer.cluster(&docs).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_pool_never_exceeds_bound(
        max in 1usize..5,
        ops in prop::collection::vec(any::<bool>(), 0..40),
    ) {
        let pool = Pool::new(PoolConfig::bounded(max), || Ok(Vec::<u8>::new())).unwrap();
        let mut held = Vec::new();
        for acquire in ops {
            if acquire {
                if let Some(guard) = pool.try_acquire().unwrap() {
                    held.push(guard);
                }
            } else {
                held.pop();
            }
            prop_assert!(pool.in_use() + pool.idle() <= max);
            prop_assert_eq!(pool.in_use(), held.len());
        }
        drop(held);
        prop_assert_eq!(pool.in_use(), 0);
    }
}
