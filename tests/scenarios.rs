use rough::text::TermVectorExtractor;
use rough::tolerance::{approximate_seeds, select_seeds};
use rough::{
    cluster, CancelFlag, ClusteringConfig, Document, Error, PreprocessConfig, Preprocessor,
    RawDocument, SeedSelection, Similarity, TermRegistry, ToleranceSpace, TolerantClusterer,
};
use std::sync::Arc;
use std::thread;

fn clusterer(config: ClusteringConfig) -> TolerantClusterer {
    TolerantClusterer::new(config)
        .unwrap()
        .with_registry(Arc::new(TermRegistry::new()))
}

fn car_documents() -> Vec<Document> {
    vec![
        Document::from_counts(100, &[("car", 3), ("engine", 2)]),
        Document::from_counts(200, &[("car", 2), ("auto", 3)]),
        Document::from_counts(300, &[("banana", 5)]),
    ]
}

#[test]
fn car_auto_engine_banana() {
    let reg = TermRegistry::new();
    let docs = car_documents();
    let corpus = TermVectorExtractor::default().extract(&docs, &reg);
    let space = ToleranceSpace::build(&corpus, 0.5, &Similarity::GeometricMean).unwrap();
    let id = |s: &str| reg.get(s).unwrap();

    let car = space.class(id("car")).unwrap();
    let mut expected = vec![id("car"), id("engine"), id("auto")];
    expected.sort();
    assert_eq!(car.members, expected);
    assert!(!space.are_tolerant(id("engine"), id("auto")));
    assert_eq!(space.class(id("banana")).unwrap().members, vec![id("banana")]);

    let seeds = select_seeds(&space, &corpus, &SeedSelection::default());
    let approx = approximate_seeds(&space, &corpus, &seeds, 0.3);
    assert_eq!(approx[0].positions().collect::<Vec<_>>(), vec![0, 1]);

    let result = cluster(&docs, &ClusteringConfig::default()).unwrap();
    assert_eq!(result.clusters.len(), 1);
    assert_eq!(result.clusters[0].documents().collect::<Vec<_>>(), vec![100, 200]);
    assert_eq!(result.other_topics.documents().collect::<Vec<_>>(), vec![300]);
}

#[test]
fn empty_corpus_is_not_an_error() {
    let result = clusterer(ClusteringConfig::default()).cluster(&[]).unwrap();
    assert!(result.clusters.is_empty());
    assert!(result.other_topics.is_empty());
    assert_eq!(result.iter().count(), 1);
}

#[test]
fn single_document_yields_at_most_one_cluster() {
    let docs = vec![Document::from_tokens(1, ["only", "one", "document"])];
    for config in [
        ClusteringConfig::default(),
        ClusteringConfig::default()
            .with_min_cluster_size(1)
            .with_seeds(SeedSelection::all()),
    ] {
        let result = clusterer(config).cluster(&docs).unwrap();
        assert!(result.clusters.len() <= 1);
        assert_eq!(result.clusters.len() + result.other_topics.len(), 1);
    }
}

#[test]
fn tau_one_keeps_only_identical_postings() {
    let reg = TermRegistry::new();
    let docs = vec![
        Document::from_tokens(0, ["new", "york", "pizza"]),
        Document::from_tokens(1, ["new", "york", "bagel"]),
        Document::from_tokens(2, ["pizza", "oven"]),
    ];
    let corpus = TermVectorExtractor::default().extract(&docs, &reg);
    let space = ToleranceSpace::build(&corpus, 1.0, &Similarity::GeometricMean).unwrap();
    let id = |s: &str| reg.get(s).unwrap();

    assert!(space.are_tolerant(id("new"), id("york")));
    assert!(!space.are_tolerant(id("new"), id("pizza")));
    // bagel only ever appears with new/york, but new/york also appear without it.
    assert_eq!(space.class(id("bagel")).unwrap().members, vec![id("bagel")]);
    assert_eq!(space.relation_size(), 1);
}

#[test]
fn tau_one_with_disjoint_documents_gives_singletons() {
    let reg = TermRegistry::new();
    let docs = vec![
        Document::from_tokens(0, ["alpha", "beta"]),
        Document::from_tokens(1, ["alpha", "gamma"]),
        Document::from_tokens(2, ["beta", "gamma"]),
    ];
    let corpus = TermVectorExtractor::default().extract(&docs, &reg);
    let space = ToleranceSpace::build(&corpus, 1.0, &Similarity::GeometricMean).unwrap();
    assert!(space.classes().all(|c| c.len() == 1));
}

#[test]
fn clusters_overlap() {
    let docs = vec![
        Document::from_tokens(0, ["jaguar", "engine", "oil"]),
        Document::from_tokens(1, ["jaguar", "engine"]),
        Document::from_tokens(2, ["engine", "oil", "filter"]),
        Document::from_tokens(3, ["oil", "filter"]),
    ];
    let config = ClusteringConfig::default()
        .with_tolerance_threshold(0.8)
        .with_min_membership(0.3)
        .with_merge_threshold(0.9);
    let result = clusterer(config).cluster(&docs).unwrap();

    assert!(result.clusters.len() >= 2);
    let shared = docs
        .iter()
        .filter(|d| result.clusters_of(d.id).len() > 1)
        .count();
    assert!(shared > 0, "expected overlapping clusters: {result:#?}");
}

#[test]
fn identical_runs_are_identical() {
    let docs = car_documents();
    let c = clusterer(ClusteringConfig::default());
    let a = c.cluster(&docs).unwrap();
    let b = c.cluster(&docs).unwrap();
    assert_eq!(a, b);
}

#[test]
fn concurrent_runs_share_one_clusterer() {
    let c = Arc::new(clusterer(ClusteringConfig::default()));
    let expected = c.cluster(&car_documents()).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let c = Arc::clone(&c);
            thread::spawn(move || c.cluster(&car_documents()).unwrap())
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap(), expected);
    }
}

#[test]
fn concurrent_raw_runs_reuse_analyzers() {
    let pre = Arc::new(Preprocessor::new(PreprocessConfig::default()).unwrap());
    let c = Arc::new(clusterer(ClusteringConfig::default()));
    let raw = vec![
        RawDocument::new(0, "Car engines and engine oil"),
        RawDocument::new(1, "The car and the auto"),
        RawDocument::new(2, "Banana bread"),
    ];

    thread::scope(|s| {
        for _ in 0..4 {
            let (pre, c, raw) = (&pre, &c, &raw);
            s.spawn(move || {
                let result = c.cluster_raw(raw, pre).unwrap();
                assert!(result.other_topics.contains(2));
            });
        }
    });

    let pool = pre.pool("en").unwrap();
    assert_eq!(pool.in_use(), 0);
    assert!(pool.created() <= 4);
}

#[test]
fn cancellation_aborts_only_that_run() {
    let c = clusterer(ClusteringConfig::default());
    let cancel = CancelFlag::new();
    cancel.cancel();
    assert!(matches!(
        c.cluster_with_cancel(&car_documents(), &cancel),
        Err(Error::Cancelled)
    ));
    assert_eq!(c.cluster(&car_documents()).unwrap().clusters.len(), 1);
}

#[test]
fn invalid_parameters_fail_before_work() {
    for config in [
        ClusteringConfig::default().with_tolerance_threshold(0.0),
        ClusteringConfig::default().with_min_membership(1.5),
        ClusteringConfig::default().with_merge_threshold(f64::NAN),
        ClusteringConfig::default().with_max_labels(0),
    ] {
        assert!(matches!(
            TolerantClusterer::new(config),
            Err(Error::InvalidParameter { .. })
        ));
    }
}
