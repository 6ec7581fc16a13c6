//! Cluster a handful of search-result snippets for the query "jaguar".
//!
//! Run with `RUST_LOG=rough=debug cargo run --example search_results` to see
//! the per-phase events.

use rough::{
    ClusteringConfig, PreprocessConfig, Preprocessor, RawDocument, Result, TolerantClusterer,
};
use tracing_subscriber::EnvFilter;

const SNIPPETS: &[&str] = &[
    "Jaguar cars: luxury sedans and sports cars with powerful engines",
    "New Jaguar sports car engine delivers more power",
    "Used Jaguar cars for sale, compare engine and price",
    "The jaguar is a big cat native to the Americas, living in rainforest habitats",
    "Jaguar cat facts: diet, rainforest habitat and conservation",
    "Big cat conservation: protecting the jaguar habitat",
    "Jacksonville Jaguars football team schedule and roster",
    "Jaguars football game recap: team wins at home",
    "Mac OS X Jaguar release notes",
];

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let raw: Vec<RawDocument> = SNIPPETS
        .iter()
        .enumerate()
        .map(|(i, s)| RawDocument::new(i, *s).with_language("en"))
        .collect();

    let preprocessor = Preprocessor::new(PreprocessConfig::default())?;
    let clusterer = TolerantClusterer::new(
        ClusteringConfig::default()
            .with_tolerance_threshold(0.4)
            .with_min_membership(0.25),
    )?;

    let result = clusterer.cluster_raw(&raw, &preprocessor)?;

    for cluster in result.iter() {
        println!(
            "[{}] score={:.2} cohesion={:.2}",
            cluster.label, cluster.score, cluster.cohesion
        );
        for member in &cluster.members {
            println!("    {:.2}  {}", member.membership, SNIPPETS[member.position]);
        }
    }
    println!("{} merges", result.merges.len());
    Ok(())
}
