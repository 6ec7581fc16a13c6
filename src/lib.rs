//! # rough
//!
//! Overlapping document clustering with tolerance rough sets.
//!
//! Terms that co-occur often enough tolerate each other; a term's tolerance
//! class stands for one loose topic. Documents are grouped by the rough-set
//! upper approximation of those classes, overlapping groups are merged, and
//! the result is ranked and labeled. Documents that fit no topic end up in a
//! residual "Other Topics" cluster.
//!
//! | Stage | Module |
//! |-------|--------|
//! | Tokenizing raw text with pooled analyzers | [`text::preprocess`], [`pool`] |
//! | Term vectors | [`text::vector`] |
//! | Tolerance relation and classes | [`tolerance::space`] |
//! | Upper approximations and seeds | [`tolerance::approximation`] |
//! | Merge and rank | [`cluster`] |
//! | Labels | [`label`] |
//!
//! ```
//! use rough::{cluster, ClusteringConfig, Document};
//!
//! let docs = vec![
//!     Document::from_tokens(0, ["rust", "cargo", "crate"]),
//!     Document::from_tokens(1, ["rust", "cargo", "borrow"]),
//!     Document::from_tokens(2, ["apple", "pear"]),
//!     Document::from_tokens(3, ["apple", "pear", "plum"]),
//! ];
//! let result = cluster(&docs, &ClusteringConfig::default())?;
//! for c in result.iter() {
//!     println!("{} {:?}", c.label, c.documents().collect::<Vec<_>>());
//! }
//! # Ok::<(), rough::Error>(())
//! ```
//!
//! The `parallel` feature (default) computes co-occurrence rows and
//! approximations with rayon. The `serde` feature derives serialization for
//! configuration and result types.

pub mod cluster;
pub mod config;
/// Error types used across `rough`.
pub mod error;
pub mod label;
pub mod pool;
pub mod text;
pub mod tolerance;

pub use cluster::{
    cluster, CancelFlag, Cluster, ClusterKind, ClusteringResult, DocumentClustering, Member,
    MergeStep, TolerantClusterer,
};
pub use config::{ClusteringConfig, SeedSelection};
pub use error::{Error, Result};
pub use label::{ClusterLabeler, CohesionLabeler};
pub use pool::{Pool, PoolConfig, Pooled};
pub use text::{
    Corpus, Document, PreprocessConfig, Preprocessor, RawDocument, TermId, TermRegistry,
    TermVector, TermWeighting, UnknownLanguage,
};
pub use tolerance::{CooccurrenceSimilarity, Similarity, ToleranceClass, ToleranceSpace};
