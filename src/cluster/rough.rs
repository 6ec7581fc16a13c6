//! Tolerance rough-set clustering.
//!
//! ```text
//! documents ─► term vectors ─► tolerance space ─► seeds ─► upper approximations
//!                                                                 │
//!          ClusteringResult ◄─ labels ◄─ rank ◄─ merge ◄─ candidates
//! ```
//!
//! # Parameters
//!
//! | Parameter | Effect |
//! |-----------|--------|
//! | τ | Lower: larger tolerance classes, broader topics |
//! | μ_min | Lower: more documents per cluster, fewer in the residual |
//! | θ_merge | Lower: more merging, fewer and larger clusters |
//!
//! A run is a pure function of the documents and the configuration; the only
//! shared state it touches is the term registry. Runs on separate threads
//! share one [`TolerantClusterer`].

use super::merge::{candidates, merge, MergeParams};
use super::rank::rank;
use super::result::{Cluster, ClusterKind, ClusteringResult, Member};
use super::traits::DocumentClustering;
use crate::config::ClusteringConfig;
use crate::error::{Error, Result};
use crate::label::{ClusterLabeler, CohesionLabeler};
use crate::text::{Corpus, Document, Preprocessor, RawDocument, TermRegistry, TermVectorExtractor};
use crate::tolerance::{approximate_seeds, membership, select_seeds, ToleranceSpace};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Shared flag that abandons a running clustering.
///
/// Clones observe the same flag. The run checks it between phases and
/// between merges and fails with [`Error::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// A flag that is not raised.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether the flag is raised.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Tolerance rough-set document clusterer.
#[derive(Clone)]
pub struct TolerantClusterer {
    config: ClusteringConfig,
    registry: Option<Arc<TermRegistry>>,
    labeler: Arc<dyn ClusterLabeler>,
}

impl TolerantClusterer {
    /// Create a clusterer.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if any configuration value is out of range.
    pub fn new(config: ClusteringConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry: None,
            labeler: Arc::new(CohesionLabeler::new()),
        })
    }

    /// Intern terms in `registry` instead of the process-wide one.
    pub fn with_registry(mut self, registry: Arc<TermRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Use a custom labeling strategy.
    pub fn with_labeler<L: ClusterLabeler + 'static>(mut self, labeler: L) -> Self {
        self.labeler = Arc::new(labeler);
        self
    }

    /// The configuration snapshot used for every run.
    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    /// Registry used to intern terms and resolve labels.
    pub fn registry(&self) -> &TermRegistry {
        self.registry.as_deref().unwrap_or_else(|| TermRegistry::global())
    }

    /// Cluster `documents`.
    pub fn cluster(&self, documents: &[Document]) -> Result<ClusteringResult> {
        self.cluster_with_cancel(documents, &CancelFlag::new())
    }

    /// Tokenize `raw` with `preprocessor`, then cluster.
    ///
    /// Pooled analyzers are back in their pools before clustering starts.
    pub fn cluster_raw(
        &self,
        raw: &[RawDocument],
        preprocessor: &Preprocessor,
    ) -> Result<ClusteringResult> {
        let documents = preprocessor.prepare(raw)?;
        self.cluster(&documents)
    }

    /// Cluster `documents`, giving up with [`Error::Cancelled`] once `cancel`
    /// is raised.
    pub fn cluster_with_cancel(
        &self,
        documents: &[Document],
        cancel: &CancelFlag,
    ) -> Result<ClusteringResult> {
        let start = Instant::now();
        let config = &self.config;
        let registry = self.registry();

        if documents.is_empty() {
            info!(documents = 0, clusters = 0, residual = 0, "clustered documents");
            return Ok(ClusteringResult::empty());
        }

        let corpus = TermVectorExtractor::new(config.weighting)
            .with_max_word_df(config.max_word_df)
            .extract(documents, registry);
        cancel.checkpoint()?;

        let space = ToleranceSpace::build(&corpus, config.tolerance_threshold, &config.similarity)?;
        cancel.checkpoint()?;

        let seeds = select_seeds(&space, &corpus, &config.seeds);
        let approximations = approximate_seeds(&space, &corpus, &seeds, config.min_membership);
        cancel.checkpoint()?;

        let initial = candidates(&seeds, approximations, config.min_cluster_size);
        debug!(
            seeds = seeds.len(),
            candidates = initial.len(),
            min_cluster_size = config.min_cluster_size,
            "built cluster candidates"
        );

        let params = MergeParams {
            threshold: config.merge_threshold,
            min_membership: config.min_membership,
        };
        let (merged, merges) = merge(&space, &corpus, initial, params, cancel)?;

        let mut clusters: Vec<Cluster> = rank(merged)
            .into_iter()
            .map(|(candidate, score)| Cluster {
                kind: ClusterKind::Topic,
                members: candidate
                    .approximation
                    .members
                    .iter()
                    .map(|&(position, membership)| Member {
                        document: corpus.id(position),
                        position,
                        membership,
                    })
                    .collect(),
                seeds: candidate.seeds,
                class: candidate.approximation.class,
                cohesion: score.cohesion,
                score: score.score,
                labels: Vec::new(),
                label: String::new(),
            })
            .collect();
        cancel.checkpoint()?;

        for cluster in &mut clusters {
            cluster.labels = self
                .labeler
                .label(cluster, &corpus, registry, config.max_labels);
            cluster.label = cluster
                .label_terms(registry)
                .iter()
                .map(|t| t.as_ref())
                .collect::<Vec<_>>()
                .join(", ");
        }

        let other_topics = Cluster::other_topics(residual(&corpus, &clusters));

        info!(
            documents = documents.len(),
            malformed = corpus.malformed().len(),
            vocabulary = space.term_count(),
            clusters = clusters.len(),
            residual = other_topics.len(),
            merges = merges.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "clustered documents"
        );

        Ok(ClusteringResult {
            clusters,
            other_topics,
            merges,
        })
    }
}

impl DocumentClustering for TolerantClusterer {
    fn cluster(&self, documents: &[Document]) -> Result<ClusteringResult> {
        TolerantClusterer::cluster(self, documents)
    }
}

impl std::fmt::Debug for TolerantClusterer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TolerantClusterer")
            .field("config", &self.config)
            .field("shared_registry", &self.registry.is_none())
            .finish_non_exhaustive()
    }
}

/// Documents covered by no topic, with their best membership in any topic.
fn residual(corpus: &Corpus, clusters: &[Cluster]) -> Vec<Member> {
    let mut covered = vec![false; corpus.len()];
    for pos in clusters.iter().flat_map(Cluster::positions) {
        covered[pos] = true;
    }
    covered
        .iter()
        .enumerate()
        .filter(|(_, c)| !**c)
        .map(|(position, _)| {
            let best = clusters
                .iter()
                .map(|c| membership(corpus.vector(position), &c.class))
                .fold(0.0, f64::max);
            Member {
                document: corpus.id(position),
                position,
                membership: best,
            }
        })
        .collect()
}

/// Cluster `documents` with `config`.
///
/// Shorthand for [`TolerantClusterer::new`] followed by
/// [`TolerantClusterer::cluster`].
pub fn cluster(documents: &[Document], config: &ClusteringConfig) -> Result<ClusteringResult> {
    TolerantClusterer::new(config.clone())?.cluster(documents)
}
