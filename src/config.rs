//! Clustering parameters.
//!
//! A [`ClusteringConfig`] is an immutable snapshot for one run. Every field
//! has a range predicate in [`ClusteringConfig::validate`]; out-of-range
//! values are rejected before any computation starts, never clamped.
//!
//! | Parameter | Symbol | Range | Default |
//! |-----------|--------|-------|---------|
//! | `tolerance_threshold` | τ | (0, 1] | 0.5 |
//! | `min_membership` | μ_min | [0, 1] | 0.3 |
//! | `merge_threshold` | θ_merge | [0, 1] | 0.5 |
//! | `max_word_df` | | (0, 1] | 1.0 |
//! | `min_cluster_size` | | ≥ 1 | 2 |
//! | `max_labels` | N | ≥ 1 | 3 |

use crate::error::{Error, Result};
use crate::text::TermWeighting;
use crate::tolerance::Similarity;

/// Which terms seed cluster candidates.
///
/// Computing an upper approximation for every vocabulary term is wasteful on
/// large corpora and yields many near-empty candidates; seeds are filtered by
/// document frequency and ranked by aggregate corpus weight.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeedSelection {
    /// Seeds must occur in at least this many documents.
    pub min_document_frequency: usize,
    /// Seeds must occur in at most this fraction of documents.
    pub max_document_frequency: f64,
    /// Keep only the top-K seeds by aggregate weight. `None` keeps all.
    pub max_seeds: Option<usize>,
}

impl Default for SeedSelection {
    fn default() -> Self {
        Self {
            min_document_frequency: 2,
            max_document_frequency: 1.0,
            max_seeds: Some(32),
        }
    }
}

impl SeedSelection {
    /// Consider every term as a seed.
    pub fn all() -> Self {
        Self {
            min_document_frequency: 1,
            max_document_frequency: 1.0,
            max_seeds: None,
        }
    }

    /// Set the minimum document frequency.
    pub fn with_min_document_frequency(mut self, df: usize) -> Self {
        self.min_document_frequency = df;
        self
    }

    /// Set the maximum document frequency ratio.
    pub fn with_max_document_frequency(mut self, ratio: f64) -> Self {
        self.max_document_frequency = ratio;
        self
    }

    /// Set the top-K limit.
    pub fn with_max_seeds(mut self, k: Option<usize>) -> Self {
        self.max_seeds = k;
        self
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.max_document_frequency > 0.0 && self.max_document_frequency <= 1.0) {
            return Err(Error::InvalidParameter {
                name: "max_document_frequency",
                message: "must be in (0, 1]",
            });
        }
        if self.max_seeds == Some(0) {
            return Err(Error::InvalidParameter {
                name: "max_seeds",
                message: "must be at least 1 when set",
            });
        }
        Ok(())
    }
}

/// Parameters of one clustering run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusteringConfig {
    /// τ: minimum co-occurrence similarity for two terms to tolerate each other.
    pub tolerance_threshold: f64,
    /// μ_min: minimum membership for a document to enter an upper approximation.
    pub min_membership: f64,
    /// θ_merge: minimum Jaccard overlap of document sets for two candidates to merge.
    pub merge_threshold: f64,
    /// Normalization of co-occurrence counts.
    pub similarity: Similarity,
    /// Term weighting policy.
    pub weighting: TermWeighting,
    /// Terms in more than this fraction of documents are ignored entirely.
    pub max_word_df: f64,
    /// Seed term policy.
    pub seeds: SeedSelection,
    /// Candidates with fewer documents are dropped.
    pub min_cluster_size: usize,
    /// Label terms per cluster.
    pub max_labels: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            tolerance_threshold: 0.5,
            min_membership: 0.3,
            merge_threshold: 0.5,
            similarity: Similarity::default(),
            weighting: TermWeighting::default(),
            max_word_df: 1.0,
            seeds: SeedSelection::default(),
            min_cluster_size: 2,
            max_labels: 3,
        }
    }
}

impl ClusteringConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set τ.
    pub fn with_tolerance_threshold(mut self, tau: f64) -> Self {
        self.tolerance_threshold = tau;
        self
    }

    /// Set μ_min.
    pub fn with_min_membership(mut self, mu: f64) -> Self {
        self.min_membership = mu;
        self
    }

    /// Set θ_merge.
    pub fn with_merge_threshold(mut self, theta: f64) -> Self {
        self.merge_threshold = theta;
        self
    }

    /// Set the similarity normalization.
    pub fn with_similarity(mut self, similarity: Similarity) -> Self {
        self.similarity = similarity;
        self
    }

    /// Set the term weighting.
    pub fn with_weighting(mut self, weighting: TermWeighting) -> Self {
        self.weighting = weighting;
        self
    }

    /// Set the maximum word document frequency ratio.
    pub fn with_max_word_df(mut self, ratio: f64) -> Self {
        self.max_word_df = ratio;
        self
    }

    /// Set the seed policy.
    pub fn with_seeds(mut self, seeds: SeedSelection) -> Self {
        self.seeds = seeds;
        self
    }

    /// Set the minimum cluster size.
    pub fn with_min_cluster_size(mut self, size: usize) -> Self {
        self.min_cluster_size = size;
        self
    }

    /// Set the number of label terms.
    pub fn with_max_labels(mut self, n: usize) -> Self {
        self.max_labels = n;
        self
    }

    /// Check every parameter range.
    ///
    /// NaN fails every range check.
    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance_threshold > 0.0 && self.tolerance_threshold <= 1.0) {
            return Err(Error::InvalidParameter {
                name: "tolerance_threshold",
                message: "must be in (0, 1]",
            });
        }
        if !(0.0..=1.0).contains(&self.min_membership) {
            return Err(Error::InvalidParameter {
                name: "min_membership",
                message: "must be in [0, 1]",
            });
        }
        if !(0.0..=1.0).contains(&self.merge_threshold) {
            return Err(Error::InvalidParameter {
                name: "merge_threshold",
                message: "must be in [0, 1]",
            });
        }
        if !(self.max_word_df > 0.0 && self.max_word_df <= 1.0) {
            return Err(Error::InvalidParameter {
                name: "max_word_df",
                message: "must be in (0, 1]",
            });
        }
        if self.min_cluster_size == 0 {
            return Err(Error::InvalidParameter {
                name: "min_cluster_size",
                message: "must be at least 1",
            });
        }
        if self.max_labels == 0 {
            return Err(Error::InvalidParameter {
                name: "max_labels",
                message: "must be at least 1",
            });
        }
        self.seeds.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(config: ClusteringConfig) -> &'static str {
        match config.validate() {
            Err(Error::InvalidParameter { name, .. }) => name,
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_default_is_valid() {
        assert!(ClusteringConfig::default().validate().is_ok());
    }

    #[test]
    fn test_tolerance_threshold_range() {
        let c = ClusteringConfig::new();
        assert_eq!(rejected(c.clone().with_tolerance_threshold(0.0)), "tolerance_threshold");
        assert_eq!(rejected(c.clone().with_tolerance_threshold(1.5)), "tolerance_threshold");
        assert_eq!(rejected(c.clone().with_tolerance_threshold(f64::NAN)), "tolerance_threshold");
        assert!(c.with_tolerance_threshold(1.0).validate().is_ok());
    }

    #[test]
    fn test_membership_and_merge_ranges() {
        let c = ClusteringConfig::new();
        assert_eq!(rejected(c.clone().with_min_membership(-0.1)), "min_membership");
        assert_eq!(rejected(c.clone().with_min_membership(f64::NAN)), "min_membership");
        assert_eq!(rejected(c.clone().with_merge_threshold(-1.0)), "merge_threshold");
        assert!(c.clone().with_min_membership(0.0).validate().is_ok());
        assert!(c.with_merge_threshold(1.0).validate().is_ok());
    }

    #[test]
    fn test_counts_and_seeds() {
        let c = ClusteringConfig::new();
        assert_eq!(rejected(c.clone().with_max_labels(0)), "max_labels");
        assert_eq!(rejected(c.clone().with_min_cluster_size(0)), "min_cluster_size");
        assert_eq!(rejected(c.clone().with_max_word_df(0.0)), "max_word_df");
        assert_eq!(
            rejected(c.clone().with_seeds(SeedSelection::default().with_max_seeds(Some(0)))),
            "max_seeds"
        );
        assert_eq!(
            rejected(c.with_seeds(SeedSelection::default().with_max_document_frequency(2.0))),
            "max_document_frequency"
        );
    }
}
