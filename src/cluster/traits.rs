//! Clustering traits.

use super::result::ClusteringResult;
use crate::error::Result;
use crate::text::Document;

/// Trait for document clustering algorithms.
pub trait DocumentClustering {
    /// Group `documents` into ranked, possibly overlapping clusters.
    ///
    /// Every document appears in at least one topic cluster or in the
    /// residual cluster, never both.
    fn cluster(&self, documents: &[Document]) -> Result<ClusteringResult>;
}
