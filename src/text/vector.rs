//! Sparse term vectors.
//!
//! Each document becomes a sorted list of `(TermId, weight)` pairs. Weights
//! come from one of the [`TermWeighting`] policies:
//!
//! | Policy | Weight | Note |
//! |--------|--------|------|
//! | `Frequency` | `tf` | Raw counts (default) |
//! | `LogTfIdf` | `tf × ln(N / df)` | Terms present in every document weigh 0 |
//! | `LinearTfIdf` | `tf × N / df` | Never zero for a present term |
//!
//! Terms whose final weight is zero are dropped. A document that ends up
//! with no terms is reported as malformed and takes no part in the
//! tolerance space.

use super::registry::{TermId, TermRegistry};
use super::Document;
use crate::error::Error;
use std::collections::HashMap;
use tracing::debug;

/// How raw term frequencies become weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TermWeighting {
    /// Raw term frequency.
    #[default]
    Frequency,
    /// Term frequency scaled by the natural log of inverse document frequency.
    LogTfIdf,
    /// Term frequency scaled linearly by inverse document frequency.
    LinearTfIdf,
}

impl TermWeighting {
    /// Weight of a term occurring `tf` times in one document and in `df` of
    /// `n_docs` documents.
    pub fn weight(&self, tf: u32, df: usize, n_docs: usize) -> f64 {
        if tf == 0 || df == 0 {
            return 0.0;
        }
        let tf = tf as f64;
        match self {
            TermWeighting::Frequency => tf,
            TermWeighting::LogTfIdf => tf * (n_docs as f64 / df as f64).ln(),
            TermWeighting::LinearTfIdf => tf * (n_docs as f64 / df as f64),
        }
    }
}

/// Sparse term → weight mapping for one document.
///
/// Keys are unique and sorted; all weights are positive and finite.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TermVector {
    entries: Vec<(TermId, f64)>,
    total: f64,
}

impl TermVector {
    /// Build from arbitrary pairs. Non-positive weights are dropped,
    /// duplicate keys are summed.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (TermId, f64)>) -> Self {
        let mut acc: HashMap<TermId, f64> = HashMap::new();
        for (t, w) in pairs {
            *acc.entry(t).or_insert(0.0) += w;
        }
        let mut entries: Vec<(TermId, f64)> = acc
            .into_iter()
            .filter(|(_, w)| *w > 0.0 && w.is_finite())
            .collect();
        entries.sort_unstable_by_key(|(t, _)| *t);
        let total = entries.iter().map(|(_, w)| w).sum();
        Self { entries, total }
    }

    /// Weight of `term`, if present.
    pub fn get(&self, term: TermId) -> Option<f64> {
        self.entries
            .binary_search_by_key(&term, |(t, _)| *t)
            .ok()
            .map(|i| self.entries[i].1)
    }

    /// Whether `term` is present.
    pub fn contains(&self, term: TermId) -> bool {
        self.get(term).is_some()
    }

    /// `(term, weight)` pairs in ascending term order.
    pub fn iter(&self) -> impl Iterator<Item = (TermId, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Terms in ascending order.
    pub fn terms(&self) -> impl Iterator<Item = TermId> + '_ {
        self.entries.iter().map(|(t, _)| *t)
    }

    /// Sum of all weights.
    pub fn total_weight(&self) -> f64 {
        self.total
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the vector has no terms.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Term vectors of one clustering run, indexed by document position.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    ids: Vec<usize>,
    vectors: Vec<TermVector>,
    malformed: Vec<usize>,
}

impl Corpus {
    /// Number of documents, malformed ones included.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the corpus has no documents.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Vector of the document at `pos`.
    pub fn vector(&self, pos: usize) -> &TermVector {
        &self.vectors[pos]
    }

    /// All vectors by position.
    pub fn vectors(&self) -> &[TermVector] {
        &self.vectors
    }

    /// Caller id of the document at `pos`.
    pub fn id(&self, pos: usize) -> usize {
        self.ids[pos]
    }

    /// Positions of documents without usable terms.
    pub fn malformed(&self) -> &[usize] {
        &self.malformed
    }

    /// Whether the document at `pos` was excluded.
    pub fn is_malformed(&self, pos: usize) -> bool {
        self.vectors[pos].is_empty()
    }

    /// Sum of a term's weight over the documents at `positions`.
    ///
    /// Pass the term's postings to get its corpus-wide weight without
    /// scanning every document.
    pub fn aggregate_weight(&self, term: TermId, positions: &[usize]) -> f64 {
        positions
            .iter()
            .filter_map(|&pos| self.vectors[pos].get(term))
            .sum()
    }
}

/// Converts token sequences into [`TermVector`]s.
#[derive(Debug, Clone)]
pub struct TermVectorExtractor {
    weighting: TermWeighting,
    /// Terms in more than this fraction of documents are ignored.
    max_word_df: f64,
}

impl TermVectorExtractor {
    /// Create an extractor with the given weighting.
    pub fn new(weighting: TermWeighting) -> Self {
        Self {
            weighting,
            max_word_df: 1.0,
        }
    }

    /// Ignore terms whose document frequency ratio exceeds `ratio`.
    pub fn with_max_word_df(mut self, ratio: f64) -> Self {
        self.max_word_df = ratio;
        self
    }

    /// Extract vectors for all documents, interning terms in `registry`.
    pub fn extract(&self, documents: &[Document], registry: &TermRegistry) -> Corpus {
        let n = documents.len();

        let counts: Vec<HashMap<TermId, u32>> = documents
            .iter()
            .map(|doc| {
                let mut tf = HashMap::new();
                for token in doc.tokens.iter().filter(|t| !t.is_empty()) {
                    *tf.entry(registry.intern(token)).or_insert(0u32) += 1;
                }
                tf
            })
            .collect();

        let mut df: HashMap<TermId, usize> = HashMap::new();
        for tf in &counts {
            for &t in tf.keys() {
                *df.entry(t).or_insert(0) += 1;
            }
        }

        let max_df = self.max_word_df * n as f64;
        let vectors: Vec<TermVector> = counts
            .iter()
            .map(|tf| {
                TermVector::from_pairs(tf.iter().filter_map(|(&t, &f)| {
                    let d = df[&t];
                    if d as f64 > max_df {
                        return None;
                    }
                    Some((t, self.weighting.weight(f, d, n)))
                }))
            })
            .collect();

        let ids: Vec<usize> = documents.iter().map(|d| d.id).collect();
        let mut malformed = Vec::new();
        for (pos, v) in vectors.iter().enumerate() {
            if v.is_empty() {
                let err = Error::MalformedInput {
                    document: ids[pos],
                    reason: "no extractable terms",
                };
                debug!(%err, "excluding document from tolerance space");
                malformed.push(pos);
            }
        }

        debug!(
            documents = n,
            vocabulary = df.len(),
            malformed = malformed.len(),
            weighting = ?self.weighting,
            "extracted term vectors"
        );

        Corpus {
            ids,
            vectors,
            malformed,
        }
    }
}

impl Default for TermVectorExtractor {
    fn default() -> Self {
        Self::new(TermWeighting::default())
    }
}
