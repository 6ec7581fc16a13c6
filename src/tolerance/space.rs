//! Tolerance space construction.
//!
//! Builds the tolerance relation over the corpus vocabulary as a sparse
//! undirected graph:
//!
//! - each distinct term becomes a node
//! - an edge joins terms `i ≠ j` whose co-occurrence similarity is ≥ τ
//! - edge weights are the similarity values
//!
//! The tolerance class of a term is the term itself plus its neighbours.
//! Reflexivity is implicit (no self loops are stored) and symmetry follows
//! from the graph being undirected. The relation is not transitive.
//!
//! # Sparse enumeration
//!
//! ```text
//! for term i:
//!     for document d in postings(i):
//!         for term j > i in d:
//!             co[j] += 1
//! ```
//!
//! Only pairs that actually co-occur are ever touched; the V×V cross product
//! is never materialized. Rows are independent and are computed in parallel
//! with the `parallel` feature.

use super::similarity::CooccurrenceSimilarity;
use crate::error::{Error, Result};
use crate::text::{Corpus, TermId};
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The tolerance class of one term: the term and every term tolerant to it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ToleranceClass {
    /// The term the class belongs to.
    pub term: TermId,
    /// Members in ascending order, `term` included.
    pub members: Vec<TermId>,
}

impl ToleranceClass {
    /// Whether `term` belongs to the class.
    pub fn contains(&self, term: TermId) -> bool {
        self.members.binary_search(&term).is_ok()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false: a class contains at least its own term.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether every member of `self` is in `other`.
    pub fn is_subset(&self, other: &ToleranceClass) -> bool {
        self.members.iter().all(|t| other.contains(*t))
    }
}

/// Tolerance relation and classes over a corpus vocabulary.
#[derive(Debug, Clone)]
pub struct ToleranceSpace {
    /// Local index → term, ascending.
    terms: Vec<TermId>,
    index: HashMap<TermId, usize>,
    /// Local term → document positions containing it, ascending.
    postings: Vec<Vec<usize>>,
    /// Node `i` is local term `i`.
    graph: UnGraph<TermId, f64>,
    /// Local term → sorted local members of its class.
    classes: Vec<Vec<usize>>,
    threshold: f64,
}

impl ToleranceSpace {
    /// Build the tolerance space of `corpus` at threshold `tau`.
    ///
    /// Malformed (empty) documents contribute nothing.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if `tau` is outside (0, 1].
    pub fn build<S>(corpus: &Corpus, tau: f64, similarity: &S) -> Result<Self>
    where
        S: CooccurrenceSimilarity + ?Sized,
    {
        if !(tau > 0.0 && tau <= 1.0) {
            return Err(Error::InvalidParameter {
                name: "tolerance_threshold",
                message: "must be in (0, 1]",
            });
        }

        let vocabulary: BTreeSet<TermId> = corpus.vectors().iter().flat_map(|v| v.terms()).collect();
        let terms: Vec<TermId> = vocabulary.into_iter().collect();
        let index: HashMap<TermId, usize> = terms.iter().enumerate().map(|(i, &t)| (t, i)).collect();
        let v = terms.len();

        // Forward lists stay sorted: the TermId -> local mapping is monotone.
        let forward: Vec<Vec<usize>> = corpus
            .vectors()
            .iter()
            .map(|vec| vec.terms().map(|t| index[&t]).collect())
            .collect();

        let mut postings: Vec<Vec<usize>> = vec![Vec::new(); v];
        for (doc, local_terms) in forward.iter().enumerate() {
            for &t in local_terms {
                postings[t].push(doc);
            }
        }

        let row = |counts: &mut Vec<u32>, i: usize| -> Vec<(usize, f64)> {
            cooccurrence_row(i, &postings, &forward, counts, tau, similarity)
        };

        #[cfg(feature = "parallel")]
        let rows: Vec<Vec<(usize, f64)>> = (0..v)
            .into_par_iter()
            .map_init(|| vec![0u32; v], |counts, i| row(counts, i))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let rows: Vec<Vec<(usize, f64)>> = {
            let mut counts = vec![0u32; v];
            (0..v).map(|i| row(&mut counts, i)).collect()
        };

        let n_edges = rows.iter().map(Vec::len).sum();
        let mut graph = UnGraph::<TermId, f64>::with_capacity(v, n_edges);
        for &t in &terms {
            let _ = graph.add_node(t);
        }
        for (i, row) in rows.iter().enumerate() {
            for &(j, s) in row {
                let _ = graph.add_edge(NodeIndex::new(i), NodeIndex::new(j), s);
            }
        }

        let classes: Vec<Vec<usize>> = (0..v)
            .map(|i| {
                let mut members: Vec<usize> = graph
                    .neighbors(NodeIndex::new(i))
                    .map(|n| n.index())
                    .collect();
                members.push(i);
                members.sort_unstable();
                members.dedup();
                members
            })
            .collect();

        debug!(
            vocabulary = v,
            relation_size = graph.edge_count(),
            tau,
            "built tolerance space"
        );

        Ok(Self {
            terms,
            index,
            postings,
            graph,
            classes,
            threshold: tau,
        })
    }

    /// τ used to build this space.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Number of distinct terms.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Number of tolerant pairs `{i, j}`, `i ≠ j`.
    pub fn relation_size(&self) -> usize {
        self.graph.edge_count()
    }

    /// Vocabulary in ascending id order.
    pub fn terms(&self) -> &[TermId] {
        &self.terms
    }

    /// The relation graph. Node weights are term ids, edge weights similarities.
    pub fn graph(&self) -> &UnGraph<TermId, f64> {
        &self.graph
    }

    /// Tolerance class of `term`, or `None` if it is not in the vocabulary.
    pub fn class(&self, term: TermId) -> Option<ToleranceClass> {
        let i = *self.index.get(&term)?;
        Some(self.class_at(i))
    }

    /// Every tolerance class, in ascending term order.
    pub fn classes(&self) -> impl Iterator<Item = ToleranceClass> + '_ {
        (0..self.terms.len()).map(move |i| self.class_at(i))
    }

    /// Whether `a ~ b`. Every known term tolerates itself.
    pub fn are_tolerant(&self, a: TermId, b: TermId) -> bool {
        match (self.index.get(&a), self.index.get(&b)) {
            (Some(&i), Some(&j)) if i == j => true,
            (Some(&i), Some(&j)) => self
                .graph
                .find_edge(NodeIndex::new(i), NodeIndex::new(j))
                .is_some(),
            _ => false,
        }
    }

    /// Similarity stored on the `a ~ b` edge, if the terms tolerate each other.
    pub fn similarity(&self, a: TermId, b: TermId) -> Option<f64> {
        let i = *self.index.get(&a)?;
        let j = *self.index.get(&b)?;
        if i == j {
            return Some(1.0);
        }
        let e = self.graph.find_edge(NodeIndex::new(i), NodeIndex::new(j))?;
        self.graph.edge_weight(e).copied()
    }

    /// Number of documents containing both terms.
    pub fn cooccurrence(&self, a: TermId, b: TermId) -> usize {
        match (self.index.get(&a), self.index.get(&b)) {
            (Some(&i), Some(&j)) => sorted_intersection_len(&self.postings[i], &self.postings[j]),
            _ => 0,
        }
    }

    /// Number of documents containing `term`.
    pub fn document_frequency(&self, term: TermId) -> usize {
        self.index.get(&term).map_or(0, |&i| self.postings[i].len())
    }

    /// Positions of documents containing `term`.
    pub fn postings(&self, term: TermId) -> &[usize] {
        self.index
            .get(&term)
            .map_or(&[][..], |&i| self.postings[i].as_slice())
    }

    pub(crate) fn local(&self, term: TermId) -> Option<usize> {
        self.index.get(&term).copied()
    }

    pub(crate) fn term_at(&self, i: usize) -> TermId {
        self.terms[i]
    }

    pub(crate) fn class_members(&self, i: usize) -> &[usize] {
        &self.classes[i]
    }

    pub(crate) fn postings_at(&self, i: usize) -> &[usize] {
        &self.postings[i]
    }

    fn class_at(&self, i: usize) -> ToleranceClass {
        ToleranceClass {
            term: self.terms[i],
            members: self.classes[i].iter().map(|&m| self.terms[m]).collect(),
        }
    }
}

/// Tolerant partners `j > i` of term `i`, ascending.
///
/// `counts` must be all zeros on entry and is left all zeros on exit.
fn cooccurrence_row<S>(
    i: usize,
    postings: &[Vec<usize>],
    forward: &[Vec<usize>],
    counts: &mut [u32],
    tau: f64,
    similarity: &S,
) -> Vec<(usize, f64)>
where
    S: CooccurrenceSimilarity + ?Sized,
{
    let mut touched = Vec::new();
    for &doc in &postings[i] {
        for &j in &forward[doc] {
            if j <= i {
                continue;
            }
            if counts[j] == 0 {
                touched.push(j);
            }
            counts[j] += 1;
        }
    }
    touched.sort_unstable();

    let df_i = postings[i].len();
    let mut out = Vec::new();
    for j in touched {
        let co = counts[j] as usize;
        counts[j] = 0;
        let s = similarity.similarity(co, df_i, postings[j].len());
        if s >= tau {
            out.push((j, s));
        }
    }
    out
}

fn sorted_intersection_len(a: &[usize], b: &[usize]) -> usize {
    let (mut i, mut j, mut n) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                n += 1;
                i += 1;
                j += 1;
            }
        }
    }
    n
}
