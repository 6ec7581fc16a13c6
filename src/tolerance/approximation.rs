//! Upper approximations of tolerance classes.
//!
//! A document's membership in a term set `T` is the share of its weight that
//! falls on terms of `T`:
//!
//! ```text
//! μ(d, T) = Σ_{u ∈ T} w_d(u) / Σ_u w_d(u)        ∈ [0, 1]
//! ```
//!
//! The upper approximation of `T` is every document with `μ ≥ μ_min` and
//! `μ > 0`. Lowering `μ_min` or enlarging `T` never removes a document.
//!
//! Seeds are the terms whose tolerance classes become cluster candidates;
//! [`select_seeds`] applies a [`SeedSelection`] policy.

use super::space::ToleranceSpace;
use crate::config::SeedSelection;
use crate::text::{Corpus, TermId, TermVector};
use std::cmp::Ordering;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Membership of a document in the term set `class`.
///
/// `class` must be sorted ascending. Returns 0 for an empty vector.
pub fn membership(vector: &TermVector, class: &[TermId]) -> f64 {
    let total = vector.total_weight();
    if total <= 0.0 {
        return 0.0;
    }
    let inside: f64 = vector
        .iter()
        .filter(|(t, _)| class.binary_search(t).is_ok())
        .map(|(_, w)| w)
        .sum();
    (inside / total).clamp(0.0, 1.0)
}

/// Documents covered by a term set.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UpperApproximation {
    /// The term set, ascending.
    pub class: Vec<TermId>,
    /// `(document position, membership)` in ascending position order.
    pub members: Vec<(usize, f64)>,
}

impl UpperApproximation {
    /// Number of member documents.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether no document qualifies.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member positions, ascending.
    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.members.iter().map(|(p, _)| *p)
    }

    /// Whether the document at `pos` is a member.
    pub fn contains(&self, pos: usize) -> bool {
        self.members.binary_search_by_key(&pos, |(p, _)| *p).is_ok()
    }

    /// Mean membership over members, 0 when empty.
    pub fn mean_membership(&self) -> f64 {
        if self.members.is_empty() {
            return 0.0;
        }
        self.members.iter().map(|(_, m)| m).sum::<f64>() / self.members.len() as f64
    }

    /// Jaccard overlap `|A ∩ B| / |A ∪ B|` of the two document sets.
    pub fn overlap(&self, other: &UpperApproximation) -> f64 {
        let (a, b) = (&self.members, &other.members);
        let (mut i, mut j, mut shared) = (0, 0, 0usize);
        while i < a.len() && j < b.len() {
            match a[i].0.cmp(&b[j].0) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    shared += 1;
                    i += 1;
                    j += 1;
                }
            }
        }
        let union = a.len() + b.len() - shared;
        if union == 0 {
            0.0
        } else {
            shared as f64 / union as f64
        }
    }
}

/// Upper approximation of `class` at threshold `min_membership`.
///
/// Only documents holding at least one term of `class` are examined, found
/// through the postings of `space`. Terms unknown to `space` are kept in the
/// class but match no document.
pub fn upper_approximation(
    space: &ToleranceSpace,
    corpus: &Corpus,
    mut class: Vec<TermId>,
    min_membership: f64,
) -> UpperApproximation {
    class.sort_unstable();
    class.dedup();

    let mut candidates: Vec<usize> = class
        .iter()
        .filter_map(|&t| space.local(t))
        .flat_map(|i| space.postings_at(i).iter().copied())
        .collect();
    candidates.sort_unstable();
    candidates.dedup();

    let members = candidates
        .into_iter()
        .filter_map(|pos| {
            let mu = membership(corpus.vector(pos), &class);
            (mu > 0.0 && mu >= min_membership).then_some((pos, mu))
        })
        .collect();

    UpperApproximation { class, members }
}

/// Upper approximation of every seed's tolerance class, in seed order.
pub fn approximate_seeds(
    space: &ToleranceSpace,
    corpus: &Corpus,
    seeds: &[TermId],
    min_membership: f64,
) -> Vec<UpperApproximation> {
    let one = |&seed: &TermId| {
        let class = space
            .local(seed)
            .map(|i| {
                space
                    .class_members(i)
                    .iter()
                    .map(|&m| space.term_at(m))
                    .collect()
            })
            .unwrap_or_else(|| vec![seed]);
        upper_approximation(space, corpus, class, min_membership)
    };

    #[cfg(feature = "parallel")]
    let out: Vec<UpperApproximation> = seeds.par_iter().map(one).collect();
    #[cfg(not(feature = "parallel"))]
    let out: Vec<UpperApproximation> = seeds.iter().map(one).collect();

    debug!(
        seeds = seeds.len(),
        non_empty = out.iter().filter(|a| !a.is_empty()).count(),
        min_membership,
        "computed upper approximations"
    );
    out
}

/// Seed terms under `policy`, ascending by id.
///
/// Terms are filtered by document frequency, then the top `max_seeds` by
/// aggregate corpus weight are kept (ties to the lower id).
pub fn select_seeds(space: &ToleranceSpace, corpus: &Corpus, policy: &SeedSelection) -> Vec<TermId> {
    let max_df = policy.max_document_frequency * corpus.len() as f64;

    let mut ranked: Vec<(TermId, f64)> = space
        .terms()
        .iter()
        .enumerate()
        .filter(|(i, _)| {
            let df = space.postings_at(*i).len();
            df >= policy.min_document_frequency && df as f64 <= max_df
        })
        .map(|(i, &t)| (t, corpus.aggregate_weight(t, space.postings_at(i))))
        .collect();

    if let Some(k) = policy.max_seeds {
        if ranked.len() > k {
            ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
            ranked.truncate(k);
        }
    }

    let mut seeds: Vec<TermId> = ranked.into_iter().map(|(t, _)| t).collect();
    seeds.sort_unstable();
    debug!(seeds = seeds.len(), vocabulary = space.term_count(), "selected seed terms");
    seeds
}
