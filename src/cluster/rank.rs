//! Cluster scoring and ordering.
//!
//! ```text
//! cohesion(K) = mean_{d ∈ K} μ(d, class(K))
//! score(K)    = |K| × cohesion(K)
//! ```
//!
//! Large clusters of documents that sit squarely inside the cluster's
//! vocabulary rank first. Order: score desc, size desc, first seed asc.

use super::merge::Candidate;
use std::cmp::Ordering;

/// Quality figures of one candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterScore {
    /// Number of documents.
    pub size: usize,
    /// Mean membership.
    pub cohesion: f64,
    /// `size × cohesion`.
    pub score: f64,
}

impl ClusterScore {
    /// Score a candidate.
    pub fn of(candidate: &Candidate) -> Self {
        let size = candidate.size();
        let cohesion = candidate.approximation.mean_membership();
        Self {
            size,
            cohesion,
            score: size as f64 * cohesion,
        }
    }
}

/// Score candidates and sort them best first.
pub fn rank(candidates: Vec<Candidate>) -> Vec<(Candidate, ClusterScore)> {
    let mut scored: Vec<(Candidate, ClusterScore)> = candidates
        .into_iter()
        .map(|c| {
            let s = ClusterScore::of(&c);
            (c, s)
        })
        .collect();
    scored.sort_by(|(ca, sa), (cb, sb)| compare(ca, sa, cb, sb));
    scored
}

fn compare(ca: &Candidate, sa: &ClusterScore, cb: &Candidate, sb: &ClusterScore) -> Ordering {
    sb.score
        .total_cmp(&sa.score)
        .then(sb.size.cmp(&sa.size))
        .then(ca.first_seed().cmp(&cb.first_seed()))
}
