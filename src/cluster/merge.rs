//! Merging overlapping cluster candidates.
//!
//! Candidates whose document sets overlap strongly describe the same topic.
//! Merging is agglomerative and driven by Jaccard overlap:
//!
//! ```text
//! while some pair (a, b) has J(a, b) ≥ θ_merge:
//!     pick the pair with the highest J (lowest indices on ties)
//!     class(a) ← class(a) ∪ class(b)
//!     docs(a)  ← upper approximation of class(a)
//!     drop b
//! ```
//!
//! Recomputing the documents from the union class means a merge never loses
//! a document either side had: membership only grows with the class.
//! Every merge removes one candidate, so the loop ends after at most `k - 1`
//! merges. The history is kept as a list of [`MergeStep`]s, the way a
//! dendrogram records agglomeration.

use super::rough::CancelFlag;
use crate::error::{Error, Result};
use crate::text::{Corpus, TermId};
use crate::tolerance::{upper_approximation, ToleranceSpace, UpperApproximation};
use tracing::{debug, trace};

/// One recorded merge.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MergeStep {
    /// Initial index of the surviving candidate.
    pub kept: usize,
    /// Initial index of the absorbed candidate.
    pub absorbed: usize,
    /// Jaccard overlap that triggered the merge.
    pub overlap: f64,
    /// Document count after the merge.
    pub size: usize,
}

/// A cluster candidate: one or more seeds and the upper approximation of
/// their combined class.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Index in the initial candidate ordering.
    pub id: usize,
    /// Contributing seeds, ascending.
    pub seeds: Vec<TermId>,
    /// Approximation of the union of the seeds' classes.
    pub approximation: UpperApproximation,
}

impl Candidate {
    /// Document count.
    pub fn size(&self) -> usize {
        self.approximation.len()
    }

    /// Lowest contributing seed.
    pub fn first_seed(&self) -> Option<TermId> {
        self.seeds.first().copied()
    }
}

/// Build the initial candidate list from per-seed approximations.
///
/// Approximations with fewer than `min_size` documents are dropped. The rest
/// are ordered by ascending seed id, then descending size, and numbered.
pub fn candidates(
    seeds: &[TermId],
    approximations: Vec<UpperApproximation>,
    min_size: usize,
) -> Vec<Candidate> {
    let mut out: Vec<Candidate> = seeds
        .iter()
        .zip(approximations)
        .filter(|(_, a)| a.len() >= min_size)
        .map(|(&seed, approximation)| Candidate {
            id: 0,
            seeds: vec![seed],
            approximation,
        })
        .collect();
    out.sort_by(|a, b| {
        a.first_seed()
            .cmp(&b.first_seed())
            .then(b.size().cmp(&a.size()))
    });
    for (i, c) in out.iter_mut().enumerate() {
        c.id = i;
    }
    out
}

/// Configuration of the merge loop.
#[derive(Debug, Clone, Copy)]
pub struct MergeParams {
    /// θ_merge.
    pub threshold: f64,
    /// μ_min used when recomputing merged approximations.
    pub min_membership: f64,
}

/// Merge `candidates` until no pair overlaps by at least the threshold.
///
/// Returns the survivors, still in initial order, and the merge history.
/// Pairwise overlaps are computed once up front; after a merge only the
/// surviving candidate's row is recomputed.
///
/// # Errors
///
/// `Cancelled` if `cancel` is raised between merges.
pub fn merge(
    space: &ToleranceSpace,
    corpus: &Corpus,
    mut candidates: Vec<Candidate>,
    params: MergeParams,
    cancel: &CancelFlag,
) -> Result<(Vec<Candidate>, Vec<MergeStep>)> {
    let initial = candidates.len();
    let mut history = Vec::new();
    let mut overlaps = OverlapMatrix::new(&candidates);

    loop {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let Some((i, j, overlap)) = overlaps.best_pair(params.threshold) else {
            break;
        };

        let step = absorb(space, corpus, &mut candidates, i, j, overlap, params.min_membership);
        overlaps.remove(j);
        overlaps.refresh(&candidates, i);
        trace!(
            kept = step.kept,
            absorbed = step.absorbed,
            overlap,
            size = step.size,
            "merged candidates"
        );
        history.push(step);
    }

    debug!(
        candidates = initial,
        merges = history.len(),
        survivors = candidates.len(),
        threshold = params.threshold,
        "merged cluster candidates"
    );
    Ok((candidates, history))
}

/// Fold candidate `j` into candidate `i` (`i < j`) and recompute the
/// survivor's approximation from the union class.
fn absorb(
    space: &ToleranceSpace,
    corpus: &Corpus,
    candidates: &mut Vec<Candidate>,
    i: usize,
    j: usize,
    overlap: f64,
    min_membership: f64,
) -> MergeStep {
    let absorbed = candidates.remove(j);
    let kept = &mut candidates[i];

    let mut seeds = std::mem::take(&mut kept.seeds);
    seeds.extend(absorbed.seeds);
    seeds.sort_unstable();
    seeds.dedup();

    let mut class = std::mem::take(&mut kept.approximation.class);
    class.extend(absorbed.approximation.class);
    kept.approximation = upper_approximation(space, corpus, class, min_membership);
    kept.seeds = seeds;

    MergeStep {
        kept: kept.id,
        absorbed: absorbed.id,
        overlap,
        size: kept.size(),
    }
}

/// Symmetric cache of pairwise Jaccard overlaps, indexed like the live
/// candidate list.
#[derive(Debug)]
struct OverlapMatrix {
    rows: Vec<Vec<f64>>,
}

impl OverlapMatrix {
    fn new(candidates: &[Candidate]) -> Self {
        let n = candidates.len();
        let mut rows = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let o = candidates[i]
                    .approximation
                    .overlap(&candidates[j].approximation);
                rows[i][j] = o;
                rows[j][i] = o;
            }
        }
        Self { rows }
    }

    /// Pair with the highest overlap ≥ `threshold`; earliest pair wins ties.
    fn best_pair(&self, threshold: f64) -> Option<(usize, usize, f64)> {
        let mut best: Option<(usize, usize, f64)> = None;
        for (i, row) in self.rows.iter().enumerate() {
            for (j, &o) in row.iter().enumerate().skip(i + 1) {
                if o < threshold {
                    continue;
                }
                if best.map_or(true, |(_, _, b)| o > b) {
                    best = Some((i, j, o));
                }
            }
        }
        best
    }

    /// Drop index `j`, shifting later indices down as `Vec::remove` does.
    fn remove(&mut self, j: usize) {
        self.rows.remove(j);
        for row in &mut self.rows {
            row.remove(j);
        }
    }

    /// Recompute row and column `i` against the current candidates.
    fn refresh(&mut self, candidates: &[Candidate], i: usize) {
        for j in 0..candidates.len() {
            if j == i {
                continue;
            }
            let o = candidates[i]
                .approximation
                .overlap(&candidates[j].approximation);
            self.rows[i][j] = o;
            self.rows[j][i] = o;
        }
    }
}
