//! Cluster labeling.
//!
//! A labeler picks the terms that best describe a cluster. Labels are
//! descriptive only; they never change membership.
//!
//! The default [`CohesionLabeler`] credits each term of the cluster's class
//! with its share of the cluster cohesion:
//!
//! ```text
//! contribution(u) = Σ_{d ∈ K} w_d(u) / Σ_v w_d(v)
//! ```
//!
//! Summed over the class this is `|K| × cohesion`, so the top terms are the
//! ones that explain most of why the documents belong together.
//!
//! Custom strategies plug in through the [`ClusterLabeler`] trait or a
//! closure via [`from_fn`].

use crate::cluster::Cluster;
use crate::text::{Corpus, TermId, TermRegistry};
use std::collections::HashMap;

/// Strategy for choosing label terms.
pub trait ClusterLabeler: Send + Sync {
    /// Up to `max_labels` terms describing `cluster`, best first.
    fn label(
        &self,
        cluster: &Cluster,
        corpus: &Corpus,
        registry: &TermRegistry,
        max_labels: usize,
    ) -> Vec<TermId>;
}

/// Ranks terms by their contribution to cluster cohesion.
///
/// Ties break lexicographically on the term text; terms contributing nothing
/// are never chosen.
#[derive(Debug, Clone, Copy, Default)]
pub struct CohesionLabeler;

impl CohesionLabeler {
    /// Create the labeler.
    pub fn new() -> Self {
        Self
    }

    /// Contribution of every eligible term, unordered.
    ///
    /// Eligible terms are those of the cluster's class, or every term of the
    /// member documents when the class is empty.
    pub fn contributions(&self, cluster: &Cluster, corpus: &Corpus) -> HashMap<TermId, f64> {
        let mut acc: HashMap<TermId, f64> = HashMap::new();
        for pos in cluster.positions() {
            let v = corpus.vector(pos);
            let total = v.total_weight();
            if total <= 0.0 {
                continue;
            }
            for (t, w) in v.iter() {
                if cluster.class.is_empty() || cluster.class.binary_search(&t).is_ok() {
                    *acc.entry(t).or_insert(0.0) += w / total;
                }
            }
        }
        acc
    }
}

impl ClusterLabeler for CohesionLabeler {
    fn label(
        &self,
        cluster: &Cluster,
        corpus: &Corpus,
        registry: &TermRegistry,
        max_labels: usize,
    ) -> Vec<TermId> {
        let mut ranked: Vec<(TermId, f64, String)> = self
            .contributions(cluster, corpus)
            .into_iter()
            .filter(|(_, c)| *c > 0.0)
            .map(|(t, c)| {
                let text = registry.resolve(t).map(|s| s.to_string()).unwrap_or_default();
                (t, c, text)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.2.cmp(&b.2)).then(a.0.cmp(&b.0)));
        ranked.into_iter().take(max_labels).map(|(t, _, _)| t).collect()
    }
}

/// A closure-based labeler.
#[derive(Clone)]
pub struct FnLabeler<F> {
    f: F,
}

impl<F> FnLabeler<F> {
    /// Create a labeler from a function.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> ClusterLabeler for FnLabeler<F>
where
    F: Fn(&Cluster, &Corpus, &TermRegistry, usize) -> Vec<TermId> + Send + Sync,
{
    fn label(
        &self,
        cluster: &Cluster,
        corpus: &Corpus,
        registry: &TermRegistry,
        max_labels: usize,
    ) -> Vec<TermId> {
        let mut out = (self.f)(cluster, corpus, registry, max_labels);
        out.truncate(max_labels);
        out
    }
}

/// Create a labeler from a closure.
pub fn from_fn<F>(f: F) -> FnLabeler<F>
where
    F: Fn(&Cluster, &Corpus, &TermRegistry, usize) -> Vec<TermId> + Send + Sync,
{
    FnLabeler::new(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{ClusterKind, Member};
    use crate::text::{Document, TermVectorExtractor};

    fn topic(positions: &[usize], class: Vec<TermId>) -> Cluster {
        Cluster {
            kind: ClusterKind::Topic,
            members: positions
                .iter()
                .map(|&p| Member {
                    document: p,
                    position: p,
                    membership: 1.0,
                })
                .collect(),
            seeds: Vec::new(),
            class,
            cohesion: 1.0,
            score: positions.len() as f64,
            labels: Vec::new(),
            label: String::new(),
        }
    }

    #[test]
    fn test_cohesion_labels() {
        let reg = TermRegistry::new();
        let docs = vec![
            Document::from_counts(0, &[("car", 3), ("engine", 2)]),
            Document::from_counts(1, &[("car", 2), ("auto", 3)]),
        ];
        let corpus = TermVectorExtractor::default().extract(&docs, &reg);
        let mut class: Vec<TermId> = ["car", "engine", "auto"]
            .iter()
            .map(|t| reg.get(t).unwrap())
            .collect();
        class.sort();
        let cluster = topic(&[0, 1], class);

        // car 0.6 + 0.4 = 1.0; auto 0.6; engine 0.4
        let labels = CohesionLabeler::new().label(&cluster, &corpus, &reg, 3);
        let words: Vec<String> = labels.iter().map(|&t| reg.resolve(t).unwrap().to_string()).collect();
        assert_eq!(words, vec!["car", "auto", "engine"]);

        let top = CohesionLabeler::new().label(&cluster, &corpus, &reg, 1);
        assert_eq!(top, vec![reg.get("car").unwrap()]);

        let total: f64 = CohesionLabeler::new().contributions(&cluster, &corpus).values().sum();
        assert!((total - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_ties_break_lexicographically() {
        let reg = TermRegistry::new();
        // Ids disagree with the text order.
        reg.intern("zeta");
        reg.intern("mid");
        let docs = vec![Document::from_counts(0, &[("zeta", 1), ("alpha", 1), ("mid", 1)])];
        let corpus = TermVectorExtractor::default().extract(&docs, &reg);
        let cluster = topic(&[0], Vec::new());
        let labels = CohesionLabeler::new().label(&cluster, &corpus, &reg, 2);
        let words: Vec<String> = labels.iter().map(|&t| reg.resolve(t).unwrap().to_string()).collect();
        assert_eq!(words, vec!["alpha", "mid"]);
    }

    #[test]
    fn test_class_restricts_candidates() {
        let reg = TermRegistry::new();
        let docs = vec![Document::from_counts(0, &[("noise", 9), ("signal", 1)])];
        let corpus = TermVectorExtractor::default().extract(&docs, &reg);
        let cluster = topic(&[0], vec![reg.get("signal").unwrap()]);
        let labels = CohesionLabeler::new().label(&cluster, &corpus, &reg, 3);
        assert_eq!(labels, vec![reg.get("signal").unwrap()]);
    }

    #[test]
    fn test_fn_labeler_truncates() {
        let labeler = from_fn(|_: &Cluster, _: &Corpus, _: &TermRegistry, _: usize| {
            vec![TermId(1), TermId(2), TermId(3)]
        });
        let reg = TermRegistry::new();
        let corpus = TermVectorExtractor::default().extract(&[], &reg);
        let cluster = topic(&[], Vec::new());
        assert_eq!(labeler.label(&cluster, &corpus, &reg, 2), vec![TermId(1), TermId(2)]);
    }
}
