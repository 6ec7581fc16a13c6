//! Output types of a clustering run.

use super::merge::MergeStep;
use crate::text::{TermId, TermRegistry};
use std::sync::Arc;

/// Label of the residual cluster.
pub const OTHER_TOPICS_LABEL: &str = "Other Topics";

/// Whether a cluster is a topic or the residual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClusterKind {
    /// A topical group built from tolerance classes.
    Topic,
    /// Documents that fit no topic well enough.
    OtherTopics,
}

/// One document in a cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Member {
    /// Caller-supplied document id.
    pub document: usize,
    /// Position of the document in the input slice.
    pub position: usize,
    /// Membership in the cluster's term set. For the residual cluster, the
    /// best membership the document reached in any topic (0 if none).
    pub membership: f64,
}

/// A group of documents.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cluster {
    /// Topic or residual.
    pub kind: ClusterKind,
    /// Members in ascending input position.
    pub members: Vec<Member>,
    /// Seed terms whose candidates were merged into this cluster, ascending.
    pub seeds: Vec<TermId>,
    /// Union of the seeds' tolerance classes, ascending.
    pub class: Vec<TermId>,
    /// Mean membership of the members.
    pub cohesion: f64,
    /// `size × cohesion`.
    pub score: f64,
    /// Label terms, most descriptive first.
    pub labels: Vec<TermId>,
    /// Display label.
    pub label: String,
}

impl Cluster {
    pub(crate) fn other_topics(members: Vec<Member>) -> Self {
        Self {
            kind: ClusterKind::OtherTopics,
            members,
            seeds: Vec::new(),
            class: Vec::new(),
            cohesion: 0.0,
            score: 0.0,
            labels: Vec::new(),
            label: OTHER_TOPICS_LABEL.to_string(),
        }
    }

    /// Number of member documents.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the cluster has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether this is the residual cluster.
    pub fn is_other_topics(&self) -> bool {
        self.kind == ClusterKind::OtherTopics
    }

    /// Caller ids of the members.
    pub fn documents(&self) -> impl Iterator<Item = usize> + '_ {
        self.members.iter().map(|m| m.document)
    }

    /// Input positions of the members.
    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.members.iter().map(|m| m.position)
    }

    /// Whether the document with caller id `document` is a member.
    pub fn contains(&self, document: usize) -> bool {
        self.members.iter().any(|m| m.document == document)
    }

    /// Label terms as strings.
    pub fn label_terms(&self, registry: &TermRegistry) -> Vec<Arc<str>> {
        self.labels
            .iter()
            .filter_map(|&t| registry.resolve(t))
            .collect()
    }
}

/// Ranked clusters of one run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusteringResult {
    /// Topic clusters, best first. Clusters may share documents.
    pub clusters: Vec<Cluster>,
    /// Residual cluster; always present, possibly empty.
    pub other_topics: Cluster,
    /// Merges performed, in order.
    pub merges: Vec<MergeStep>,
}

impl ClusteringResult {
    pub(crate) fn empty() -> Self {
        Self {
            clusters: Vec::new(),
            other_topics: Cluster::other_topics(Vec::new()),
            merges: Vec::new(),
        }
    }

    /// Topic clusters followed by the residual cluster.
    pub fn iter(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters
            .iter()
            .chain(std::iter::once(&self.other_topics))
    }

    /// Number of topic clusters.
    pub fn topic_count(&self) -> usize {
        self.clusters.len()
    }

    /// Indices of the topic clusters containing `document`.
    pub fn clusters_of(&self, document: usize) -> Vec<usize> {
        self.clusters
            .iter()
            .enumerate()
            .filter(|(_, c)| c.contains(document))
            .map(|(i, _)| i)
            .collect()
    }
}
