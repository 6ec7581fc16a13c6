//! Document clustering over tolerance rough sets.
//!
//! ## Overlapping clusters
//!
//! Search results rarely belong to exactly one topic. A snippet about
//! "jaguar engine oil" is about cars and about maintenance. Clusters here are
//! rough-set upper approximations: each document joins every cluster whose
//! vocabulary covers enough of its weight, so clusters overlap.
//!
//! ## Pipeline
//!
//! 1. **Candidates**: one per seed term, the upper approximation of its
//!    tolerance class. Small ones are dropped.
//! 2. **Merge** ([`merge`]): candidates whose document sets overlap by at
//!    least θ_merge (Jaccard) are merged, best pair first, until none do.
//! 3. **Rank** ([`rank`]): `score = size × cohesion`.
//! 4. **Label** ([`crate::label`]): top terms by cohesion contribution.
//! 5. **Residual**: documents no cluster covers go to "Other Topics".
//!
//! ## Guarantees
//!
//! - Every input document is in at least one topic or in the residual,
//!   never both.
//! - Identical input and configuration give identical output, regardless of
//!   thread scheduling.
//! - Candidates can only gain documents when merged.
//!
//! ## Usage
//!
//! ```
//! use rough::{ClusteringConfig, Document, TolerantClusterer};
//!
//! let docs = vec![
//!     Document::from_counts(0, &[("car", 3), ("engine", 2)]),
//!     Document::from_counts(1, &[("car", 2), ("auto", 3)]),
//!     Document::from_counts(2, &[("banana", 5)]),
//! ];
//! let result = TolerantClusterer::new(ClusteringConfig::default())?.cluster(&docs)?;
//! assert_eq!(result.clusters.len(), 1);
//! assert!(result.other_topics.contains(2));
//! # Ok::<(), rough::Error>(())
//! ```

pub mod merge;
pub mod rank;
mod result;
mod rough;
mod traits;

pub use merge::{Candidate, MergeStep};
pub use rank::ClusterScore;
pub use result::{Cluster, ClusterKind, ClusteringResult, Member, OTHER_TOPICS_LABEL};
pub use rough::{cluster, CancelFlag, TolerantClusterer};
pub use traits::DocumentClustering;
