//! Tolerance rough-set model over term co-occurrence.
//!
//! Classic rough sets partition a universe with an equivalence relation.
//! Term meaning does not partition: "car" relates to "engine" and to "auto"
//! without "engine" relating to "auto". A tolerance relation drops
//! transitivity and keeps reflexivity and symmetry.
//!
//! ```text
//!            engine
//!           /
//!   car ---+          banana
//!           \
//!            auto
//!
//!   class(car)    = {car, engine, auto}
//!   class(engine) = {car, engine}
//!   class(banana) = {banana}
//! ```
//!
//! | Piece | Module |
//! |-------|--------|
//! | Similarity normalizations | [`similarity`] |
//! | Relation graph and classes | [`space`] |
//! | Memberships, upper approximations, seeds | [`approximation`] |

pub mod approximation;
pub mod similarity;
pub mod space;

pub use approximation::{
    approximate_seeds, membership, select_seeds, upper_approximation, UpperApproximation,
};
pub use similarity::{CooccurrenceSimilarity, Similarity};
pub use space::{ToleranceClass, ToleranceSpace};
