//! Co-occurrence similarity between two terms.
//!
//! Given `co` = number of documents containing both terms and their document
//! frequencies `df_a`, `df_b`, a similarity normalizes `co` into [0, 1].
//! Since `co ≤ min(df_a, df_b)`, every variant below stays in range.
//!
//! | Variant | Formula | Note |
//! |---------|---------|------|
//! | `GeometricMean` | co / √(df_a·df_b) | Cosine of incidence vectors (default) |
//! | `Minimum` | co / min(df_a, df_b) | Overlap coefficient; rare terms bind easily |
//! | `HarmonicMean` | 2co / (df_a + df_b) | Dice coefficient |
//! | `Jaccard` | co / (df_a + df_b − co) | Strictest of the four |
//!
//! For fixed counts: Jaccard ≤ HarmonicMean ≤ GeometricMean ≤ Minimum.

/// Normalizes a co-occurrence count into a similarity in [0, 1].
pub trait CooccurrenceSimilarity: Sync {
    /// Similarity of two terms that co-occur in `co` documents.
    fn similarity(&self, co: usize, df_a: usize, df_b: usize) -> f64;
}

/// Built-in co-occurrence normalizations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Similarity {
    /// `co / sqrt(df_a * df_b)`.
    #[default]
    GeometricMean,
    /// `co / min(df_a, df_b)`.
    Minimum,
    /// `2 co / (df_a + df_b)`.
    HarmonicMean,
    /// `co / (df_a + df_b - co)`.
    Jaccard,
}

impl CooccurrenceSimilarity for Similarity {
    fn similarity(&self, co: usize, df_a: usize, df_b: usize) -> f64 {
        if co == 0 || df_a == 0 || df_b == 0 {
            return 0.0;
        }
        let (c, a, b) = (co as f64, df_a as f64, df_b as f64);
        let s = match self {
            Similarity::GeometricMean => c / (a * b).sqrt(),
            Similarity::Minimum => c / a.min(b),
            Similarity::HarmonicMean => 2.0 * c / (a + b),
            Similarity::Jaccard => c / (a + b - c),
        };
        s.min(1.0)
    }
}

impl<F> CooccurrenceSimilarity for F
where
    F: Fn(usize, usize, usize) -> f64 + Sync,
{
    fn similarity(&self, co: usize, df_a: usize, df_b: usize) -> f64 {
        self(co, df_a, df_b)
    }
}
