//! Document model and the text-side collaborators of the clustering core.
//!
//! The clustering engine consumes [`Document`]s: a caller id plus an ordered
//! sequence of already normalized tokens (stems). Producing those tokens is
//! the job of a language [`Analyzer`](analyzer::Analyzer); the
//! [`Preprocessor`](preprocess::Preprocessor) runs analyzers out of a pool so
//! that their buffers and stemmer state are reused across requests.
//!
//! ```text
//! RawDocument ──Preprocessor──► Document ──TermVectorExtractor──► Corpus
//!               (pooled analyzer)          (TermRegistry ids)
//! ```

pub mod analyzer;
pub mod preprocess;
pub mod registry;
pub mod resources;
pub mod vector;

pub use analyzer::{Analyzer, EnglishAnalyzer, GenericAnalyzer, LanguageTable};
pub use preprocess::{PreprocessConfig, Preprocessor, UnknownLanguage};
pub use registry::{TermId, TermRegistry};
pub use resources::{DirectoryLoader, ResourceCache, ResourceLoader, StaticLoader};
pub use vector::{Corpus, TermVector, TermVectorExtractor, TermWeighting};

use std::sync::Arc;

/// A document ready for clustering.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Document {
    /// Caller-supplied identifier, echoed back in results.
    pub id: usize,
    /// Processed tokens, in document order.
    pub tokens: Vec<String>,
    /// Original text, for display only.
    pub text: Option<Arc<str>>,
}

impl Document {
    /// Create a document from processed tokens.
    pub fn from_tokens<I, S>(id: usize, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            tokens: tokens.into_iter().map(Into::into).collect(),
            text: None,
        }
    }

    /// Create a document from `(token, count)` pairs.
    ///
    /// Handy when the term frequencies are already known.
    pub fn from_counts(id: usize, counts: &[(&str, usize)]) -> Self {
        let tokens = counts
            .iter()
            .flat_map(|&(t, c)| std::iter::repeat(t).take(c))
            .map(str::to_string)
            .collect();
        Self {
            id,
            tokens,
            text: None,
        }
    }

    /// Attach the original text.
    pub fn with_text(mut self, text: impl Into<Arc<str>>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// A document before tokenization.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawDocument {
    /// Caller-supplied identifier.
    pub id: usize,
    /// Raw text (title and snippet concatenated, typically).
    pub text: String,
    /// Language code, e.g. `"en"`. `None` uses the preprocessor default.
    pub language: Option<String>,
}

impl RawDocument {
    /// Create a raw document in the default language.
    pub fn new(id: usize, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            language: None,
        }
    }

    /// Set the language code.
    pub fn with_language(mut self, code: impl Into<String>) -> Self {
        self.language = Some(code.into());
        self
    }
}
