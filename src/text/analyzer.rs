//! Per-language analyzers (tokenization + stemming).
//!
//! An [`Analyzer`] is stateful and not thread-safe: it owns scratch buffers
//! and stemmer state, so instances are pooled and reset between documents
//! rather than shared. [`LanguageTable`] maps language codes to analyzer
//! factories; adding a language means registering one more factory.

use super::resources::ResourceCache;
use crate::error::{Error, Result};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Turns raw text into normalized tokens.
pub trait Analyzer: Send {
    /// Language code this analyzer handles.
    fn language(&self) -> &str;

    /// Append the normalized tokens of `text` to `out`, in text order.
    fn analyze(&mut self, text: &str, out: &mut Vec<String>);

    /// Bring internal state back to a reusable baseline.
    ///
    /// An error means the instance is corrupted and must be discarded.
    fn reset(&mut self) -> Result<()>;
}

/// Shortest token kept by the built-in analyzers.
const MIN_TOKEN_LEN: usize = 2;
/// Scratch buffers larger than this are released on reset.
const MAX_RETAINED_CAPACITY: usize = 64 * 1024;

/// Splits lowercase text into alphanumeric words, skipping short and numeric ones.
fn for_each_word(buf: &mut String, text: &str, mut f: impl FnMut(&str)) {
    buf.clear();
    buf.extend(text.chars().flat_map(char::to_lowercase));
    for word in buf.split(|c: char| !c.is_alphanumeric()) {
        if word.chars().count() < MIN_TOKEN_LEN || word.chars().all(|c| c.is_numeric()) {
            continue;
        }
        f(word);
    }
}

/// English: stopword removal plus the Harman "S" plural stemmer.
pub struct EnglishAnalyzer {
    stopwords: Arc<HashSet<String>>,
    buf: String,
    in_progress: bool,
}

impl EnglishAnalyzer {
    /// Create an analyzer with the given stopword set.
    pub fn new(stopwords: Arc<HashSet<String>>) -> Self {
        Self {
            stopwords,
            buf: String::new(),
            in_progress: false,
        }
    }

    /// Strip English plural suffixes.
    pub fn stem(word: &str) -> Cow<'_, str> {
        let n = word.len();
        if n > 3 && word.ends_with("ies") && !word.ends_with("eies") && !word.ends_with("aies") {
            return Cow::Owned(format!("{}y", &word[..n - 3]));
        }
        if n > 3
            && word.ends_with("es")
            && !word.ends_with("aes")
            && !word.ends_with("ees")
            && !word.ends_with("oes")
        {
            return Cow::Borrowed(&word[..n - 1]);
        }
        if n > 2 && word.ends_with('s') && !word.ends_with("us") && !word.ends_with("ss") {
            return Cow::Borrowed(&word[..n - 1]);
        }
        Cow::Borrowed(word)
    }
}

impl Analyzer for EnglishAnalyzer {
    fn language(&self) -> &str {
        "en"
    }

    fn analyze(&mut self, text: &str, out: &mut Vec<String>) {
        self.in_progress = true;
        let stopwords = &self.stopwords;
        for_each_word(&mut self.buf, text, |word| {
            if stopwords.contains(word) {
                return;
            }
            let stem = Self::stem(word);
            if stem.len() >= MIN_TOKEN_LEN {
                out.push(stem.into_owned());
            }
        });
        self.in_progress = false;
    }

    fn reset(&mut self) -> Result<()> {
        if self.in_progress {
            return Err(Error::Other(
                "english analyzer interrupted mid-document".into(),
            ));
        }
        self.buf.clear();
        if self.buf.capacity() > MAX_RETAINED_CAPACITY {
            self.buf.shrink_to(MAX_RETAINED_CAPACITY);
        }
        Ok(())
    }
}

impl fmt::Debug for EnglishAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnglishAnalyzer")
            .field("stopwords", &self.stopwords.len())
            .finish_non_exhaustive()
    }
}

/// Language-agnostic fallback: lowercase words, no stopwords, no stemming.
#[derive(Debug, Default)]
pub struct GenericAnalyzer {
    buf: String,
}

impl GenericAnalyzer {
    /// Create a generic analyzer.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Analyzer for GenericAnalyzer {
    fn language(&self) -> &str {
        "und"
    }

    fn analyze(&mut self, text: &str, out: &mut Vec<String>) {
        for_each_word(&mut self.buf, text, |word| out.push(word.to_string()));
    }

    fn reset(&mut self) -> Result<()> {
        self.buf.clear();
        if self.buf.capacity() > MAX_RETAINED_CAPACITY {
            self.buf.shrink_to(MAX_RETAINED_CAPACITY);
        }
        Ok(())
    }
}

/// Builds an analyzer, loading whatever resources it needs.
pub type AnalyzerFactory =
    Arc<dyn Fn(&ResourceCache) -> Result<Box<dyn Analyzer>> + Send + Sync>;

/// Language code → analyzer factory lookup.
#[derive(Clone, Default)]
pub struct LanguageTable {
    factories: HashMap<String, AnalyzerFactory>,
}

impl LanguageTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the built-in languages (`en`).
    pub fn standard() -> Self {
        Self::new().with_language("en", |resources: &ResourceCache| {
            let stopwords = resources.word_set("stopwords.en")?;
            Ok(Box::new(EnglishAnalyzer::new(stopwords)) as Box<dyn Analyzer>)
        })
    }

    /// Register (or replace) the factory for `code`.
    pub fn with_language<F>(mut self, code: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&ResourceCache) -> Result<Box<dyn Analyzer>> + Send + Sync + 'static,
    {
        self.factories.insert(code.into(), Arc::new(factory));
        self
    }

    /// Whether `code` has a registered factory.
    pub fn supports(&self, code: &str) -> bool {
        self.factories.contains_key(code)
    }

    /// Registered codes, sorted.
    pub fn languages(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    /// Create an analyzer for `code`.
    pub fn create(&self, code: &str, resources: &ResourceCache) -> Result<Box<dyn Analyzer>> {
        let factory = self
            .factories
            .get(code)
            .ok_or_else(|| Error::UnsupportedLanguage(code.to_string()))?;
        factory(resources)
    }
}

impl fmt::Debug for LanguageTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageTable")
            .field("languages", &self.languages())
            .finish()
    }
}
