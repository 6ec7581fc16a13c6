//! Raw text → [`Document`] conversion backed by pooled analyzers.
//!
//! One [`Pool`] of analyzers exists per language code, created on first use
//! and shared by every request afterwards. A request borrows one analyzer per
//! language it needs, runs all of that language's documents through it, and
//! returns it (reset) to the pool, including when the request fails midway.

use super::analyzer::{Analyzer, GenericAnalyzer, LanguageTable};
use super::resources::ResourceCache;
use super::{Document, RawDocument};
use crate::error::{Error, Result};
use crate::pool::{Pool, PoolConfig};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

type AnalyzerPool = Pool<Box<dyn Analyzer>>;

/// What to do with documents whose language has no usable analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnknownLanguage {
    /// Tokenize with the language-agnostic [`GenericAnalyzer`].
    #[default]
    Fallback,
    /// Emit the document without tokens; it ends up in the residual cluster.
    Reject,
}

/// Preprocessing configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PreprocessConfig {
    /// Pool policy, applied to every per-language pool.
    pub pool: PoolConfig,
    /// Language used for documents without a code.
    pub default_language: String,
    /// Policy for unsupported languages or missing resources.
    pub unknown_language: UnknownLanguage,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            pool: PoolConfig::default(),
            default_language: "en".to_string(),
            unknown_language: UnknownLanguage::default(),
        }
    }
}

impl PreprocessConfig {
    /// Set the pool policy.
    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    /// Set the default language code.
    pub fn with_default_language(mut self, code: impl Into<String>) -> Self {
        self.default_language = code.into();
        self
    }

    /// Set the unknown-language policy.
    pub fn with_unknown_language(mut self, policy: UnknownLanguage) -> Self {
        self.unknown_language = policy;
        self
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        self.pool.validate()?;
        if self.default_language.trim().is_empty() {
            return Err(Error::InvalidParameter {
                name: "default_language",
                message: "must be non-empty",
            });
        }
        Ok(())
    }
}

/// Converts [`RawDocument`]s into [`Document`]s.
pub struct Preprocessor {
    config: PreprocessConfig,
    table: LanguageTable,
    resources: Arc<ResourceCache>,
    pools: RwLock<HashMap<String, Arc<AnalyzerPool>>>,
    fallback: AnalyzerPool,
}

impl Preprocessor {
    /// Preprocessor with the built-in languages and resources.
    pub fn new(config: PreprocessConfig) -> Result<Self> {
        Self::with_languages(
            config,
            LanguageTable::standard(),
            Arc::new(ResourceCache::default()),
        )
    }

    /// Preprocessor with a custom language table and resource cache.
    pub fn with_languages(
        config: PreprocessConfig,
        table: LanguageTable,
        resources: Arc<ResourceCache>,
    ) -> Result<Self> {
        config.validate()?;
        let fallback = Pool::new(config.pool, || {
            Ok(Box::new(GenericAnalyzer::new()) as Box<dyn Analyzer>)
        })?
        .with_passivation(|a: &mut Box<dyn Analyzer>| a.reset());

        Ok(Self {
            config,
            table,
            resources,
            pools: RwLock::new(HashMap::new()),
            fallback,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Pool serving `code`, created on first use.
    pub fn pool(&self, code: &str) -> Result<Arc<AnalyzerPool>> {
        if let Some(pool) = self.pools.read().get(code) {
            return Ok(Arc::clone(pool));
        }
        if !self.table.supports(code) {
            return Err(Error::UnsupportedLanguage(code.to_string()));
        }

        let mut pools = self.pools.write();
        if let Some(pool) = pools.get(code) {
            return Ok(Arc::clone(pool));
        }

        let table = self.table.clone();
        let resources = Arc::clone(&self.resources);
        let lang = code.to_string();
        let pool = Arc::new(
            Pool::new(self.config.pool, move || table.create(&lang, &resources))?
                .with_passivation(|a: &mut Box<dyn Analyzer>| a.reset()),
        );
        debug!(language = code, "created analyzer pool");
        pools.insert(code.to_string(), Arc::clone(&pool));
        Ok(pool)
    }

    /// Tokenize every document. Output order matches input order.
    ///
    /// Fails only on run-global errors (pool exhaustion). Documents in a
    /// language without a usable analyzer are handled per
    /// [`UnknownLanguage`].
    pub fn prepare(&self, raw: &[RawDocument]) -> Result<Vec<Document>> {
        let mut by_language: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (pos, doc) in raw.iter().enumerate() {
            let code = doc
                .language
                .as_deref()
                .unwrap_or(self.config.default_language.as_str());
            by_language.entry(code).or_default().push(pos);
        }

        let mut tokens: Vec<Vec<String>> = vec![Vec::new(); raw.len()];
        for (code, positions) in by_language {
            match self.analyze_with(code, raw, &positions, &mut tokens) {
                Ok(()) => {}
                Err(e) if e.is_document_local() || matches!(e, Error::Resource { .. }) => {
                    match self.config.unknown_language {
                        UnknownLanguage::Fallback => {
                            warn!(language = code, error = %e, documents = positions.len(), "falling back to generic analyzer");
                            let mut analyzer = self.fallback.acquire()?;
                            for &pos in &positions {
                                analyzer.analyze(&raw[pos].text, &mut tokens[pos]);
                            }
                        }
                        UnknownLanguage::Reject => {
                            warn!(language = code, error = %e, documents = positions.len(), "rejecting documents");
                        }
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Ok(raw
            .iter()
            .zip(tokens)
            .map(|(doc, tokens)| Document {
                id: doc.id,
                tokens,
                text: Some(Arc::from(doc.text.as_str())),
            })
            .collect())
    }

    fn analyze_with(
        &self,
        code: &str,
        raw: &[RawDocument],
        positions: &[usize],
        tokens: &mut [Vec<String>],
    ) -> Result<()> {
        let pool = self.pool(code)?;
        let mut analyzer = pool.acquire()?;
        for &pos in positions {
            analyzer.analyze(&raw[pos].text, &mut tokens[pos]);
        }
        Ok(())
    }
}

impl std::fmt::Debug for Preprocessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preprocessor")
            .field("config", &self.config)
            .field("table", &self.table)
            .field("pools", &self.pools.read().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::resources::StaticLoader;
    use std::time::Duration;

    #[test]
    fn test_prepare_english() {
        let pre = Preprocessor::new(PreprocessConfig::default()).unwrap();
        let docs = pre
            .prepare(&[
                RawDocument::new(10, "Cars and engines"),
                RawDocument::new(11, "The banana"),
            ])
            .unwrap();
        assert_eq!(docs[0].id, 10);
        assert_eq!(docs[0].tokens, vec!["car", "engine"]);
        assert_eq!(docs[1].tokens, vec!["banana"]);
        assert_eq!(docs[1].text.as_deref(), Some("The banana"));
    }

    #[test]
    fn test_analyzers_are_reused() {
        let pre = Preprocessor::new(PreprocessConfig::default()).unwrap();
        for _ in 0..3 {
            pre.prepare(&[RawDocument::new(0, "engine oil")]).unwrap();
        }
        let pool = pre.pool("en").unwrap();
        assert_eq!(pool.created(), 1);
        assert_eq!(pool.in_use(), 0);
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_unknown_language_fallback() {
        let pre = Preprocessor::new(PreprocessConfig::default()).unwrap();
        let docs = pre
            .prepare(&[RawDocument::new(0, "Der Motor").with_language("de")])
            .unwrap();
        assert_eq!(docs[0].tokens, vec!["der", "motor"]);
    }

    #[test]
    fn test_unknown_language_reject() {
        let config = PreprocessConfig::default().with_unknown_language(UnknownLanguage::Reject);
        let pre = Preprocessor::new(config).unwrap();
        let docs = pre
            .prepare(&[
                RawDocument::new(0, "Der Motor").with_language("de"),
                RawDocument::new(1, "motor oil"),
            ])
            .unwrap();
        assert!(docs[0].tokens.is_empty());
        assert_eq!(docs[1].tokens, vec!["motor", "oil"]);
    }

    #[test]
    fn test_missing_resources_use_policy() {
        let pre = Preprocessor::with_languages(
            PreprocessConfig::default(),
            LanguageTable::standard(),
            Arc::new(ResourceCache::new(StaticLoader::new())),
        )
        .unwrap();
        let docs = pre.prepare(&[RawDocument::new(0, "The engines")]).unwrap();
        // Generic fallback: no stopwords, no stemming.
        assert_eq!(docs[0].tokens, vec!["the", "engines"]);
        assert_eq!(pre.pool("en").unwrap().in_use(), 0);
    }

    #[test]
    fn test_exhausted_pool_fails_the_run() {
        let config = PreprocessConfig::default().with_pool(
            PoolConfig::bounded(1).with_acquire_timeout(Duration::from_millis(10)),
        );
        let pre = Preprocessor::new(config).unwrap();
        let pool = pre.pool("en").unwrap();
        let _held = pool.acquire().unwrap();

        let err = pre.prepare(&[RawDocument::new(0, "engine")]).unwrap_err();
        assert!(matches!(err, Error::ResourceUnavailable { .. }));
    }

    #[test]
    fn test_invalid_config() {
        let config = PreprocessConfig::default().with_default_language(" ");
        assert!(Preprocessor::new(config).is_err());
    }
}
