//! Language resources (stopword lists and similar word sets).
//!
//! The core only needs "open succeeds or fails": a [`ResourceLoader`] hands
//! out byte streams by name, and [`ResourceCache`] parses each named word list
//! once per process and shares it read-only afterwards.

use crate::error::{Error, Result};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Supplies byte streams for named resources.
pub trait ResourceLoader: Send + Sync {
    /// Open the resource called `name`.
    fn open(&self, name: &str) -> io::Result<Box<dyn Read + Send>>;
}

/// Loads resources from files under a base directory.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    base: PathBuf,
}

impl DirectoryLoader {
    /// Resolve resource names relative to `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl ResourceLoader for DirectoryLoader {
    fn open(&self, name: &str) -> io::Result<Box<dyn Read + Send>> {
        let file = File::open(self.base.join(name))?;
        Ok(Box::new(file))
    }
}

/// English stopwords shipped with the crate.
pub const ENGLISH_STOPWORDS: &str = "\
a\nabout\nabove\nafter\nagain\nall\nam\nan\nand\nany\nare\nas\nat\nbe\nbecause\nbeen\n\
before\nbeing\nbelow\nbetween\nboth\nbut\nby\ncan\ncould\ndid\ndo\ndoes\ndoing\ndown\n\
during\neach\nfew\nfor\nfrom\nfurther\nhad\nhas\nhave\nhaving\nhe\nher\nhere\nhers\nhim\n\
his\nhow\ni\nif\nin\ninto\nis\nit\nits\njust\nme\nmore\nmost\nmy\nno\nnor\nnot\nnow\nof\n\
off\non\nonce\nonly\nor\nother\nour\nout\nover\nown\nsame\nshe\nshould\nso\nsome\nsuch\n\
than\nthat\nthe\ntheir\nthem\nthen\nthere\nthese\nthey\nthis\nthose\nthrough\nto\ntoo\n\
under\nuntil\nup\nvery\nwas\nwe\nwere\nwhat\nwhen\nwhere\nwhich\nwhile\nwho\nwhom\nwhy\n\
will\nwith\nwould\nyou\nyour\n";

/// In-memory resources keyed by name.
#[derive(Debug, Clone, Default)]
pub struct StaticLoader {
    entries: HashMap<String, &'static str>,
}

impl StaticLoader {
    /// An empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader with the built-in resources (`stopwords.en`).
    pub fn builtin() -> Self {
        Self::new().with_resource("stopwords.en", ENGLISH_STOPWORDS)
    }

    /// Register a resource.
    pub fn with_resource(mut self, name: impl Into<String>, content: &'static str) -> Self {
        self.entries.insert(name.into(), content);
        self
    }
}

impl ResourceLoader for StaticLoader {
    fn open(&self, name: &str) -> io::Result<Box<dyn Read + Send>> {
        match self.entries.get(name) {
            Some(content) => Ok(Box::new(Cursor::new(content.as_bytes()))),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no static resource named {name}"),
            )),
        }
    }
}

/// Shared, lazily filled cache of parsed word lists.
pub struct ResourceCache {
    loader: Box<dyn ResourceLoader>,
    word_sets: RwLock<HashMap<String, Arc<HashSet<String>>>>,
}

impl ResourceCache {
    /// Cache in front of `loader`.
    pub fn new(loader: impl ResourceLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            word_sets: RwLock::new(HashMap::new()),
        }
    }

    /// Word list called `name`: one lowercase word per line, `#` starts a comment.
    ///
    /// Loaded on first use; later calls share the same set.
    pub fn word_set(&self, name: &str) -> Result<Arc<HashSet<String>>> {
        if let Some(set) = self.word_sets.read().get(name) {
            return Ok(Arc::clone(set));
        }

        let mut sets = self.word_sets.write();
        if let Some(set) = sets.get(name) {
            return Ok(Arc::clone(set));
        }

        let set = Arc::new(self.load_words(name).map_err(|e| {
            warn!(resource = name, error = %e, "resource load failed");
            e
        })?);
        debug!(resource = name, words = set.len(), "loaded word list");
        sets.insert(name.to_string(), Arc::clone(&set));
        Ok(set)
    }

    /// Number of cached word lists.
    pub fn cached(&self) -> usize {
        self.word_sets.read().len()
    }

    fn load_words(&self, name: &str) -> Result<HashSet<String>> {
        let to_err = |source| Error::Resource {
            name: name.to_string(),
            source,
        };
        let reader = BufReader::new(self.loader.open(name).map_err(to_err)?);
        let mut words = HashSet::new();
        for line in reader.lines() {
            let line = line.map_err(to_err)?;
            let word = line.trim();
            if word.is_empty() || word.starts_with('#') {
                continue;
            }
            words.insert(word.to_lowercase());
        }
        Ok(words)
    }
}

impl std::fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCache")
            .field("cached", &self.cached())
            .finish_non_exhaustive()
    }
}

impl Default for ResourceCache {
    fn default() -> Self {
        Self::new(StaticLoader::builtin())
    }
}
