//! Process-wide term interning.
//!
//! Terms are normalized strings (stems). Every distinct string gets a stable
//! [`TermId`] the first time it is seen; ids are never reused or removed.
//! Lookups of already-known terms take the read lock only.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Interned term identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TermId(pub u32);

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

#[derive(Debug, Default)]
struct Interned {
    ids: HashMap<Arc<str>, TermId>,
    terms: Vec<Arc<str>>,
}

/// Append-only mapping from term string to [`TermId`].
#[derive(Debug, Default)]
pub struct TermRegistry {
    inner: RwLock<Interned>,
}

static GLOBAL: Lazy<TermRegistry> = Lazy::new(TermRegistry::new);

impl TermRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared process-wide registry.
    pub fn global() -> &'static TermRegistry {
        &GLOBAL
    }

    /// Return the id for `term`, registering it if unseen.
    pub fn intern(&self, term: &str) -> TermId {
        if let Some(&id) = self.inner.read().ids.get(term) {
            return id;
        }

        let mut inner = self.inner.write();
        // Another writer may have registered it between the two locks.
        if let Some(&id) = inner.ids.get(term) {
            return id;
        }
        let id = TermId(inner.terms.len() as u32);
        let key: Arc<str> = Arc::from(term);
        inner.terms.push(Arc::clone(&key));
        inner.ids.insert(key, id);
        id
    }

    /// Id of an already registered term.
    pub fn get(&self, term: &str) -> Option<TermId> {
        self.inner.read().ids.get(term).copied()
    }

    /// The string for `id`.
    pub fn resolve(&self, id: TermId) -> Option<Arc<str>> {
        self.inner.read().terms.get(id.0 as usize).cloned()
    }

    /// Number of registered terms.
    pub fn len(&self) -> usize {
        self.inner.read().terms.len()
    }

    /// Whether no term has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
