#![forbid(unsafe_code)]

//! Per-binder storage of active bindings.
//!
//! Three parallel mappings keyed by property name: the active source, the
//! active detach handle, and the canonical reference of the bound location.
//!
//! # Invariants
//!
//! 1. A key appears in the detach mapping if and only if it appears in the
//!    source mapping — [`BindingRegistry::insert`] and
//!    [`BindingRegistry::remove`] always write or clear all three mappings
//!    together.
//! 2. The canonical reference for a key exists only while the key is bound.
//! 3. [`BindingRegistry::drain`] clears the source and reference mappings
//!    before handing out the detach handles, so a failing teardown cannot
//!    leave a half-registered key behind.

use std::fmt;

use ahash::AHashMap;

use tether_core::{Detach, Source, SourceRef};

#[derive(Default)]
pub struct BindingRegistry {
    sources: AHashMap<String, Source>,
    detaches: AHashMap<String, Detach>,
    refs: AHashMap<String, SourceRef>,
}

impl BindingRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a binding: source, detach handle, and canonical reference are
    /// written together. Any prior entry for `key` is overwritten — tearing
    /// it down first is the caller's job.
    pub fn insert(&mut self, key: impl Into<String>, source: Source, detach: Detach) {
        let key = key.into();
        self.refs.insert(key.clone(), source.canonical_ref());
        self.sources.insert(key.clone(), source);
        self.detaches.insert(key, detach);
    }

    /// Remove a binding, returning its source and detach handle. All three
    /// mappings are cleared before this returns.
    pub fn remove(&mut self, key: &str) -> Option<(Source, Detach)> {
        let source = self.sources.remove(key)?;
        let detach = self
            .detaches
            .remove(key)
            .expect("detach mapping tracks source mapping");
        self.refs.remove(key);
        Some((source, detach))
    }

    /// Empty every mapping, returning the detach handles for teardown.
    pub fn drain(&mut self) -> Vec<(String, Detach)> {
        self.sources.clear();
        self.refs.clear();
        self.detaches.drain().collect()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.sources.contains_key(key)
    }

    #[must_use]
    pub fn source(&self, key: &str) -> Option<&Source> {
        self.sources.get(key)
    }

    #[must_use]
    pub fn source_ref(&self, key: &str) -> Option<&SourceRef> {
        self.refs.get(key)
    }

    /// Read-only projection of canonical references for all bound keys.
    pub fn refs(&self) -> impl Iterator<Item = (&str, &SourceRef)> {
        self.refs.iter().map(|(key, sref)| (key.as_str(), sref))
    }

    /// Snapshot of the currently bound keys.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.sources.keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl fmt::Debug for BindingRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingRegistry")
            .field("bound", &self.sources.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
