//! Resolution cache.
//!
//! Remembers which (parameter, instance) keys were already asked of the ask
//! collaborator and the outcome of the first resolution of each key. Keys
//! being resolved right now are tracked separately so a re-entrant lookup of
//! the same key terminates instead of recursing.

use std::collections::{HashMap, HashSet};

use crate::facts::FactKey;

/// The asked-set, the known-cache and the in-progress set.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    asked: HashSet<FactKey>,
    known: HashMap<FactKey, bool>,
    in_progress: HashSet<FactKey>,
}

impl ResolutionCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a key as asked. Returns false if it had already been asked.
    pub fn mark_asked(&mut self, key: &FactKey) -> bool {
        self.asked.insert(key.clone())
    }

    /// Returns true if the key was asked.
    #[must_use]
    pub fn was_asked(&self, key: &FactKey) -> bool {
        self.asked.contains(key)
    }

    /// Outcome of the first resolution of the key, if any.
    #[must_use]
    pub fn known(&self, key: &FactKey) -> Option<bool> {
        self.known.get(key).copied()
    }

    /// Records a resolution outcome and ends the in-progress marker.
    ///
    /// The first outcome recorded for a key wins.
    pub fn record(&mut self, key: &FactKey, outcome: bool) -> bool {
        self.in_progress.remove(key);
        *self.known.entry(key.clone()).or_insert(outcome)
    }

    /// Marks a key as being resolved. Returns false if it already was.
    pub fn begin(&mut self, key: &FactKey) -> bool {
        self.in_progress.insert(key.clone())
    }

    /// Drops the in-progress marker without recording an outcome.
    pub fn abandon(&mut self, key: &FactKey) {
        self.in_progress.remove(key);
    }

    /// Returns true if the key is being resolved.
    #[must_use]
    pub fn is_in_progress(&self, key: &FactKey) -> bool {
        self.in_progress.contains(key)
    }

    /// Number of keys with a recorded outcome.
    #[must_use]
    pub fn known_len(&self) -> usize {
        self.known.len()
    }

    /// Forgets everything.
    pub fn clear(&mut self) {
        self.asked.clear();
        self.known.clear();
        self.in_progress.clear();
    }
}
