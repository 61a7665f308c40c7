//! Partial dependency graph
//!
//! Thread-safe map from a partial to every top-level file that (transitively)
//! imports it. The watcher consults it to decide which files to rebuild when a
//! partial changes. Entries only ever grow during the process lifetime.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

/// Initial capacity of the dependents list of one partial
pub const MAX_TOP_LEVEL: usize = 20;

const INITIAL_PARTIALS: usize = 100;

/// Partial -> ordered, duplicate-free list of dependent top-level files
#[derive(Debug)]
pub struct PartialGraph {
    inner: RwLock<HashMap<PathBuf, Vec<PathBuf>>>,
}

impl Default for PartialGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialGraph {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::with_capacity(INITIAL_PARTIALS)),
        }
    }

    /// Record that `main` imports `sub`. Applying the same pair again is a
    /// no-op.
    pub fn add_relation(&self, main: &Path, sub: &Path) {
        let mut map = self.inner.write();
        let dependents = map
            .entry(sub.to_path_buf())
            .or_insert_with(|| Vec::with_capacity(MAX_TOP_LEVEL));
        if !dependents.iter().any(|d| d == main) {
            dependents.push(main.to_path_buf());
        }
    }

    /// Top-level files depending on `sub`, in insertion order
    pub fn lookup(&self, sub: &Path) -> Vec<PathBuf> {
        self.inner.read().get(sub).cloned().unwrap_or_default()
    }

    /// Snapshot of every known partial
    pub fn subfiles(&self) -> Vec<PathBuf> {
        self.inner.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
