//! Shape deduplication
//!
//! Remembers which shape signatures this agent instance has already reported.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::schema::ShapeSignature;

/// Set of already reported shape signatures
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: Mutex<HashSet<ShapeSignature>>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true exactly once per signature until [`reset`](Self::reset).
    ///
    /// Check and record happen under one lock, so two concurrent callers with
    /// the same signature cannot both get `true`.
    pub fn is_new_shape(&self, signature: &ShapeSignature) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
        if seen.contains(signature) {
            false
        } else {
            seen.insert(signature.clone())
        }
    }

    /// Forget every recorded signature
    pub fn reset(&self) {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Number of distinct signatures recorded
    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
