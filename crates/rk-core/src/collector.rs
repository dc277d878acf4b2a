//! Generic interning collector shared by conditions, condition sets,
//! candidate values, abstract decisions, and resources.
//!
//! Adding an entity under a key already present returns the existing
//! index (interning); adding an entity with a conflicting shape under
//! the same key is a [`rk_error::ErrorCode::KeyShapeConflict`] error.
//! Indices are dense and assigned on first insertion; a collector never
//! reorders what it already holds.

use rk_error::{ErrorCode, ResError, Result};
use std::collections::HashMap;

/// A generic append-only interning collector keyed by content hash.
#[derive(Debug, Clone)]
pub struct Collector<T> {
    entries: Vec<T>,
    index_of: HashMap<String, usize>,
}

impl<T> Default for Collector<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index_of: HashMap::new(),
        }
    }
}

impl<T: Clone + PartialEq> Collector<T> {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `value` under `key`. If `key` is already present and the
    /// stored value is equal to `value`, returns the existing index
    /// (interning). If present with a *different* value, fails with
    /// [`ErrorCode::KeyShapeConflict`]. Otherwise inserts and returns the
    /// new dense index.
    pub fn add(&mut self, key: &str, value: T) -> Result<usize> {
        if let Some(&idx) = self.index_of.get(key) {
            if self.entries[idx] == value {
                return Ok(idx);
            }
            return Err(ResError::new(
                ErrorCode::KeyShapeConflict,
                format!("key '{key}' already interned with a different shape"),
            )
            .with_context("key", key));
        }
        let idx = self.entries.len();
        self.entries.push(value);
        self.index_of.insert(key.to_string(), idx);
        Ok(idx)
    }

    /// Look up the index for `key`, if interned.
    #[must_use]
    pub fn get_index(&self, key: &str) -> Option<usize> {
        self.index_of.get(key).copied()
    }

    /// Look up the entity for `key`, if interned.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&T> {
        self.index_of.get(key).map(|&idx| &self.entries[idx])
    }

    /// Fetch the entity at a dense index.
    #[must_use]
    pub fn get_at(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    /// Whether `key` has been interned.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.index_of.contains_key(key)
    }

    /// Number of distinct interned entities.
    #[must_use]
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Whether the collector holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entities in insertion (dense index) order.
    #[must_use]
    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    /// Consume the collector, returning its entities in dense index order.
    #[must_use]
    pub fn into_entries(self) -> Vec<T> {
        self.entries
    }
}
