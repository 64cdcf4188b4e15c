//! In-process key/value memory backing the `memory_set` / `memory_get` tools.
//!
//! The store is owned by whoever builds the tool registry and handed to the
//! tools as an `Arc`. Concurrent runs may share one store; every access goes
//! through the internal `RwLock`, so last writer wins per key.

use std::collections::HashMap;
use std::sync::RwLock;

/// A thread-safe map from string keys to JSON values.
#[derive(Debug, Default)]
pub struct KeyValueStore {
    entries: RwLock<HashMap<String, serde_json::Value>>,
}

impl KeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value. Returns the previous value, if any.
    pub fn set(&self, key: impl Into<String>, value: serde_json::Value) -> Option<serde_json::Value> {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.into(), value)
    }

    /// Read a value by key.
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
