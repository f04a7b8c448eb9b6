//! Event-type keyed index.
//!
//! Both the template set and the active instance set are bucketed by the
//! event type each entry is waiting for. Buckets keep insertion order.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

/// A map from event type name to an ordered bucket of entries.
#[derive(Debug, Clone)]
pub struct TypeIndex<V> {
    buckets: HashMap<Arc<str>, Vec<V>>,
}

impl<V> TypeIndex<V> {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self {
            buckets: HashMap::new(),
        }
    }

    /// Append `value` to the bucket for `key`.
    pub fn insert(&mut self, key: Arc<str>, value: V) {
        self.buckets.entry(key).or_default().push(value);
    }

    /// Entries waiting for `key`, in insertion order.
    pub fn get(&self, key: &str) -> &[V] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Detach the whole bucket for `key`.
    ///
    /// Entries inserted under `key` while the bucket is detached start a new
    /// bucket; [`restore`](Self::restore) puts the detached entries back in
    /// front of them.
    pub fn take(&mut self, key: &str) -> Option<(Arc<str>, Vec<V>)> {
        self.buckets.remove_entry(key)
    }

    /// Re-attach entries previously detached with [`take`](Self::take),
    /// ahead of anything inserted under `key` in the meantime.
    pub fn restore(&mut self, key: Arc<str>, mut entries: Vec<V>) {
        if let Some(newer) = self.buckets.remove(&key) {
            entries.extend(newer);
        }
        if !entries.is_empty() {
            self.buckets.insert(key, entries);
        }
    }

    /// Total number of entries across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// True if no bucket holds any entry.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Entry count per key, sorted by key.
    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.buckets
            .iter()
            .map(|(key, bucket)| (key.to_string(), bucket.len()))
            .collect()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}

impl<V> Default for TypeIndex<V> {
    fn default() -> Self {
        Self::new()
    }
}
