use std::collections::HashMap;
use std::fmt::Display;
use std::time::{Duration, SystemTime};

use sha2::{Digest, Sha256};

/// In-memory key→(value, stored-at) map with a fixed time-to-live.
///
/// Owned by whoever needs it; nothing here is global.
#[derive(Debug, Clone)]
pub struct TtlCache<V> {
    ttl: Duration,
    entries: HashMap<String, (V, SystemTime)>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn get(&mut self, key: &str) -> Option<V> {
        self.get_at(key, SystemTime::now())
    }

    /// Returns the value if still fresh at `now`; stale entries are evicted.
    pub fn get_at(&mut self, key: &str, now: SystemTime) -> Option<V> {
        let (value, stored_at) = self.entries.get(key)?;
        let age = now.duration_since(*stored_at).unwrap_or_default();
        if age < self.ttl {
            return Some(value.clone());
        }
        self.entries.remove(key);
        None
    }

    pub fn insert(&mut self, key: String, value: V) {
        self.insert_at(key, value, SystemTime::now());
    }

    pub fn insert_at(&mut self, key: String, value: V, now: SystemTime) {
        self.entries.insert(key, (value, now));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Stable hex key built from a prefix and its arguments.
pub fn cache_key<T: Display>(prefix: &str, args: &[T]) -> String {
    let joined = args
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(":");
    let digest = Sha256::digest(format!("{prefix}:{joined}").as_bytes());
    format!("{digest:x}")
}
