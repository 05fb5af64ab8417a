use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

struct CacheEntry {
    fetched_at: Instant,
    data: Value,
}

/// Process-wide TTL cache shielding the fetch gateway from the external
/// rate limit. Callers choose the freshness requirement per `get`, not per
/// entry, so the same key can be read under different TTLs.
///
/// Expiry is lazy: a stale entry is evicted on the `get` that observes it.
/// There is no background sweeper and no size bound; key cardinality is
/// league x date-range, which stays small.
#[derive(Default)]
pub struct TtlCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value if it is younger than `max_age`, evicting it
    /// otherwise. `max_age` of zero always misses.
    pub fn get(&self, key: &str, max_age: Duration) -> Option<Value> {
        let mut entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let fresh = entries
            .get(key)
            .map(|entry| entry.fetched_at.elapsed() < max_age)
            .unwrap_or(false);
        if !fresh {
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|entry| entry.data.clone())
    }

    pub fn set(&self, key: &str, data: Value) {
        let mut entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(
            key.to_string(),
            CacheEntry {
                fetched_at: Instant::now(),
                data,
            },
        );
    }

    /// Typed read: a cached value that no longer deserializes as `T` is
    /// treated as a miss.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str, max_age: Duration) -> Option<T> {
        let value = self.get(key, max_age)?;
        serde_json::from_value(value).ok()
    }

    pub fn set_from<T: Serialize>(&self, key: &str, data: &T) {
        if let Ok(value) = serde_json::to_value(data) {
            self.set(key, value);
        }
    }

    pub fn delete(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.remove(key);
    }

    pub fn clear(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.clear();
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
