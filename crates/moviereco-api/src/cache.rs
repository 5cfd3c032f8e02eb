//! Response cache and loading-state flags.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;

use crate::host::ClientObserver;

/// How long a cached response stays valid.
pub const CACHE_DURATION: Duration = Duration::from_secs(5 * 60);

/// A cached payload and when it was captured.
#[derive(Debug, Clone)]
struct CacheEntry {
    data: Value,
    captured_at: Instant,
}

/// Time-boxed cache keyed by caller-chosen strings.
///
/// An expired entry and a missing entry look the same to callers. Expired
/// entries are evicted when read and swept on every write.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(CACHE_DURATION)
    }
}

impl ResponseCache {
    /// Creates an empty cache with the given entry lifetime.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        entry.captured_at.elapsed() < self.ttl
    }

    /// Returns the value for `key` if it was stored less than the TTL ago.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        let data = self
            .entries
            .get(key)
            .and_then(|entry| self.is_fresh(&entry).then(|| entry.data.clone()));
        if data.is_none() {
            self.entries.remove_if(key, |_, entry| !self.is_fresh(entry));
        }
        data
    }

    /// Stores `data` under `key` with the current time, replacing any entry.
    pub fn set(&self, key: &str, data: Value) {
        self.insert_at(key, data, Instant::now());
    }

    /// Stores `data` with an explicit capture time.
    fn insert_at(&self, key: &str, data: Value, captured_at: Instant) {
        self.entries.retain(|_, entry| self.is_fresh(entry));
        self.entries
            .insert(String::from(key), CacheEntry { data, captured_at });
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

/// Per-key "in flight" flags that front ends toggle around their own work.
#[derive(Debug)]
pub struct LoadingStates {
    states: DashMap<String, bool>,
    observer: Arc<dyn ClientObserver>,
}

impl LoadingStates {
    /// Creates an empty map that reports changes to `observer`.
    #[must_use]
    pub fn new(observer: Arc<dyn ClientObserver>) -> Self {
        Self {
            states: DashMap::new(),
            observer,
        }
    }

    /// Sets the flag for `key` and notifies the observer. Clearing a flag
    /// drops its key, since an unknown key already reads as `false`.
    pub fn set(&self, key: &str, loading: bool) {
        if loading {
            self.states.insert(String::from(key), true);
        } else {
            self.states.remove(key);
        }
        self.observer.loading_changed(key, loading);
    }

    /// Current flag for `key`; `false` when never set.
    #[must_use]
    pub fn get(&self, key: &str) -> bool {
        self.states.get(key).is_some_and(|flag| *flag)
    }

    /// Drops every flag.
    pub fn clear(&self) {
        self.states.clear();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;

    #[derive(Debug, Default)]
    struct CountingObserver {
        changes: AtomicUsize,
    }

    impl ClientObserver for CountingObserver {
        fn loading_changed(&self, _key: &str, _loading: bool) {
            self.changes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_unknown_key_is_miss() {
        // Arrange
        let cache = ResponseCache::default();

        // Act & Assert
        assert!(cache.get("never-set").is_none());
        assert!(cache.get("").is_none());
    }

    #[test]
    fn test_set_then_get_returns_value() {
        // Arrange
        let cache = ResponseCache::default();
        let value = json!({"movies": [{"id": 1}], "total_pages": 3});

        // Act
        cache.set("popular:1", value.clone());

        // Assert
        assert_eq!(cache.get("popular:1"), Some(value));
    }

    #[test]
    fn test_set_overwrites_previous_entry() {
        // Arrange
        let cache = ResponseCache::default();
        cache.set("k", json!(1));

        // Act
        cache.set("k", json!(2));

        // Assert
        assert_eq!(cache.get("k"), Some(json!(2)));
    }

    #[test]
    fn test_entry_older_than_duration_is_miss() {
        // Arrange
        let cache = ResponseCache::default();
        let Some(stale) = Instant::now().checked_sub(CACHE_DURATION + Duration::from_secs(1))
        else {
            return;
        };

        // Act
        cache.insert_at("genres", json!(["Drama"]), stale);

        // Assert
        assert!(cache.get("genres").is_none());
    }

    #[test]
    fn test_entry_at_exact_duration_is_miss() {
        // Arrange
        let cache = ResponseCache::new(Duration::ZERO);

        // Act
        cache.set("k", json!("v"));

        // Assert
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_expired_entries_are_evicted_on_read() {
        // Arrange
        let cache = ResponseCache::new(Duration::ZERO);
        for i in 0..100 {
            cache.set(&format!("page:{i}"), json!(i));
        }

        // Act
        let hits = (0..100)
            .filter(|i| cache.get(&format!("page:{i}")).is_some())
            .count();

        // Assert
        assert_eq!(hits, 0);
        assert!(cache.entries.is_empty());
    }

    #[test]
    fn test_write_sweeps_expired_entries() {
        // Arrange
        let cache = ResponseCache::default();
        let Some(stale) = Instant::now().checked_sub(CACHE_DURATION + Duration::from_secs(1))
        else {
            return;
        };
        cache.insert_at("old", json!(1), stale);

        // Act
        cache.set("new", json!(2));

        // Assert
        assert_eq!(cache.entries.len(), 1);
        assert_eq!(cache.get("new"), Some(json!(2)));
    }

    #[test]
    fn test_clear_drops_entries() {
        // Arrange
        let cache = ResponseCache::default();
        cache.set("a", json!(1));

        // Act
        cache.clear();

        // Assert
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn test_loading_defaults_to_false_and_notifies() {
        // Arrange
        let observer = Arc::new(CountingObserver::default());
        let states = LoadingStates::new(observer.clone());

        // Act
        let initial = states.get("movies");
        states.set("movies", true);
        let during = states.get("movies");
        states.set("movies", false);

        // Assert
        assert!(!initial);
        assert!(during);
        assert!(!states.get("movies"));
        assert!(states.states.is_empty());
        assert_eq!(observer.changes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_loading_clear_resets_flags() {
        // Arrange
        let states = LoadingStates::new(Arc::new(crate::host::TracingObserver));
        states.set("reviews", true);

        // Act
        states.clear();

        // Assert
        assert!(!states.get("reviews"));
    }
}
