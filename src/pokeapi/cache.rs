//! Time-bounded response cache keyed by request URL

use super::types::CacheStats;
use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Default time a cached response stays fresh
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    data: Value,
    timestamp: DateTime<Utc>,
}

/// In-memory cache of upstream JSON documents.
///
/// Entries older than the TTL are treated as absent and dropped on access.
/// The lock is never held across an await point.
pub struct ResponseCache {
    ttl: TimeDelta,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.timestamp < self.ttl
    }

    /// Fresh cached document for `key`, evicting it if stale
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.lock();
        let entry = entries.get(key)?;
        if self.is_fresh(entry, Utc::now()) {
            return Some(entry.data.clone());
        }
        entries.remove(key);
        None
    }

    pub fn insert(&self, key: impl Into<String>, data: Value) {
        self.lock().insert(
            key.into(),
            CacheEntry {
                data,
                timestamp: Utc::now(),
            },
        );
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Drop every stale entry. Returns how many went.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| self.is_fresh(entry, now));
        before - entries.len()
    }

    /// Keys of the fresh entries, sorted
    pub fn stats(&self) -> CacheStats {
        let now = Utc::now();
        let entries = self.lock();
        let mut keys: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| self.is_fresh(entry, now))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        CacheStats {
            size: keys.len(),
            entries: keys,
        }
    }

    /// Push an entry's timestamp into the past. Returns false if absent.
    #[cfg(test)]
    pub fn backdate(&self, key: &str, by: TimeDelta) -> bool {
        match self.lock().get_mut(key) {
            Some(entry) => {
                entry.timestamp -= by;
                true
            }
            None => false,
        }
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hit_within_ttl() {
        let cache = ResponseCache::default();
        cache.insert("https://x/pokemon/25", json!({ "id": 25 }));
        assert_eq!(cache.get("https://x/pokemon/25"), Some(json!({ "id": 25 })));
    }

    #[test]
    fn miss_for_unknown_key() {
        let cache = ResponseCache::default();
        assert_eq!(cache.get("https://x/pokemon/1"), None);
    }

    #[test]
    fn stale_entry_is_evicted() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.insert("k", json!(1));
        assert!(cache.backdate("k", TimeDelta::seconds(61)));

        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn entry_just_inside_ttl_is_fresh() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.insert("k", json!(1));
        cache.backdate("k", TimeDelta::seconds(30));
        assert_eq!(cache.get("k"), Some(json!(1)));
    }

    #[test]
    fn stats_skip_stale_entries() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.insert("fresh", json!(1));
        cache.insert("stale", json!(2));
        cache.backdate("stale", TimeDelta::hours(5));

        let stats = cache.stats();
        assert_eq!(stats.size, 1);
        assert_eq!(stats.entries, vec!["fresh".to_string()]);
    }

    #[test]
    fn purge_drops_every_expired_entry() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        for offset in 0..500 {
            let key = format!("https://x/pokemon?limit=1000&offset={offset}");
            cache.insert(key.clone(), json!([]));
            cache.backdate(&key, TimeDelta::hours(5));
        }
        cache.insert("https://x/pokemon/25", json!({ "id": 25 }));

        assert_eq!(cache.purge_expired(), 500);
        assert_eq!(cache.purge_expired(), 0);
        assert_eq!(cache.stats().entries, vec!["https://x/pokemon/25".to_string()]);
        assert!(!cache.backdate("https://x/pokemon?limit=1000&offset=0", TimeDelta::seconds(1)));
    }

    #[test]
    fn clear_and_stats() {
        let cache = ResponseCache::default();
        cache.insert("b", json!(2));
        cache.insert("a", json!(1));

        let stats = cache.stats();
        assert_eq!(stats.size, 2);
        assert_eq!(stats.entries, vec!["a".to_string(), "b".to_string()]);

        cache.clear();
        assert_eq!(cache.stats().size, 0);
        assert!(!cache.backdate("a", TimeDelta::seconds(1)));
    }
}
