//! Keyed query-result cache.
//!
//! Keys are query identifiers of the form `<table>:<detail>` (for example
//! `companies:list:p1:l20:s=`). Services read through [`QueryCache::get_or_load`] and drop
//! every key of a table with [`QueryCache::invalidate_prefix`] once a mutation commits.
//! The cache is best-effort; it never participates in transactions.

use crate::config::CacheConfig;
use crate::errors::ServiceError;
use dashmap::DashMap;
use metrics::counter;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Prefix under which dashboard summaries are cached; dropped by every mutation.
pub const DASHBOARD_PREFIX: &str = "dashboard:";

#[derive(Debug, Clone)]
struct CacheEntry {
    value: serde_json::Value,
    expires_at: Option<Instant>,
    seq: u64,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        if let Some(expires_at) = self.expires_at {
            Instant::now() >= expires_at
        } else {
            false
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryCache {
    entries: Arc<DashMap<String, CacheEntry>>,
    next_seq: Arc<AtomicU64>,
    capacity: usize,
    default_ttl: Option<Duration>,
    enabled: bool,
}

impl QueryCache {
    pub fn new(capacity: usize, default_ttl: Option<Duration>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            next_seq: Arc::new(AtomicU64::new(0)),
            capacity: capacity.max(1),
            default_ttl,
            enabled: true,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        let mut cache = Self::new(
            config.capacity,
            config.default_ttl_secs.map(Duration::from_secs),
        );
        cache.enabled = config.enabled;
        cache
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        let mut cache = Self::new(1, None);
        cache.enabled = false;
        cache
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if !self.enabled {
            return None;
        }
        let value = {
            let entry = self.entries.get(key)?;
            if entry.is_expired() {
                None
            } else {
                Some(entry.value.clone())
            }
        };

        match value {
            Some(value) => match serde_json::from_value(value) {
                Ok(v) => {
                    counter!("crm_cache.hits", 1);
                    Some(v)
                }
                Err(e) => {
                    warn!(key, error = %e, "Dropping undecodable cache entry");
                    self.entries.remove(key);
                    None
                }
            },
            None => {
                self.entries.remove(key);
                None
            }
        }
    }

    pub fn insert<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ServiceError> {
        self.insert_with_ttl(key, value, self.default_ttl)
    }

    pub fn insert_with_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), ServiceError> {
        if !self.enabled {
            return Ok(());
        }
        let value = serde_json::to_value(value)
            .map_err(|e| ServiceError::CacheError(format!("Failed to encode {key}: {e}")))?;

        if !self.entries.contains_key(key) {
            self.make_room();
        }

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: ttl.map(|d| Instant::now() + d),
                seq,
            },
        );
        Ok(())
    }

    /// Returns the cached value for `key`, or runs `loader` and caches its result.
    ///
    /// Loader errors are returned as-is and nothing is cached.
    pub async fn get_or_load<T, F, Fut>(&self, key: &str, loader: F) -> Result<T, ServiceError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        if let Some(hit) = self.get::<T>(key) {
            debug!(key, "Query cache hit");
            return Ok(hit);
        }
        counter!("crm_cache.misses", 1);

        let value = loader().await?;
        if let Err(e) = self.insert(key, &value) {
            warn!(key, error = %e, "Failed to cache query result");
        }
        Ok(value)
    }

    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Drops every key starting with `prefix`; returns how many were removed.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            counter!("crm_cache.invalidations", removed as u64);
            debug!(prefix, removed, "Invalidated cached queries");
        }
        removed
    }

    /// Invalidates the given tables and the dashboard summary.
    pub fn invalidate_tables(&self, tables: &[&str]) {
        for table in tables {
            self.invalidate_prefix(&format!("{table}:"));
        }
        self.invalidate_prefix(DASHBOARD_PREFIX);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    fn make_room(&self) {
        self.entries.retain(|_, entry| !entry.is_expired());
        while self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.value().seq)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(key) => {
                    self.entries.remove(&key);
                    counter!("crm_cache.evictions", 1);
                }
                None => break,
            }
        }
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn get_or_load_runs_loader_once() {
        let cache = QueryCache::new(10, None);
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: Vec<u32> = cache
                .get_or_load("companies:list", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![1, 2, 3])
                })
                .await
                .unwrap();
            assert_eq!(value, vec![1, 2, 3]);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn loader_errors_are_not_cached() {
        let cache = QueryCache::new(10, None);
        let result: Result<u32, _> = cache
            .get_or_load("products:1", || async {
                Err(ServiceError::NotFound("product".into()))
            })
            .await;
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_prefix_only_touches_matching_table() {
        let cache = QueryCache::new(10, None);
        cache.insert("quotations:list", &1).unwrap();
        cache.insert("quotations:abc", &2).unwrap();
        cache.insert("quotation_items:abc", &3).unwrap();
        cache.insert("companies:list", &4).unwrap();

        assert_eq!(cache.invalidate_prefix("quotations:"), 2);
        assert_eq!(cache.get::<i32>("quotation_items:abc"), Some(3));
        assert_eq!(cache.get::<i32>("companies:list"), Some(4));
        assert_eq!(cache.get::<i32>("quotations:list"), None);
    }

    #[test]
    fn invalidate_tables_also_drops_dashboard() {
        let cache = QueryCache::new(10, None);
        cache.insert("dashboard:summary", &"x").unwrap();
        cache.insert("notes:list", &"y").unwrap();
        cache.insert("tasks:list", &"z").unwrap();

        cache.invalidate_tables(&["notes"]);

        assert_eq!(cache.get::<String>("dashboard:summary"), None);
        assert_eq!(cache.get::<String>("notes:list"), None);
        assert_eq!(cache.get::<String>("tasks:list"), Some("z".to_string()));
    }

    #[test]
    fn expired_entries_are_misses() {
        let cache = QueryCache::new(10, None);
        cache
            .insert_with_ttl("settings:list", &7, Some(Duration::ZERO))
            .unwrap();
        assert_eq!(cache.get::<i32>("settings:list"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn capacity_evicts_oldest_insert() {
        let cache = QueryCache::new(2, None);
        cache.insert("a:1", &1).unwrap();
        cache.insert("b:1", &2).unwrap();
        cache.insert("c:1", &3).unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get::<i32>("a:1"), None);
        assert_eq!(cache.get::<i32>("b:1"), Some(2));
        assert_eq!(cache.get::<i32>("c:1"), Some(3));
    }

    #[test]
    fn overwriting_a_key_does_not_evict() {
        let cache = QueryCache::new(2, None);
        cache.insert("a:1", &1).unwrap();
        cache.insert("b:1", &2).unwrap();
        cache.insert("b:1", &20).unwrap();
        assert_eq!(cache.get::<i32>("a:1"), Some(1));
        assert_eq!(cache.get::<i32>("b:1"), Some(20));
    }

    #[tokio::test]
    async fn disabled_cache_always_loads() {
        let cache = QueryCache::disabled();
        let calls = AtomicUsize::new(0);
        for _ in 0..2 {
            let _: u8 = cache
                .get_or_load("x:1", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(1)
                })
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
