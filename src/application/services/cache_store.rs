use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::application::ports::KeyValueStore;
use crate::domain::entities::CacheEntry;
use crate::domain::value_objects::CacheKey;

/// Namespace prefix in the persisted key-value store.
pub const CACHE_PREFIX: &str = "cache_";

pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// Match lists churn quickly.
pub const MATCHES_TTL: Duration = Duration::from_secs(60 * 60);
/// Profile data is near-static.
pub const PROFILE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);
/// Message history only grows on the server.
pub const MESSAGES_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Best-effort memo of server responses with per-entry expiry. Reads evict
/// lazily; writes never fail observably. Callers needing freshness for a key
/// with an in-flight queued mutation must bypass the cache themselves.
pub struct CacheStore {
    storage: Arc<dyn KeyValueStore>,
    default_ttl: Duration,
}

impl CacheStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::with_default_ttl(storage, DEFAULT_TTL)
    }

    pub fn with_default_ttl(storage: Arc<dyn KeyValueStore>, default_ttl: Duration) -> Self {
        Self {
            storage,
            default_ttl,
        }
    }

    fn storage_key(key: &CacheKey) -> String {
        format!("{CACHE_PREFIX}{key}")
    }

    fn encode<T: Serialize>(&self, value: &T, ttl: Option<Duration>) -> Option<String> {
        let ttl_ms = ttl.unwrap_or(self.default_ttl).as_millis() as i64;
        let entry = CacheEntry::new(value, Utc::now().timestamp_millis(), ttl_ms);
        match serde_json::to_string(&entry) {
            Ok(json) => Some(json),
            Err(e) => {
                warn!("Failed to serialize cache entry: {e}");
                None
            }
        }
    }

    /// Persist a value under `key`. Storage failures are logged and swallowed;
    /// the cache is not a transactional store.
    pub async fn set<T: Serialize>(&self, key: &CacheKey, value: &T, ttl: Option<Duration>) {
        let Some(json) = self.encode(value, ttl) else {
            return;
        };
        if let Err(e) = self.storage.set(&Self::storage_key(key), &json).await {
            warn!("Failed to persist cache entry {key}: {e}");
        }
    }

    /// Read with lazy eviction: expired and corrupt entries are removed and
    /// reported as misses, as are storage faults.
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let storage_key = Self::storage_key(key);
        let raw = match self.storage.get(&storage_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Cache read failed for {key}: {e}");
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Evicting corrupt cache entry {key}: {e}");
                self.remove_raw(&storage_key).await;
                return None;
            }
        };

        if entry.is_expired_at(Utc::now().timestamp_millis()) {
            debug!("Cache entry {key} expired");
            self.remove_raw(&storage_key).await;
            return None;
        }

        Some(entry.data)
    }

    pub async fn remove(&self, key: &CacheKey) {
        self.remove_raw(&Self::storage_key(key)).await;
    }

    async fn remove_raw(&self, storage_key: &str) {
        if let Err(e) = self.storage.remove(storage_key).await {
            warn!("Failed to remove cache entry {storage_key}: {e}");
        }
    }

    /// Remove every entry in the cache namespace. Queue entries in the same
    /// store are untouched.
    pub async fn clear_all(&self) {
        let keys = match self.cache_keys().await {
            Some(keys) => keys,
            None => return,
        };
        if keys.is_empty() {
            return;
        }
        if let Err(e) = self.storage.multi_remove(&keys).await {
            warn!("Failed to clear cache namespace: {e}");
        }
    }

    /// Write several entries in one storage round trip. Per-key contract is
    /// identical to [`CacheStore::set`]; there is no cross-key atomicity.
    pub async fn batch_set<T: Serialize>(&self, entries: &[(CacheKey, T, Option<Duration>)]) {
        let mut pairs = Vec::with_capacity(entries.len());
        for (key, value, ttl) in entries {
            if let Some(json) = self.encode(value, *ttl) {
                pairs.push((Self::storage_key(key), json));
            }
        }
        if pairs.is_empty() {
            return;
        }
        if let Err(e) = self.storage.multi_set(&pairs).await {
            warn!("Failed to persist cache batch: {e}");
        }
    }

    /// Read several keys, skipping (and evicting) expired or corrupt entries.
    /// The result maps unprefixed cache keys to their values.
    pub async fn batch_get<T: DeserializeOwned>(&self, keys: &[CacheKey]) -> HashMap<String, T> {
        let storage_keys: Vec<String> = keys.iter().map(Self::storage_key).collect();
        let pairs = match self.storage.multi_get(&storage_keys).await {
            Ok(pairs) => pairs,
            Err(e) => {
                warn!("Cache batch read failed: {e}");
                return HashMap::new();
            }
        };

        let now = Utc::now().timestamp_millis();
        let mut values = HashMap::new();
        let mut stale = Vec::new();
        for (storage_key, raw) in pairs {
            let Some(raw) = raw else { continue };
            match serde_json::from_str::<CacheEntry<T>>(&raw) {
                Ok(entry) if !entry.is_expired_at(now) => {
                    // strip_prefix removes exactly one prefix occurrence; a
                    // caller key that itself starts with "cache_" survives.
                    let key = storage_key
                        .strip_prefix(CACHE_PREFIX)
                        .unwrap_or(&storage_key)
                        .to_string();
                    values.insert(key, entry.data);
                }
                Ok(_) => stale.push(storage_key),
                Err(e) => {
                    warn!("Evicting corrupt cache entry {storage_key}: {e}");
                    stale.push(storage_key);
                }
            }
        }

        if !stale.is_empty() {
            if let Err(e) = self.storage.multi_remove(&stale).await {
                warn!("Failed to evict stale cache entries: {e}");
            }
        }

        values
    }

    /// Serialized footprint of the cache namespace. Informational only, not
    /// enforced as a quota.
    pub async fn size_bytes(&self) -> u64 {
        let keys = match self.cache_keys().await {
            Some(keys) if !keys.is_empty() => keys,
            _ => return 0,
        };
        match self.storage.multi_get(&keys).await {
            Ok(pairs) => pairs
                .into_iter()
                .filter_map(|(_, raw)| raw)
                .map(|raw| raw.len() as u64)
                .sum(),
            Err(e) => {
                warn!("Cache size scan failed: {e}");
                0
            }
        }
    }

    /// Proactive scan complementing the lazy eviction on read; intended to
    /// run periodically. Returns the number of entries removed.
    pub async fn evict_expired(&self) -> u32 {
        let keys = match self.cache_keys().await {
            Some(keys) if !keys.is_empty() => keys,
            _ => return 0,
        };
        let pairs = match self.storage.multi_get(&keys).await {
            Ok(pairs) => pairs,
            Err(e) => {
                warn!("Cache eviction scan failed: {e}");
                return 0;
            }
        };

        let now = Utc::now().timestamp_millis();
        let mut stale = Vec::new();
        for (storage_key, raw) in pairs {
            let Some(raw) = raw else { continue };
            match serde_json::from_str::<CacheEntry<serde_json::Value>>(&raw) {
                Ok(entry) if entry.is_expired_at(now) => stale.push(storage_key),
                Ok(_) => {}
                Err(_) => stale.push(storage_key),
            }
        }

        if stale.is_empty() {
            return 0;
        }
        let count = stale.len() as u32;
        if let Err(e) = self.storage.multi_remove(&stale).await {
            warn!("Failed to evict expired cache entries: {e}");
            return 0;
        }
        debug!(count, "Evicted expired cache entries");
        count
    }

    async fn cache_keys(&self) -> Option<Vec<String>> {
        match self.storage.get_all_keys().await {
            Ok(keys) => Some(
                keys.into_iter()
                    .filter(|k| k.starts_with(CACHE_PREFIX))
                    .collect(),
            ),
            Err(e) => {
                warn!("Cache key scan failed: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::MemoryKeyValueStore;

    fn setup() -> (CacheStore, Arc<MemoryKeyValueStore>) {
        let storage = Arc::new(MemoryKeyValueStore::new());
        (CacheStore::new(storage.clone()), storage)
    }

    fn key(name: &str) -> CacheKey {
        CacheKey::new(name.to_string()).unwrap()
    }

    /// Plants an envelope with an arbitrary write timestamp, bypassing the
    /// store so tests can age entries without sleeping.
    async fn plant_entry(storage: &MemoryKeyValueStore, name: &str, age_ms: i64, ttl_ms: i64) {
        let written_at = Utc::now().timestamp_millis() - age_ms;
        let entry = CacheEntry::new(serde_json::json!({"planted": name}), written_at, ttl_ms);
        storage
            .set(
                &format!("{CACHE_PREFIX}{name}"),
                &serde_json::to_string(&entry).unwrap(),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn set_then_get_returns_value() {
        let (cache, _) = setup();
        cache
            .set(&key("profile"), &vec!["alice", "30"], Some(PROFILE_TTL))
            .await;

        let value: Option<Vec<String>> = cache.get(&key("profile")).await;
        assert_eq!(value, Some(vec!["alice".to_string(), "30".to_string()]));
    }

    #[tokio::test]
    async fn get_on_missing_key_is_none() {
        let (cache, _) = setup();
        let value: Option<String> = cache.get(&key("nope")).await;
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn expired_entry_is_evicted_on_read() {
        let (cache, storage) = setup();
        plant_entry(&storage, "matches", 10_000, 5_000).await;

        let value: Option<serde_json::Value> = cache.get(&key("matches")).await;
        assert!(value.is_none());
        assert!(storage.get("cache_matches").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn entry_within_ttl_survives_read() {
        let (cache, storage) = setup();
        plant_entry(&storage, "matches", 1_000, 5_000).await;

        let value: Option<serde_json::Value> = cache.get(&key("matches")).await;
        assert!(value.is_some());
        assert!(storage.get("cache_matches").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn corrupt_entry_is_treated_as_miss_and_removed() {
        let (cache, storage) = setup();
        storage.set("cache_broken", "{not json").await.unwrap();

        let value: Option<String> = cache.get(&key("broken")).await;
        assert!(value.is_none());
        assert!(storage.get("cache_broken").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let (cache, _) = setup();
        cache.set(&key("a"), &1u32, None).await;
        cache.remove(&key("a")).await;
        cache.remove(&key("a")).await;

        let value: Option<u32> = cache.get(&key("a")).await;
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn clear_all_leaves_other_namespaces_alone() {
        let (cache, storage) = setup();
        cache.set(&key("a"), &1u32, None).await;
        cache.set(&key("b"), &2u32, None).await;
        storage.set("queue_x", "pending").await.unwrap();

        cache.clear_all().await;

        assert!(storage.get("cache_a").await.unwrap().is_none());
        assert!(storage.get("cache_b").await.unwrap().is_none());
        assert_eq!(
            storage.get("queue_x").await.unwrap(),
            Some("pending".to_string())
        );
    }

    #[tokio::test]
    async fn batch_get_skips_and_evicts_expired_entries() {
        let (cache, storage) = setup();
        plant_entry(&storage, "a", 2_000, 1_000).await;
        plant_entry(&storage, "b", 2_000, 100_000).await;

        let values: HashMap<String, serde_json::Value> =
            cache.batch_get(&[key("a"), key("b")]).await;

        assert_eq!(values.len(), 1);
        assert!(values.contains_key("b"));
        assert!(storage.get("cache_a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn batch_get_preserves_keys_that_start_with_the_prefix_word() {
        let (cache, _) = setup();
        cache.set(&key("cache_special"), &7u32, None).await;

        let values: HashMap<String, u32> = cache.batch_get(&[key("cache_special")]).await;
        assert_eq!(values.get("cache_special"), Some(&7));
    }

    #[tokio::test]
    async fn batch_set_round_trips_through_batch_get() {
        let (cache, _) = setup();
        cache
            .batch_set(&[
                (key("a"), 1u32, None),
                (key("b"), 2u32, Some(Duration::from_secs(60))),
            ])
            .await;

        let values: HashMap<String, u32> = cache.batch_get(&[key("a"), key("b")]).await;
        assert_eq!(values.get("a"), Some(&1));
        assert_eq!(values.get("b"), Some(&2));
    }

    #[tokio::test]
    async fn size_bytes_counts_cache_namespace_only() {
        let (cache, storage) = setup();
        assert_eq!(cache.size_bytes().await, 0);

        cache.set(&key("a"), &"payload", None).await;
        storage.set("queue_x", "irrelevant").await.unwrap();

        let size = cache.size_bytes().await;
        let stored = storage.get("cache_a").await.unwrap().unwrap();
        assert_eq!(size, stored.len() as u64);
    }

    #[tokio::test]
    async fn evict_expired_removes_only_stale_entries() {
        let (cache, storage) = setup();
        plant_entry(&storage, "old", 10_000, 1_000).await;
        plant_entry(&storage, "fresh", 1_000, 60_000).await;

        let removed = cache.evict_expired().await;
        assert_eq!(removed, 1);
        assert!(storage.get("cache_old").await.unwrap().is_none());
        assert!(storage.get("cache_fresh").await.unwrap().is_some());
    }
}
