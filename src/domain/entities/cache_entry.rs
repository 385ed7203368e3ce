use serde::{Deserialize, Serialize};

/// Envelope persisted around every cached value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    pub written_at: i64,
    pub ttl_ms: i64,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T, written_at: i64, ttl_ms: i64) -> Self {
        Self {
            data,
            written_at,
            ttl_ms,
        }
    }

    /// An entry is readable only while `now - written_at <= ttl`.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms - self.written_at > self.ttl_ms
    }
}
