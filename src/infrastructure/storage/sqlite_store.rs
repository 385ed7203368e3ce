use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::application::ports::KeyValueStore;
use crate::infrastructure::database::ConnectionPool;
use crate::shared::error::AppError;

/// SQLite-backed key-value primitive, one row per key in `kv_entries`.
/// This is the durable on-device store behind both the cache and the queue.
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
}

impl SqliteKeyValueStore {
    pub fn new(pool: &ConnectionPool) -> Self {
        Self {
            pool: pool.get_pool().clone(),
        }
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT value FROM kv_entries WHERE key = ?1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO kv_entries (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM kv_entries WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_all_keys(&self) -> Result<Vec<String>, AppError> {
        let keys = sqlx::query_scalar::<_, String>("SELECT key FROM kv_entries ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(keys)
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<(String, Option<String>)>, AppError> {
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            out.push((key.clone(), self.get(key).await?));
        }
        Ok(out)
    }

    async fn multi_set(&self, pairs: &[(String, String)]) -> Result<(), AppError> {
        let now = Utc::now().timestamp_millis();
        let mut tx = self.pool.begin().await?;
        for (key, value) in pairs {
            sqlx::query(
                r#"
                INSERT INTO kv_entries (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(key)
            .bind(value)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn multi_remove(&self, keys: &[String]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        for key in keys {
            sqlx::query("DELETE FROM kv_entries WHERE key = ?1")
                .bind(key)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        sqlx::query("DELETE FROM kv_entries")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> SqliteKeyValueStore {
        let pool = ConnectionPool::from_memory().await.unwrap();
        pool.migrate().await.unwrap();
        SqliteKeyValueStore::new(&pool)
    }

    #[tokio::test]
    async fn set_overwrites_existing_value() {
        let store = setup().await;
        store.set("k", "v1").await.unwrap();
        store.set("k", "v2").await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some("v2".to_string()));
    }

    #[tokio::test]
    async fn get_missing_key_is_none() {
        let store = setup().await;
        assert!(store.get("absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn multi_set_and_multi_get_round_trip() {
        let store = setup().await;
        store
            .multi_set(&[
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
            ])
            .await
            .unwrap();

        let pairs = store
            .multi_get(&["a".to_string(), "b".to_string(), "c".to_string()])
            .await
            .unwrap();
        assert_eq!(pairs[0].1, Some("1".to_string()));
        assert_eq!(pairs[1].1, Some("2".to_string()));
        assert_eq!(pairs[2].1, None);
    }

    #[tokio::test]
    async fn multi_remove_deletes_listed_keys_only() {
        let store = setup().await;
        store.set("a", "1").await.unwrap();
        store.set("b", "2").await.unwrap();

        store
            .multi_remove(&["a".to_string(), "missing".to_string()])
            .await
            .unwrap();

        assert!(store.get("a").await.unwrap().is_none());
        assert!(store.get("b").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn get_all_keys_is_sorted() {
        let store = setup().await;
        store.set("queue_z", "1").await.unwrap();
        store.set("cache_a", "2").await.unwrap();

        let keys = store.get_all_keys().await.unwrap();
        assert_eq!(keys, vec!["cache_a".to_string(), "queue_z".to_string()]);
    }

    #[tokio::test]
    async fn clear_empties_the_table() {
        let store = setup().await;
        store.set("a", "1").await.unwrap();
        store.clear().await.unwrap();
        assert!(store.get_all_keys().await.unwrap().is_empty());
    }
}
