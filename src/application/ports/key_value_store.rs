use async_trait::async_trait;

use crate::shared::error::AppError;

/// Flat string-key / string-value persistence primitive. The cache store and
/// the action queue partition this namespace by key prefix and are the only
/// callers; nothing above them reaches the storage engine directly.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
    async fn remove(&self, key: &str) -> Result<(), AppError>;
    async fn get_all_keys(&self) -> Result<Vec<String>, AppError>;
    async fn multi_get(&self, keys: &[String]) -> Result<Vec<(String, Option<String>)>, AppError>;
    async fn multi_set(&self, pairs: &[(String, String)]) -> Result<(), AppError>;
    async fn multi_remove(&self, keys: &[String]) -> Result<(), AppError>;
    async fn clear(&self) -> Result<(), AppError>;
}
