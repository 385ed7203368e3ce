use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::ports::KeyValueStore;
use crate::domain::entities::QueuedAction;
use crate::domain::value_objects::{ActionId, ActionPayload};
use crate::shared::error::Result;

/// Namespace prefix in the persisted key-value store.
pub const QUEUE_PREFIX: &str = "queue_";

pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Durable holding area for mutations that could not reach the network.
/// The persisted store is the only source of truth; every operation
/// round-trips through it.
pub struct ActionQueue {
    storage: Arc<dyn KeyValueStore>,
}

impl ActionQueue {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    fn storage_key(id: &ActionId) -> String {
        format!("{QUEUE_PREFIX}{id}")
    }

    /// Capture a mutation for later dispatch. `max_retries` defaults to
    /// [`DEFAULT_MAX_RETRIES`] when not overridden.
    pub async fn enqueue(
        &self,
        payload: ActionPayload,
        max_retries: Option<u32>,
    ) -> Result<QueuedAction> {
        let action = QueuedAction::new(payload, max_retries.unwrap_or(DEFAULT_MAX_RETRIES));
        self.persist(&action).await?;
        debug!(id = %action.id, kind = %action.kind(), "Queued offline action");
        Ok(action)
    }

    /// All pending actions ascending by enqueue time (id as tie-breaker);
    /// this defines dispatch order. Stored entries that no longer parse are
    /// removed rather than replayed.
    pub async fn list(&self) -> Result<Vec<QueuedAction>> {
        let keys = self.queue_keys().await?;
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let pairs = self.storage.multi_get(&keys).await?;
        let mut actions = Vec::with_capacity(pairs.len());
        let mut malformed = Vec::new();
        for (key, raw) in pairs {
            let Some(raw) = raw else { continue };
            match serde_json::from_str::<QueuedAction>(&raw) {
                Ok(action) => actions.push(action),
                Err(e) => {
                    warn!("Removing malformed queued action {key}: {e}");
                    malformed.push(key);
                }
            }
        }

        if !malformed.is_empty() {
            if let Err(e) = self.storage.multi_remove(&malformed).await {
                warn!("Failed to remove malformed queued actions: {e}");
            }
        }

        actions.sort_by(|a, b| {
            a.enqueued_at
                .cmp(&b.enqueued_at)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        Ok(actions)
    }

    /// Idempotent; removing an id that is not queued is a no-op.
    pub async fn remove(&self, id: &ActionId) -> Result<()> {
        self.storage.remove(&Self::storage_key(id)).await
    }

    /// Persist a mutated action, typically a retry-count write-back.
    pub async fn update(&self, action: &QueuedAction) -> Result<()> {
        self.persist(action).await
    }

    pub async fn pending_count(&self) -> Result<usize> {
        Ok(self.queue_keys().await?.len())
    }

    async fn queue_keys(&self) -> Result<Vec<String>> {
        Ok(self
            .storage
            .get_all_keys()
            .await?
            .into_iter()
            .filter(|k| k.starts_with(QUEUE_PREFIX))
            .collect())
    }

    async fn persist(&self, action: &QueuedAction) -> Result<()> {
        let json = serde_json::to_string(action)?;
        self.storage.set(&Self::storage_key(&action.id), &json).await
    }
}
