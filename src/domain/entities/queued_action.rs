use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ActionId, ActionKind, ActionPayload};

/// A mutation captured while offline, awaiting dispatch to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedAction {
    pub id: ActionId,
    pub payload: ActionPayload,
    /// Epoch milliseconds; defines dispatch order.
    pub enqueued_at: i64,
    pub retry_count: u32,
    pub max_retries: u32,
}

impl QueuedAction {
    pub fn new(payload: ActionPayload, max_retries: u32) -> Self {
        let enqueued_at = Utc::now().timestamp_millis();
        let id = ActionId::generate(payload.kind().as_str(), enqueued_at);
        Self {
            id,
            payload,
            enqueued_at,
            retry_count: 0,
            max_retries,
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.payload.kind()
    }

    /// True once the retry budget is used up: the next failure drops the
    /// action instead of re-queueing it.
    pub fn retries_exhausted(&self) -> bool {
        self.retry_count >= self.max_retries
    }

    pub fn record_failure(&mut self) {
        self.retry_count = self.retry_count.saturating_add(1);
    }
}
