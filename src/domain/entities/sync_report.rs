use serde::{Deserialize, Serialize};

use super::queued_action::QueuedAction;

/// Outcome of one drain pass over the action queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrainReport {
    /// Actions dispatched and removed.
    pub dispatched: u32,
    /// Actions that failed and were kept for a later pass.
    pub retried: u32,
    /// Actions permanently dropped after exhausting their retry budget.
    pub dropped: u32,
}

impl DrainReport {
    pub fn is_empty(&self) -> bool {
        self.dispatched == 0 && self.retried == 0 && self.dropped == 0
    }
}

/// Emitted on the sync event channel so hosts can surface outcomes that the
/// original enqueue caller never sees, dropped actions in particular.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncEvent {
    ActionSynced {
        action: QueuedAction,
    },
    ActionDropped {
        action: QueuedAction,
        last_error: Option<String>,
    },
}
