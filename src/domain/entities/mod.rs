mod cache_entry;
mod queued_action;
mod sync_report;

pub use cache_entry::CacheEntry;
pub use queued_action::QueuedAction;
pub use sync_report::{DrainReport, SyncEvent};
