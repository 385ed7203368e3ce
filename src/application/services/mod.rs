pub mod action_queue;
pub mod cache_store;
pub mod sync_service;

pub use action_queue::ActionQueue;
pub use cache_store::CacheStore;
pub use sync_service::{SyncService, SyncStatus};
