//! Offline-first data core for the Enishi matchmaking client: a cache store
//! with per-entry expiry, a durable action queue with bounded retry, and a
//! sync service that drains the queue when connectivity returns.
//!
//! The host application owns the composition root: it builds a
//! [`KeyValueStore`](application::ports::KeyValueStore) (SQLite on device),
//! wraps it in [`CacheStore`] and [`ActionQueue`], and hands both plus its
//! network monitor and API executor to [`SyncService`].

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

use tracing::info;
use tracing_subscriber::EnvFilter;

pub use application::services::{ActionQueue, CacheStore, SyncService, SyncStatus};
pub use domain::entities::{CacheEntry, DrainReport, QueuedAction, SyncEvent};
pub use domain::value_objects::{ActionId, ActionKind, ActionPayload, CacheKey};
pub use shared::config::AppConfig;
pub use shared::error::{AppError, Result};

/// Install a tracing subscriber for hosts that do not bring their own.
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok();
    if installed {
        info!("Enishi offline core logging initialized");
    }
}
