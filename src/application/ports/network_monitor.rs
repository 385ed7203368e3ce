use async_trait::async_trait;
use tokio::sync::watch;

/// Connectivity signal consumed by the sync service. `subscribe` yields the
/// current state and every subsequent transition; the sync service reacts to
/// disconnected-to-connected edges only.
#[async_trait]
pub trait NetworkMonitor: Send + Sync {
    async fn is_connected(&self) -> bool;
    fn subscribe(&self) -> watch::Receiver<bool>;
}
