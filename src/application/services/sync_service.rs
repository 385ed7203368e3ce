use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

use crate::application::ports::{NetworkMonitor, RemoteExecutor};
use crate::application::services::ActionQueue;
use crate::domain::entities::{DrainReport, QueuedAction, SyncEvent};
use crate::shared::metrics::{SyncMetrics, SyncMetricsSnapshot};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SyncStatus {
    pub is_syncing: bool,
    pub pending_actions: u32,
    pub last_sync: Option<i64>,
    pub sync_errors: u32,
}

/// Replays queued actions against the backend when connectivity allows.
/// One drain pass runs at a time; the `is_syncing` flag is the only
/// concurrency control and makes overlapping triggers no-ops.
pub struct SyncService {
    queue: Arc<ActionQueue>,
    network: Arc<dyn NetworkMonitor>,
    executor: Arc<dyn RemoteExecutor>,
    status: Arc<RwLock<SyncStatus>>,
    events: mpsc::UnboundedSender<SyncEvent>,
    metrics: Arc<SyncMetrics>,
}

impl SyncService {
    pub fn new(
        queue: Arc<ActionQueue>,
        network: Arc<dyn NetworkMonitor>,
        executor: Arc<dyn RemoteExecutor>,
        events: mpsc::UnboundedSender<SyncEvent>,
    ) -> Self {
        Self {
            queue,
            network,
            executor,
            status: Arc::new(RwLock::new(SyncStatus {
                is_syncing: false,
                pending_actions: 0,
                last_sync: None,
                sync_errors: 0,
            })),
            events,
            metrics: Arc::new(SyncMetrics::new()),
        }
    }

    /// Drain the queue once. A trigger while a drain is already running
    /// returns an empty report without side effects.
    pub async fn sync_now(&self) -> DrainReport {
        {
            let mut status = self.status.write().await;
            if status.is_syncing {
                debug!("Drain already in progress; skipping trigger");
                return DrainReport::default();
            }
            status.is_syncing = true;
        }

        let report = self.drain().await;
        let pending = self.queue.pending_count().await.unwrap_or(0);

        let mut status = self.status.write().await;
        status.is_syncing = false;
        status.last_sync = Some(Utc::now().timestamp_millis());
        status.pending_actions = pending as u32;
        status.sync_errors = status
            .sync_errors
            .saturating_add(report.retried + report.dropped);

        report
    }

    async fn drain(&self) -> DrainReport {
        let mut report = DrainReport::default();

        if !self.network.is_connected().await {
            debug!("Still offline; nothing to drain");
            return report;
        }

        let actions = match self.queue.list().await {
            Ok(actions) => actions,
            Err(e) => {
                warn!("Could not load action queue: {e}");
                return report;
            }
        };
        if actions.is_empty() {
            return report;
        }

        info!(count = actions.len(), "Draining offline action queue");
        for action in actions {
            match self.executor.execute(&action.payload).await {
                Ok(()) => self.on_dispatched(action, &mut report).await,
                Err(e) => self.on_failed(action, e.to_string(), &mut report).await,
            }
        }

        report
    }

    async fn on_dispatched(&self, action: QueuedAction, report: &mut DrainReport) {
        if let Err(e) = self.queue.remove(&action.id).await {
            warn!(id = %action.id, "Failed to remove dispatched action: {e}");
        }
        self.metrics.record_success();
        report.dispatched += 1;
        let _ = self.events.send(SyncEvent::ActionSynced { action });
    }

    /// A failed dispatch either burns one retry or, once the budget is gone,
    /// drops the action permanently. Drops are surfaced on the event channel;
    /// the original enqueue caller has no other way to hear about them.
    async fn on_failed(&self, mut action: QueuedAction, error: String, report: &mut DrainReport) {
        self.metrics.record_failure();

        if action.retries_exhausted() {
            warn!(
                id = %action.id,
                retries = action.retry_count,
                "Dropping action after exhausted retries: {error}"
            );
            if let Err(e) = self.queue.remove(&action.id).await {
                warn!(id = %action.id, "Failed to remove dropped action: {e}");
            }
            self.metrics.record_drop();
            report.dropped += 1;
            let _ = self.events.send(SyncEvent::ActionDropped {
                action,
                last_error: Some(error),
            });
        } else {
            action.record_failure();
            debug!(
                id = %action.id,
                retry = action.retry_count,
                max = action.max_retries,
                "Dispatch failed; retrying on a later pass: {error}"
            );
            if let Err(e) = self.queue.update(&action).await {
                warn!(id = %action.id, "Failed to persist retry count: {e}");
            }
            report.retried += 1;
        }
    }

    pub async fn status(&self) -> SyncStatus {
        self.status.read().await.clone()
    }

    pub fn metrics(&self) -> SyncMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Watch connectivity and drain on every disconnected-to-connected edge.
    /// The task ends when the network monitor drops its sender.
    pub fn spawn_connectivity_watcher(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let service = self;
        // Subscribe and snapshot the current state before spawning, so a
        // transition fired between this call and the task's first poll is
        // observed as an edge rather than folded into the initial state.
        let mut rx = service.network.subscribe();
        let initial_connected = *rx.borrow();
        tokio::spawn(async move {
            let mut was_connected = initial_connected;
            while rx.changed().await.is_ok() {
                let connected = *rx.borrow();
                if connected && !was_connected {
                    info!("Connectivity restored; draining action queue");
                    let report = service.sync_now().await;
                    if !report.is_empty() {
                        info!(
                            dispatched = report.dispatched,
                            retried = report.retried,
                            dropped = report.dropped,
                            "Drain pass complete"
                        );
                    }
                }
                was_connected = connected;
            }
        })
    }
}
