#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{mpsc, watch, Notify, Semaphore};

use enishi_offline::application::ports::{
    DispatchError, KeyValueStore, NetworkMonitor, RemoteExecutor,
};
use enishi_offline::infrastructure::storage::MemoryKeyValueStore;
use enishi_offline::{ActionKind, ActionPayload, ActionQueue, SyncEvent, SyncService};

/// Scriptable connectivity source backed by a watch channel.
pub struct FakeNetworkMonitor {
    tx: watch::Sender<bool>,
}

impl FakeNetworkMonitor {
    pub fn new(connected: bool) -> Self {
        let (tx, _) = watch::channel(connected);
        Self { tx }
    }

    pub fn set_connected(&self, connected: bool) {
        let _ = self.tx.send(connected);
    }
}

#[async_trait]
impl NetworkMonitor for FakeNetworkMonitor {
    async fn is_connected(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Executor that records every dispatched payload and fails on demand,
/// either across the board or for selected action kinds.
pub struct RecordingExecutor {
    fail_all: AtomicBool,
    fail_kinds: Mutex<HashSet<ActionKind>>,
    calls: Mutex<Vec<ActionPayload>>,
}

impl RecordingExecutor {
    pub fn succeeding() -> Self {
        Self {
            fail_all: AtomicBool::new(false),
            fail_kinds: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        let executor = Self::succeeding();
        executor.fail_all.store(true, Ordering::SeqCst);
        executor
    }

    pub fn failing_kind(kind: ActionKind) -> Self {
        let executor = Self::succeeding();
        executor.fail_kinds.lock().unwrap().insert(kind);
        executor
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    pub fn recorded(&self) -> Vec<ActionPayload> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteExecutor for RecordingExecutor {
    async fn execute(&self, payload: &ActionPayload) -> Result<(), DispatchError> {
        self.calls.lock().unwrap().push(payload.clone());
        let fail = self.fail_all.load(Ordering::SeqCst)
            || self.fail_kinds.lock().unwrap().contains(&payload.kind());
        if fail {
            Err(DispatchError::Rejected("scripted failure".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Executor that parks inside `execute` until released, for overlapping-drain
/// tests.
pub struct GatedExecutor {
    pub entered: Notify,
    gate: Semaphore,
    pub calls: AtomicUsize,
}

impl GatedExecutor {
    pub fn new() -> Self {
        Self {
            entered: Notify::new(),
            gate: Semaphore::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn release(&self) {
        self.gate.add_permits(100);
    }
}

#[async_trait]
impl RemoteExecutor for GatedExecutor {
    async fn execute(&self, _payload: &ActionPayload) -> Result<(), DispatchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| DispatchError::Internal(e.to_string()))?;
        permit.forget();
        Ok(())
    }
}

pub struct SyncHarness {
    pub service: Arc<SyncService>,
    pub queue: Arc<ActionQueue>,
    pub monitor: Arc<FakeNetworkMonitor>,
    pub events: mpsc::UnboundedReceiver<SyncEvent>,
}

pub fn memory_harness(connected: bool, executor: Arc<dyn RemoteExecutor>) -> SyncHarness {
    let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
    harness_on(storage, connected, executor)
}

pub fn harness_on(
    storage: Arc<dyn KeyValueStore>,
    connected: bool,
    executor: Arc<dyn RemoteExecutor>,
) -> SyncHarness {
    let queue = Arc::new(ActionQueue::new(storage));
    let monitor = Arc::new(FakeNetworkMonitor::new(connected));
    let (tx, rx) = mpsc::unbounded_channel();
    let service = Arc::new(SyncService::new(
        queue.clone(),
        monitor.clone(),
        executor,
        tx,
    ));
    SyncHarness {
        service,
        queue,
        monitor,
        events: rx,
    }
}

pub fn send_message(to: &str, text: &str) -> ActionPayload {
    ActionPayload::SendMessage {
        to: to.to_string(),
        text: text.to_string(),
    }
}

pub fn like_profile(user_id: &str) -> ActionPayload {
    ActionPayload::LikeProfile {
        user_id: user_id.to_string(),
    }
}

/// Polls until the queue is empty or the deadline passes.
pub async fn wait_for_empty_queue(queue: &ActionQueue) -> bool {
    for _ in 0..200 {
        if queue.list().await.unwrap().is_empty() {
            return true;
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
    }
    false
}
