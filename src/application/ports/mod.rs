pub mod key_value_store;
pub mod network_monitor;
pub mod remote_executor;

pub use key_value_store::KeyValueStore;
pub use network_monitor::NetworkMonitor;
pub use remote_executor::{DispatchError, RemoteExecutor};
