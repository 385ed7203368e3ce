use async_trait::async_trait;
use thiserror::Error;

use crate::domain::value_objects::ActionPayload;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Network unreachable: {0}")]
    Unreachable(String),

    #[error("Server rejected action: {0}")]
    Rejected(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Backend API boundary. Implementations match exhaustively over
/// [`ActionPayload`], so adding an action kind is a compile error here
/// rather than a runtime fallback.
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    async fn execute(&self, payload: &ActionPayload) -> Result<(), DispatchError>;
}
