use thiserror::Error;

use crate::utils::IsTransient;

// ============================================================================
// Messaging Errors
// ============================================================================

/// Failure modes of publishing an event to the broker.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The payload could not be serialized. Retrying cannot fix this.
    #[error("failed to serialize event payload: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The channel dropped out from under us, usually because the
    /// connection died.
    #[error("channel is no longer connected")]
    ChannelClosed,

    #[error("broker error: {0}")]
    Broker(#[from] lapin::Error),

    /// The circuit breaker is open and rejected the publish outright.
    #[error("publish rejected, circuit breaker is open")]
    CircuitOpen,
}

impl IsTransient for PublishError {
    fn is_transient(&self) -> bool {
        match self {
            PublishError::Serialization(_) => false,
            PublishError::ChannelClosed => true,
            PublishError::Broker(_) => true,
            PublishError::CircuitOpen => false,
        }
    }
}
