use async_trait::async_trait;
use thiserror::Error;

use crate::utils::IsTransient;

// ============================================================================
// Event Handlers - One Handler per Inbound Routing Key
// ============================================================================

pub mod registry;
pub mod user_events;

pub use registry::{DispatchOutcome, EventDispatcher, HandlerRegistry};
pub use user_events::{UserLoggedInHandler, UserLoggedOutHandler, UserRegisteredHandler};

/// Why a handler could not process a delivery.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The payload does not parse as the expected event shape. Redelivery
    /// will produce the same bytes, so this is permanent.
    #[error("malformed event payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// The event was understood but a domain rule rejected it.
    #[error("domain rule rejected event: {0}")]
    Domain(String),

    /// Storage failed; the same delivery may succeed later.
    #[error("repository error: {0}")]
    Repository(#[from] anyhow::Error),
}

impl IsTransient for HandlerError {
    fn is_transient(&self) -> bool {
        match self {
            HandlerError::MalformedPayload(_) => false,
            HandlerError::Domain(_) => false,
            HandlerError::Repository(_) => true,
        }
    }
}

/// Handlers own their dependencies and must be safe to call concurrently.
/// Deliveries may arrive more than once, so handlers have to tolerate
/// duplicates.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// The routing key this handler subscribes to.
    fn routing_key(&self) -> &'static str;

    /// Process one delivery. Returning an error requeues the message.
    async fn handle(&self, payload: &[u8]) -> Result<(), HandlerError>;
}
