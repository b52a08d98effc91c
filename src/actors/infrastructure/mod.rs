// ============================================================================
// Infrastructure Actors
// ============================================================================
//
// Actors for system concerns:
// - Queue consumption lifecycle
// - Health monitoring
//
// ============================================================================

// Private module declarations
mod consumer;
mod health_monitor;

// Re-export for public API
pub use consumer::{ConsumerActor, StopConsuming};
pub use health_monitor::{HealthMonitorActor, UpdateHealth, GetSystemHealth, SystemHealth};
