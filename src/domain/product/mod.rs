// ============================================================================
// Product Domain - Stock Management and Low-Stock Alerting
// ============================================================================

pub mod aggregate;
pub mod errors;
pub mod events;

// Re-export for convenience
pub use aggregate::*;
pub use errors::*;
pub use events::*;
