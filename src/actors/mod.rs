// ============================================================================
// Actors Module
// ============================================================================
//
// Actor-based infrastructure for asynchronous, concurrent operations.
//
// Structure:
// - core/           - Shared health types
// - infrastructure/ - Concrete infrastructure actors (Consumer, Health)
//
// Note: Domain logic (Order, Product, Customer) stays in plain aggregates.
//       Actors are reserved for infrastructure concerns only.
//
// ============================================================================

// Private module declarations
mod core;
mod infrastructure;

// Re-export only what's needed in the public API
pub use self::core::HealthStatus;
pub use infrastructure::{
    ConsumerActor,
    GetSystemHealth,
    HealthMonitorActor,
    StopConsuming,
    SystemHealth,
    UpdateHealth,
};
