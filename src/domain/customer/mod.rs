// ============================================================================
// Customer Domain - Provisioning and Loyalty
// ============================================================================

pub mod aggregate;
pub mod errors;

// Re-export for convenience
pub use aggregate::*;
pub use errors::*;
