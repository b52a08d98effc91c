// ============================================================================
// Core Actor Abstractions
// ============================================================================
//
// Generic, reusable types shared by the infrastructure actors.
//
// ============================================================================

pub mod health;

// Re-export core types
pub use health::*;
