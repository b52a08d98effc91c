// ============================================================================
// Order Domain - Business Logic for the Order Aggregate
// ============================================================================
//
// Everything Order-specific lives here:
// - Value objects (OrderNumber, OrderStatus, ShippingAddress, OrderItem)
// - Domain events (OrderPlaced, OrderStatusChanged)
// - Errors (OrderError enum)
// - Aggregate (Order with composition and lifecycle rules)
//
// ============================================================================

pub mod aggregate;
pub mod errors;
pub mod events;
pub mod value_objects;

// Re-export for convenience
pub use aggregate::*;
pub use errors::*;
pub use events::*;
pub use value_objects::*;
