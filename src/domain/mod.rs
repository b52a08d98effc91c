use chrono::{DateTime, Utc};
use uuid::Uuid;

// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// This module contains domain-specific aggregates and business logic.
// Each aggregate has its own subdirectory with:
// - Value objects
// - Events
// - Errors
// - Aggregate implementation
//
// Aggregates are plain mutable objects. Every mutating operation validates
// its preconditions, applies the change, and buffers any domain events on
// the aggregate itself. The caller persists the aggregate, then drains the
// buffer and hands the events to the publishing layer.
//
// ============================================================================

pub mod customer;
pub mod money;
pub mod order;
pub mod product;

/// Classification of domain rejections, so callers can map outcomes to
/// different external responses without matching on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input: empty ids, non-positive quantities, negative prices.
    Validation,
    /// Input was well-formed but the operation is not allowed in the current
    /// state: insufficient stock, illegal status transition, empty order.
    BusinessRule,
    /// A referenced entity does not exist.
    NotFound,
}

/// Common surface of all buffered domain events.
pub trait DomainEvent {
    /// Unique identity of this event occurrence
    fn event_id(&self) -> Uuid;

    /// When the event occurred
    fn occurred_on(&self) -> DateTime<Utc>;

    /// Event type name for logging and routing decisions
    fn event_type(&self) -> &'static str;
}
