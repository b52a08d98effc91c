use rust_decimal::Decimal;
use uuid::Uuid;

use super::value_objects::OrderStatus;
use crate::domain::money::MoneyError;
use crate::domain::ErrorKind;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Customer id cannot be nil")]
    MissingCustomer,

    #[error("Order id cannot be nil")]
    MissingOrderId,

    #[error("Product id cannot be nil")]
    MissingProductId,

    #[error("Invalid order number: {0}")]
    InvalidOrderNumber(String),

    #[error("Quantity must be positive: {0}")]
    InvalidQuantity(i32),

    #[error("Discount {discount} exceeds line amount {gross}")]
    DiscountExceedsTotal { discount: Decimal, gross: Decimal },

    #[error("Cannot place an order with no items")]
    EmptyOrder,

    #[error("Order can only be modified while pending, current status: {0}")]
    NotPending(OrderStatus),

    #[error("Cannot transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order in {0} status cannot be cancelled")]
    NotCancellable(OrderStatus),

    #[error("Tracking numbers apply to shipped orders only, current status: {0}")]
    NotShipped(OrderStatus),

    #[error("Tracking number cannot be empty")]
    EmptyTrackingNumber,

    #[error("Order item {0} not found")]
    ItemNotFound(Uuid),

    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: Uuid,
        requested: i32,
        available: i32,
    },

    #[error(transparent)]
    Money(#[from] MoneyError),
}

impl OrderError {
    /// Coarse classification used by callers mapping rejections to external
    /// responses.
    #[allow(dead_code)]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCustomer
            | Self::MissingOrderId
            | Self::MissingProductId
            | Self::InvalidOrderNumber(_)
            | Self::InvalidQuantity(_)
            | Self::DiscountExceedsTotal { .. }
            | Self::EmptyTrackingNumber
            | Self::Money(_) => ErrorKind::Validation,

            Self::EmptyOrder
            | Self::NotPending(_)
            | Self::InvalidTransition { .. }
            | Self::NotCancellable(_)
            | Self::NotShipped(_)
            | Self::InsufficientStock { .. } => ErrorKind::BusinessRule,

            Self::ItemNotFound(_) => ErrorKind::NotFound,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
