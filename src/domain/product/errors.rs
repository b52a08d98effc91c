use crate::domain::ErrorKind;

// ============================================================================
// Product Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("Product name cannot be empty")]
    EmptyName,

    #[error("SKU cannot be empty")]
    EmptySku,

    #[error("Stock quantity cannot be negative: {0}")]
    NegativeStock(i32),

    #[error("Threshold level cannot be negative: {0}")]
    NegativeThreshold(i32),

    #[error("Product is inactive")]
    Inactive,

    #[error("Quantity must be positive: {0}")]
    InvalidQuantity(i32),

    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i32, available: i32 },
}

impl ProductError {
    #[allow(dead_code)]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyName
            | Self::EmptySku
            | Self::NegativeStock(_)
            | Self::NegativeThreshold(_)
            | Self::InvalidQuantity(_) => ErrorKind::Validation,

            Self::Inactive | Self::InsufficientStock { .. } => ErrorKind::BusinessRule,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
