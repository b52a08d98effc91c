use crate::domain::ErrorKind;

// ============================================================================
// Customer Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CustomerError {
    #[error("External auth id cannot be empty")]
    EmptyAuthId,

    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Email cannot be empty")]
    EmptyEmail,

    #[error("Points cannot be negative: {0}")]
    NegativePoints(i32),

    #[error("Customer account is inactive")]
    Inactive,

    #[error("Insufficient loyalty points: requested {requested}, available {available}")]
    InsufficientPoints { requested: i32, available: i32 },
}

impl CustomerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyAuthId | Self::EmptyName | Self::EmptyEmail | Self::NegativePoints(_) => {
                ErrorKind::Validation
            }
            Self::Inactive | Self::InsufficientPoints { .. } => ErrorKind::BusinessRule,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
