use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Inbound Integration Events
// ============================================================================
//
// Emitted by the identity service. Deserialization is strict on types but
// tolerant of extra fields, so additive changes upstream do not break us.
//
// ============================================================================

/// Received on `user.registered`; drives customer provisioning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserRegisteredEvent {
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
    pub registered_at: DateTime<Utc>,
}

/// Received on `user.logged-in`; recorded for activity tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserLoggedInEvent {
    pub user_id: Uuid,
    pub email: String,
    pub ip_address: Option<String>,
    pub logged_in_at: DateTime<Utc>,
}

/// Received on `user.logged-out`; recorded for activity tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserLoggedOutEvent {
    pub user_id: Uuid,
    pub logged_out_at: DateTime<Utc>,
}

// ============================================================================
// Unit Tests
// ============================================================================
