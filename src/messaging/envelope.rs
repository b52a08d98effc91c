use chrono::Utc;
use lapin::BasicProperties;
use serde::Serialize;

use super::error::PublishError;

// ============================================================================
// Event Envelope - Wire Framing for Outbound Events
// ============================================================================

/// Every event crosses the bus as JSON with these AMQP properties. Consumers
/// on the other side key off the content type, so keep it stable.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Persistent delivery so messages survive a broker restart.
pub const DELIVERY_MODE_PERSISTENT: u8 = 2;

/// A serialized event ready to hand to the broker: routing key, JSON body
/// and the properties that travel with it.
pub struct EventEnvelope {
    routing_key: String,
    payload: Vec<u8>,
    timestamp: u64,
}

impl EventEnvelope {
    /// Serializes `event` for the bus. Fails only on serialization, which
    /// no amount of retrying will fix.
    pub fn encode<T: Serialize>(routing_key: &str, event: &T) -> Result<Self, PublishError> {
        let payload = serde_json::to_vec(event)?;
        Ok(Self {
            routing_key: routing_key.to_string(),
            payload,
            timestamp: Utc::now().timestamp().max(0) as u64,
        })
    }

    pub fn routing_key(&self) -> &str {
        &self.routing_key
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn properties(&self) -> BasicProperties {
        BasicProperties::default()
            .with_content_type(CONTENT_TYPE_JSON.into())
            .with_delivery_mode(DELIVERY_MODE_PERSISTENT)
            .with_timestamp(self.timestamp)
    }
}
