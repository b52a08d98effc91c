use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::OrderStatus;
use crate::domain::money::Currency;
use crate::domain::DomainEvent;

// ============================================================================
// Order Domain Events
// ============================================================================
//
// Buffered on the aggregate by mutating operations and drained by the
// caller after a successful persist. The publishing seam maps these to the
// outbound integration events.
//
// ============================================================================

/// Union type for everything the order aggregate emits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderDomainEvent {
    Placed(OrderPlaced),
    StatusChanged(OrderStatusChanged),
}

impl DomainEvent for OrderDomainEvent {
    fn event_id(&self) -> Uuid {
        match self {
            Self::Placed(e) => e.event_id,
            Self::StatusChanged(e) => e.event_id,
        }
    }

    fn occurred_on(&self) -> DateTime<Utc> {
        match self {
            Self::Placed(e) => e.occurred_on,
            Self::StatusChanged(e) => e.occurred_on,
        }
    }

    fn event_type(&self) -> &'static str {
        match self {
            Self::Placed(_) => "OrderPlaced",
            Self::StatusChanged(_) => "OrderStatusChanged",
        }
    }
}

/// Order Placed - Pending order accepted for processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPlaced {
    pub event_id: Uuid,
    pub occurred_on: DateTime<Utc>,
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub total_amount: Decimal,
    pub currency: Currency,
    pub order_date: DateTime<Utc>,
}

/// Order Status Changed - lifecycle transition applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusChanged {
    pub event_id: Uuid,
    pub occurred_on: DateTime<Utc>,
    pub order_id: Uuid,
    pub old_status: OrderStatus,
    pub new_status: OrderStatus,
    pub changed_at: DateTime<Utc>,
}
