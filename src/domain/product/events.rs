use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainEvent;

// ============================================================================
// Product Domain Events
// ============================================================================

/// Union type for everything the product aggregate emits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ProductDomainEvent {
    StockChanged(ProductStockChanged),
    LowStock(LowStock),
}

impl DomainEvent for ProductDomainEvent {
    fn event_id(&self) -> Uuid {
        match self {
            Self::StockChanged(e) => e.event_id,
            Self::LowStock(e) => e.event_id,
        }
    }

    fn occurred_on(&self) -> DateTime<Utc> {
        match self {
            Self::StockChanged(e) => e.occurred_on,
            Self::LowStock(e) => e.occurred_on,
        }
    }

    fn event_type(&self) -> &'static str {
        match self {
            Self::StockChanged(_) => "ProductStockChanged",
            Self::LowStock(_) => "LowStock",
        }
    }
}

/// Product Stock Changed - absolute stock level moved, with the reason
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductStockChanged {
    pub event_id: Uuid,
    pub occurred_on: DateTime<Utc>,
    pub product_id: Uuid,
    pub old_stock: i32,
    pub new_stock: i32,
    pub reason: String,
}

/// Low Stock - stock sits at or below the alert threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LowStock {
    pub event_id: Uuid,
    pub occurred_on: DateTime<Utc>,
    pub product_id: Uuid,
    pub current_stock: i32,
    pub threshold_level: i32,
}
