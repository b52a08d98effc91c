use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::customer::Customer;
use crate::domain::order::Order;
use crate::domain::product::Product;

// ============================================================================
// Outbound Integration Events
// ============================================================================

/// Published on `order.created` after a new order is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderCreatedEvent {
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub customer_email: String,
    pub customer_name: String,
    pub total_amount: Decimal,
    pub currency: String,
    pub item_count: i32,
    pub shipping_address: String,
    pub created_at: DateTime<Utc>,
}

impl OrderCreatedEvent {
    pub fn from_order(order: &Order, customer: &Customer) -> Self {
        Self {
            order_id: order.id(),
            customer_id: customer.id(),
            customer_email: customer.email().to_string(),
            customer_name: customer.name().to_string(),
            total_amount: order.total_amount().amount(),
            currency: order.currency().as_str().to_string(),
            item_count: order.items().len() as i32,
            shipping_address: order
                .shipping_address()
                .map(|address| address.formatted())
                .unwrap_or_default(),
            created_at: order.created_at(),
        }
    }
}

/// Published on `order.shipped` once a tracking number is assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderShippedEvent {
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub customer_email: String,
    pub customer_name: String,
    pub tracking_number: String,
    pub carrier: String,
    pub shipped_at: DateTime<Utc>,
    pub shipping_address: String,
}

impl OrderShippedEvent {
    pub fn from_order(order: &Order, customer: &Customer, carrier: &str) -> Self {
        Self {
            order_id: order.id(),
            customer_id: customer.id(),
            customer_email: customer.email().to_string(),
            customer_name: customer.name().to_string(),
            tracking_number: order.tracking_number().unwrap_or_default().to_string(),
            carrier: carrier.to_string(),
            shipped_at: Utc::now(),
            shipping_address: order
                .shipping_address()
                .map(|address| address.formatted())
                .unwrap_or_default(),
        }
    }
}

/// Published on `product.out-of-stock` when stock crosses from above the
/// threshold to at-or-below it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductOutOfStockEvent {
    pub product_id: Uuid,
    pub product_name: String,
    #[serde(rename = "SKU")]
    pub sku: String,
    pub current_stock: i32,
    pub threshold_level: i32,
    pub detected_at: DateTime<Utc>,
}

impl ProductOutOfStockEvent {
    pub fn from_product(product: &Product) -> Self {
        Self {
            product_id: product.id(),
            product_name: product.name().to_string(),
            sku: product.sku().to_string(),
            current_stock: product.stock_quantity(),
            threshold_level: product.threshold_level(),
            detected_at: Utc::now(),
        }
    }
}

/// Published on `feedback.received` for the notification service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FeedbackReceivedEvent {
    pub feedback_id: Uuid,
    pub customer_id: Uuid,
    pub customer_email: String,
    pub customer_name: String,
    pub product_id: Option<Uuid>,
    pub product_name: Option<String>,
    pub order_id: Option<Uuid>,
    pub content: String,
    pub rating: i32,
    pub submitted_at: DateTime<Utc>,
}

// ============================================================================
// Unit Tests
// ============================================================================
