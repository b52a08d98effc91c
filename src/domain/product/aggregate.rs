use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::ProductError;
use super::events::{LowStock, ProductDomainEvent, ProductStockChanged};
use crate::domain::money::Money;

// ============================================================================
// Product Aggregate - Stock Management
// ============================================================================

/// Catalog product with an absolute stock level and a low-stock alert
/// threshold. Stock never goes below zero; writes to an inactive product
/// are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    id: Uuid,
    name: String,
    sku: String,
    category: String,
    price: Money,
    stock_quantity: i32,
    threshold_level: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,

    #[serde(skip)]
    events: Vec<ProductDomainEvent>,
}

impl Product {
    pub fn create(
        name: &str,
        sku: &str,
        category: &str,
        price: Money,
        stock_quantity: i32,
        threshold_level: i32,
    ) -> Result<Self, ProductError> {
        if name.trim().is_empty() {
            return Err(ProductError::EmptyName);
        }
        if sku.trim().is_empty() {
            return Err(ProductError::EmptySku);
        }
        if stock_quantity < 0 {
            return Err(ProductError::NegativeStock(stock_quantity));
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            sku: sku.trim().to_string(),
            category: category.to_string(),
            price,
            stock_quantity,
            threshold_level,
            is_active: true,
            created_at: now,
            updated_at: now,
            events: Vec::new(),
        })
    }

    // ------------------------------------------------------------------
    // Stock
    // ------------------------------------------------------------------

    /// Set the absolute stock level. Negative input is floored at zero.
    /// Emits `ProductStockChanged`, plus `LowStock` when the new level sits
    /// at or below the threshold.
    pub fn update_stock(&mut self, quantity: i32, reason: &str) -> Result<(), ProductError> {
        if !self.is_active {
            return Err(ProductError::Inactive);
        }

        let old_stock = self.stock_quantity;
        self.stock_quantity = quantity.max(0);
        self.updated_at = Utc::now();

        self.events
            .push(ProductDomainEvent::StockChanged(ProductStockChanged {
                event_id: Uuid::new_v4(),
                occurred_on: Utc::now(),
                product_id: self.id,
                old_stock,
                new_stock: self.stock_quantity,
                reason: reason.to_string(),
            }));

        if self.should_trigger_low_stock_alert() {
            self.events.push(ProductDomainEvent::LowStock(LowStock {
                event_id: Uuid::new_v4(),
                occurred_on: Utc::now(),
                product_id: self.id,
                current_stock: self.stock_quantity,
                threshold_level: self.threshold_level,
            }));
        }

        Ok(())
    }

    pub fn reduce_stock(&mut self, quantity: i32) -> Result<(), ProductError> {
        if quantity <= 0 {
            return Err(ProductError::InvalidQuantity(quantity));
        }
        if !self.can_fulfill(quantity) {
            return Err(ProductError::InsufficientStock {
                requested: quantity,
                available: self.stock_quantity,
            });
        }

        let reason = format!("Stock reduced by {}", quantity);
        self.update_stock(self.stock_quantity - quantity, &reason)
    }

    pub fn increase_stock(&mut self, quantity: i32) -> Result<(), ProductError> {
        if quantity <= 0 {
            return Err(ProductError::InvalidQuantity(quantity));
        }

        let reason = format!("Stock increased by {}", quantity);
        self.update_stock(self.stock_quantity + quantity, &reason)
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock_quantity > 0 && self.is_active
    }

    /// Stock check used by the order aggregate before adding a line.
    pub fn can_fulfill(&self, requested_quantity: i32) -> bool {
        self.stock_quantity >= requested_quantity && self.is_active
    }

    pub fn should_trigger_low_stock_alert(&self) -> bool {
        self.stock_quantity <= self.threshold_level && self.is_active
    }

    pub fn update_threshold_level(&mut self, threshold_level: i32) -> Result<(), ProductError> {
        if threshold_level < 0 {
            return Err(ProductError::NegativeThreshold(threshold_level));
        }

        self.threshold_level = threshold_level;
        self.updated_at = Utc::now();

        if self.should_trigger_low_stock_alert() {
            self.events.push(ProductDomainEvent::LowStock(LowStock {
                event_id: Uuid::new_v4(),
                occurred_on: Utc::now(),
                product_id: self.id,
                current_stock: self.stock_quantity,
                threshold_level: self.threshold_level,
            }));
        }

        Ok(())
    }

    pub fn activate(&mut self) {
        self.is_active = true;
        self.updated_at = Utc::now();
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }

    /// Remove and return all buffered events, leaving the buffer empty.
    pub fn drain_events(&mut self) -> Vec<ProductDomainEvent> {
        self.events.drain(..).collect()
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn price(&self) -> &Money {
        &self.price
    }

    pub fn stock_quantity(&self) -> i32 {
        self.stock_quantity
    }

    pub fn threshold_level(&self) -> i32 {
        self.threshold_level
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
