use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::OrderError;
use super::events::{OrderDomainEvent, OrderPlaced, OrderStatusChanged};
use super::value_objects::{OrderItem, OrderNumber, OrderStatus, ShippingAddress};
use crate::domain::money::{Currency, Money, MoneyError};
use crate::domain::product::Product;

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================

/// Aggregate root for a sales order. Composition is only allowed while the
/// order is Pending; afterwards the lifecycle is driven exclusively through
/// the status transition table. After every mutating operation
/// `total_amount` equals the sum of the item subtotals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    id: Uuid,
    order_number: OrderNumber,
    customer_id: Uuid,
    order_date: DateTime<Utc>,
    status: OrderStatus,
    currency: Currency,
    total_amount: Money,
    shipping_address: Option<ShippingAddress>,
    tracking_number: Option<String>,
    items: Vec<OrderItem>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,

    // Drained by the caller after a successful persist, never serialized.
    #[serde(skip)]
    events: Vec<OrderDomainEvent>,
}

impl Order {
    /// Start a new Pending order for a customer.
    pub fn create(
        customer_id: Uuid,
        currency: Currency,
        shipping_address: Option<ShippingAddress>,
    ) -> Result<Self, OrderError> {
        if customer_id.is_nil() {
            return Err(OrderError::MissingCustomer);
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            order_number: OrderNumber::generate(),
            customer_id,
            order_date: now,
            status: OrderStatus::Pending,
            total_amount: Money::zero(currency.clone()),
            currency,
            shipping_address,
            tracking_number: None,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
            events: Vec::new(),
        })
    }

    // ------------------------------------------------------------------
    // Composition (Pending only)
    // ------------------------------------------------------------------

    /// Append a line for `quantity` units of `product`, checking the catalog
    /// can actually fulfill it. The rejected call leaves the order untouched.
    pub fn add_item(
        &mut self,
        product: &Product,
        quantity: i32,
        unit_price: Money,
    ) -> Result<(), OrderError> {
        self.ensure_pending()?;

        if quantity <= 0 {
            return Err(OrderError::InvalidQuantity(quantity));
        }
        if unit_price.currency() != &self.currency {
            return Err(OrderError::Money(MoneyError::CurrencyMismatch {
                left: self.currency.clone(),
                right: unit_price.currency().clone(),
            }));
        }
        if !product.can_fulfill(quantity) {
            return Err(OrderError::InsufficientStock {
                product_id: product.id(),
                requested: quantity,
                available: product.stock_quantity(),
            });
        }

        let item = OrderItem::new(self.id, product.id(), quantity, unit_price)?;
        let new_total = self.total_amount.add(item.subtotal())?;
        self.items.push(item);
        self.total_amount = new_total;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn remove_item(&mut self, item_id: Uuid) -> Result<(), OrderError> {
        self.ensure_pending()?;

        let position = self
            .items
            .iter()
            .position(|item| item.id() == item_id)
            .ok_or(OrderError::ItemNotFound(item_id))?;

        self.items.remove(position);
        self.recalculate_total()?;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn update_item_quantity(
        &mut self,
        item_id: Uuid,
        new_quantity: i32,
    ) -> Result<(), OrderError> {
        self.ensure_pending()?;

        let item = self
            .items
            .iter_mut()
            .find(|item| item.id() == item_id)
            .ok_or(OrderError::ItemNotFound(item_id))?;

        item.change_quantity(new_quantity)?;
        self.recalculate_total()?;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn apply_item_discount(
        &mut self,
        item_id: Uuid,
        discount: Money,
    ) -> Result<(), OrderError> {
        self.ensure_pending()?;

        let item = self
            .items
            .iter_mut()
            .find(|item| item.id() == item_id)
            .ok_or(OrderError::ItemNotFound(item_id))?;

        item.apply_discount(discount)?;
        self.recalculate_total()?;
        self.updated_at = Utc::now();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Accept a Pending order for processing. Emits `OrderPlaced`.
    pub fn place_order(&mut self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Pending {
            return Err(OrderError::NotPending(self.status));
        }
        if self.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        self.status = OrderStatus::Processing;
        self.updated_at = Utc::now();
        self.events.push(OrderDomainEvent::Placed(OrderPlaced {
            event_id: Uuid::new_v4(),
            occurred_on: Utc::now(),
            order_id: self.id,
            customer_id: self.customer_id,
            total_amount: self.total_amount.amount(),
            currency: self.currency.clone(),
            order_date: self.order_date,
        }));
        Ok(())
    }

    /// Move the order to `new_status` if the transition table allows it.
    /// Setting the current status again is a no-op and emits nothing.
    pub fn update_status(&mut self, new_status: OrderStatus) -> Result<(), OrderError> {
        if self.status == new_status {
            return Ok(());
        }
        if !self.status.can_transition_to(new_status) {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: new_status,
            });
        }

        let old_status = self.status;
        self.status = new_status;
        self.updated_at = Utc::now();
        self.events
            .push(OrderDomainEvent::StatusChanged(OrderStatusChanged {
                event_id: Uuid::new_v4(),
                occurred_on: Utc::now(),
                order_id: self.id,
                old_status,
                new_status,
                changed_at: Utc::now(),
            }));
        Ok(())
    }

    /// Cancellation is only available before shipment.
    pub fn cancel(&mut self) -> Result<(), OrderError> {
        if !self.can_be_cancelled() {
            return Err(OrderError::NotCancellable(self.status));
        }
        self.update_status(OrderStatus::Cancelled)
    }

    pub fn can_be_cancelled(&self) -> bool {
        matches!(self.status, OrderStatus::Pending | OrderStatus::Processing)
    }

    pub fn set_tracking_number(&mut self, tracking_number: &str) -> Result<(), OrderError> {
        let trimmed = tracking_number.trim();
        if trimmed.is_empty() {
            return Err(OrderError::EmptyTrackingNumber);
        }
        if self.status != OrderStatus::Shipped {
            return Err(OrderError::NotShipped(self.status));
        }

        self.tracking_number = Some(trimmed.to_string());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Remove and return all buffered events, leaving the buffer empty.
    pub fn drain_events(&mut self) -> Vec<OrderDomainEvent> {
        self.events.drain(..).collect()
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn order_number(&self) -> &OrderNumber {
        &self.order_number
    }

    pub fn customer_id(&self) -> Uuid {
        self.customer_id
    }

    pub fn order_date(&self) -> DateTime<Utc> {
        self.order_date
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn total_amount(&self) -> &Money {
        &self.total_amount
    }

    pub fn shipping_address(&self) -> Option<&ShippingAddress> {
        self.shipping_address.as_ref()
    }

    pub fn tracking_number(&self) -> Option<&str> {
        self.tracking_number.as_deref()
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // ------------------------------------------------------------------
    // Internal
    // ------------------------------------------------------------------

    fn ensure_pending(&self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Pending {
            return Err(OrderError::NotPending(self.status));
        }
        Ok(())
    }

    fn recalculate_total(&mut self) -> Result<(), OrderError> {
        let mut total = Money::zero(self.currency.clone());
        for item in &self.items {
            total = total.add(item.subtotal())?;
        }
        self.total_amount = total;
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::value_objects::ALLOWED_TRANSITIONS;
    use crate::domain::DomainEvent;
    use rust_decimal_macros::dec;

    fn usd() -> Currency {
        Currency::new("USD").unwrap()
    }

    fn create_test_product(stock: i32) -> Product {
        Product::create(
            "Sidr Honey 500g",
            "HNY-SIDR-500",
            "Honey",
            Money::new(dec!(19.99), usd()).unwrap(),
            stock,
            5,
        )
        .unwrap()
    }

    fn create_test_order() -> Order {
        Order::create(Uuid::new_v4(), usd(), None).unwrap()
    }

    fn create_processing_order() -> Order {
        let mut order = create_test_order();
        let product = create_test_product(10);
        order
            .add_item(&product, 1, Money::new(dec!(5.00), usd()).unwrap())
            .unwrap();
        order.place_order().unwrap();
        order.drain_events();
        order
    }

    #[test]
    fn test_create_rejects_nil_customer() {
        let result = Order::create(Uuid::nil(), usd(), None);
        assert!(matches!(result, Err(OrderError::MissingCustomer)));
    }

    #[test]
    fn test_create_starts_pending_with_zero_total() {
        let order = create_test_order();
        assert_eq!(order.status(), OrderStatus::Pending);
        assert!(order.total_amount().is_zero());
        assert!(order.items().is_empty());
        assert!(OrderNumber::parse(order.order_number().as_str()).is_ok());
    }

    #[test]
    fn test_add_item_computes_total() {
        // 19.99 x 2 must come out as exactly 39.98.
        let mut order = create_test_order();
        let product = create_test_product(10);

        order
            .add_item(&product, 2, Money::new(dec!(19.99), usd()).unwrap())
            .unwrap();

        assert_eq!(order.items().len(), 1);
        assert_eq!(order.total_amount().amount(), dec!(39.98));
        assert_eq!(order.total_amount().currency().as_str(), "USD");
    }

    #[test]
    fn test_add_item_insufficient_stock() {
        let mut order = create_test_order();
        let product = create_test_product(3);

        let result = order.add_item(&product, 5, Money::new(dec!(19.99), usd()).unwrap());

        assert!(matches!(
            result,
            Err(OrderError::InsufficientStock {
                requested: 5,
                available: 3,
                ..
            })
        ));
        assert!(order.items().is_empty());
        assert!(order.total_amount().is_zero());
    }

    #[test]
    fn test_add_item_rejects_inactive_product() {
        let mut order = create_test_order();
        let mut product = create_test_product(10);
        product.deactivate();

        let result = order.add_item(&product, 1, Money::new(dec!(19.99), usd()).unwrap());
        assert!(matches!(result, Err(OrderError::InsufficientStock { .. })));
    }

    #[test]
    fn test_add_item_requires_pending() {
        let mut order = create_processing_order();
        let product = create_test_product(10);
        let total_before = order.total_amount().clone();

        let result = order.add_item(&product, 1, Money::new(dec!(19.99), usd()).unwrap());

        assert!(matches!(
            result,
            Err(OrderError::NotPending(OrderStatus::Processing))
        ));
        assert_eq!(order.total_amount(), &total_before);
        assert_eq!(order.items().len(), 1);
    }

    #[test]
    fn test_add_item_rejects_currency_mismatch() {
        let mut order = create_test_order();
        let product = create_test_product(10);
        let eur = Currency::new("EUR").unwrap();

        let result = order.add_item(&product, 1, Money::new(dec!(19.99), eur).unwrap());
        assert!(matches!(result, Err(OrderError::Money(_))));
        assert!(order.items().is_empty());
    }

    #[test]
    fn test_remove_item_recomputes_total() {
        let mut order = create_test_order();
        let product = create_test_product(10);
        order
            .add_item(&product, 2, Money::new(dec!(19.99), usd()).unwrap())
            .unwrap();
        order
            .add_item(&product, 1, Money::new(dec!(5.00), usd()).unwrap())
            .unwrap();

        let first_item = order.items()[0].id();
        order.remove_item(first_item).unwrap();

        assert_eq!(order.items().len(), 1);
        assert_eq!(order.total_amount().amount(), dec!(5.00));
    }

    #[test]
    fn test_remove_missing_item() {
        let mut order = create_test_order();
        let result = order.remove_item(Uuid::new_v4());
        assert!(matches!(result, Err(OrderError::ItemNotFound(_))));
    }

    #[test]
    fn test_update_item_quantity_recomputes_total() {
        let mut order = create_test_order();
        let product = create_test_product(10);
        order
            .add_item(&product, 2, Money::new(dec!(19.99), usd()).unwrap())
            .unwrap();

        let item_id = order.items()[0].id();
        order.update_item_quantity(item_id, 3).unwrap();

        assert_eq!(order.total_amount().amount(), dec!(59.97));
    }

    #[test]
    fn test_apply_item_discount_recomputes_total() {
        let mut order = create_test_order();
        let product = create_test_product(10);
        order
            .add_item(&product, 2, Money::new(dec!(19.99), usd()).unwrap())
            .unwrap();

        let item_id = order.items()[0].id();
        order
            .apply_item_discount(item_id, Money::new(dec!(10.00), usd()).unwrap())
            .unwrap();

        assert_eq!(order.total_amount().amount(), dec!(29.98));
    }

    #[test]
    fn test_place_order_with_no_items_fails() {
        let mut order = create_test_order();
        let result = order.place_order();
        assert!(matches!(result, Err(OrderError::EmptyOrder)));
        assert_eq!(order.status(), OrderStatus::Pending);
        assert!(order.drain_events().is_empty());
    }

    #[test]
    fn test_place_order_emits_placed_event() {
        let mut order = create_test_order();
        let product = create_test_product(10);
        order
            .add_item(&product, 2, Money::new(dec!(19.99), usd()).unwrap())
            .unwrap();

        order.place_order().unwrap();

        assert_eq!(order.status(), OrderStatus::Processing);
        let events = order.drain_events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            OrderDomainEvent::Placed(placed) => {
                assert_eq!(placed.order_id, order.id());
                assert_eq!(placed.customer_id, order.customer_id());
                assert_eq!(placed.total_amount, dec!(39.98));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_place_order_twice_fails() {
        let mut order = create_processing_order();
        let result = order.place_order();
        assert!(matches!(
            result,
            Err(OrderError::NotPending(OrderStatus::Processing))
        ));
    }

    #[test]
    fn test_update_status_same_status_is_noop() {
        let mut order = create_processing_order();
        order.update_status(OrderStatus::Processing).unwrap();
        assert_eq!(order.status(), OrderStatus::Processing);
        assert!(order.drain_events().is_empty());
    }

    #[test]
    fn test_update_status_emits_status_changed() {
        let mut order = create_processing_order();
        order.update_status(OrderStatus::Shipped).unwrap();

        let events = order.drain_events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            OrderDomainEvent::StatusChanged(changed) => {
                assert_eq!(changed.old_status, OrderStatus::Processing);
                assert_eq!(changed.new_status, OrderStatus::Shipped);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_every_illegal_transition_is_rejected() {
        // Everything outside the transition table must fail and leave the
        // status untouched, checked against the table itself.
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                if from == to || ALLOWED_TRANSITIONS.contains(&(from, to)) {
                    continue;
                }

                let mut order = create_test_order();
                force_status(&mut order, from);

                let result = order.update_status(to);
                assert!(
                    matches!(result, Err(OrderError::InvalidTransition { .. })),
                    "expected {from} -> {to} to be rejected"
                );
                assert_eq!(order.status(), from);
                assert!(order.drain_events().is_empty());
            }
        }
    }

    #[test]
    fn test_every_legal_transition_is_accepted() {
        for &(from, to) in ALLOWED_TRANSITIONS {
            let mut order = create_test_order();
            force_status(&mut order, from);

            order.update_status(to).unwrap();
            assert_eq!(order.status(), to);
        }
    }

    // Walks the order to `target` through legal transitions only.
    fn force_status(order: &mut Order, target: OrderStatus) {
        let product = create_test_product(100);
        order
            .add_item(&product, 1, Money::new(dec!(1.00), usd()).unwrap())
            .unwrap();

        let path: &[OrderStatus] = match target {
            OrderStatus::Pending => &[],
            OrderStatus::Processing => &[OrderStatus::Processing],
            OrderStatus::Shipped => &[OrderStatus::Processing, OrderStatus::Shipped],
            OrderStatus::Delivered => &[
                OrderStatus::Processing,
                OrderStatus::Shipped,
                OrderStatus::Delivered,
            ],
            OrderStatus::Cancelled => &[OrderStatus::Cancelled],
        };
        for &step in path {
            order.update_status(step).unwrap();
        }
        order.drain_events();
    }

    #[test]
    fn test_cancel_from_processing() {
        let mut order = create_processing_order();
        order.cancel().unwrap();

        assert_eq!(order.status(), OrderStatus::Cancelled);
        let events = order.drain_events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            OrderDomainEvent::StatusChanged(changed) => {
                assert_eq!(changed.old_status, OrderStatus::Processing);
                assert_eq!(changed.new_status, OrderStatus::Cancelled);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_cancel_from_shipped_fails() {
        let mut order = create_processing_order();
        order.update_status(OrderStatus::Shipped).unwrap();
        order.drain_events();

        let result = order.cancel();
        assert!(matches!(
            result,
            Err(OrderError::NotCancellable(OrderStatus::Shipped))
        ));
        assert_eq!(order.status(), OrderStatus::Shipped);
    }

    #[test]
    fn test_cancel_twice_fails() {
        let mut order = create_test_order();
        let product = create_test_product(10);
        order
            .add_item(&product, 1, Money::new(dec!(1.00), usd()).unwrap())
            .unwrap();
        order.cancel().unwrap();

        let result = order.cancel();
        assert!(matches!(
            result,
            Err(OrderError::NotCancellable(OrderStatus::Cancelled))
        ));
    }

    #[test]
    fn test_tracking_number_requires_shipped() {
        let mut order = create_processing_order();

        let result = order.set_tracking_number("TRK-123");
        assert!(matches!(
            result,
            Err(OrderError::NotShipped(OrderStatus::Processing))
        ));
        assert!(order.tracking_number().is_none());

        order.update_status(OrderStatus::Shipped).unwrap();
        order.set_tracking_number("TRK-123").unwrap();
        assert_eq!(order.tracking_number(), Some("TRK-123"));
    }

    #[test]
    fn test_tracking_number_cannot_be_blank() {
        let mut order = create_processing_order();
        order.update_status(OrderStatus::Shipped).unwrap();

        let result = order.set_tracking_number("   ");
        assert!(matches!(result, Err(OrderError::EmptyTrackingNumber)));
        assert!(order.tracking_number().is_none());
    }

    #[test]
    fn test_drain_events_empties_buffer() {
        let mut order = create_test_order();
        let product = create_test_product(10);
        order
            .add_item(&product, 1, Money::new(dec!(1.00), usd()).unwrap())
            .unwrap();
        order.place_order().unwrap();

        let drained = order.drain_events();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].event_type(), "OrderPlaced");
        assert!(order.drain_events().is_empty());
    }

    #[test]
    fn test_total_tracks_mixed_mutations() {
        let mut order = create_test_order();
        let product = create_test_product(50);

        order
            .add_item(&product, 2, Money::new(dec!(19.99), usd()).unwrap())
            .unwrap();
        order
            .add_item(&product, 3, Money::new(dec!(2.50), usd()).unwrap())
            .unwrap();
        let second = order.items()[1].id();
        order.update_item_quantity(second, 4).unwrap();
        order
            .apply_item_discount(second, Money::new(dec!(1.00), usd()).unwrap())
            .unwrap();

        // 39.98 + (4 * 2.50 - 1.00) = 48.98, and it matches the item sum.
        assert_eq!(order.total_amount().amount(), dec!(48.98));
        let sum = order
            .items()
            .iter()
            .fold(dec!(0), |acc, item| acc + item.subtotal().amount());
        assert_eq!(order.total_amount().amount(), sum);
    }
}
