use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::errors::OrderError;
use crate::domain::money::{Money, MoneyError};

// ============================================================================
// Order Value Objects
// ============================================================================

/// Human-facing order reference in the form `ORD-YYYYMMDD-NNNNN`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Generate a fresh order number from today's date and a random
    /// zero-padded 5-digit suffix.
    pub fn generate() -> Self {
        let date_part = Utc::now().format("%Y%m%d");
        let random_part: u32 = rand::rng().random_range(0..99999);
        Self(format!("ORD-{}-{:05}", date_part, random_part))
    }

    /// Validate an externally supplied order number. Input is trimmed and
    /// uppercased before the shape check.
    pub fn parse(value: &str) -> Result<Self, OrderError> {
        let candidate = value.trim().to_uppercase();
        let parts: Vec<&str> = candidate.split('-').collect();

        let well_formed = parts.len() == 3
            && parts[0] == "ORD"
            && parts[1].len() == 8
            && parts[1].chars().all(|c| c.is_ascii_digit())
            && parts[2].len() == 5
            && parts[2].chars().all(|c| c.is_ascii_digit());

        if !well_formed {
            return Err(OrderError::InvalidOrderNumber(value.to_string()));
        }

        Ok(Self(candidate))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Order Status & Lifecycle
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

/// The complete set of legal lifecycle transitions, as data. Anything not
/// listed here is rejected.
pub const ALLOWED_TRANSITIONS: &[(OrderStatus, OrderStatus)] = &[
    (OrderStatus::Pending, OrderStatus::Processing),
    (OrderStatus::Pending, OrderStatus::Cancelled),
    (OrderStatus::Processing, OrderStatus::Shipped),
    (OrderStatus::Processing, OrderStatus::Cancelled),
    (OrderStatus::Shipped, OrderStatus::Delivered),
];

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        ALLOWED_TRANSITIONS
            .iter()
            .any(|&(from, to)| from == self && to == next)
    }

    /// A status with no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        ALLOWED_TRANSITIONS.iter().all(|&(from, _)| from != self)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        };
        write!(f, "{}", name)
    }
}

// ============================================================================
// Shipping Address
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl ShippingAddress {
    /// Single-line rendering used by the outbound integration events.
    pub fn formatted(&self) -> String {
        format!(
            "{}, {}, {} {}, {}",
            self.street, self.city, self.state, self.postal_code, self.country
        )
    }
}

// ============================================================================
// Order Item
// ============================================================================

/// One line of an order. The subtotal is recomputed on every mutation so
/// `subtotal == unit_price * quantity - discount` always holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    unit_price: Money,
    discount: Money,
    subtotal: Money,
}

impl OrderItem {
    pub(crate) fn new(
        order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        unit_price: Money,
    ) -> Result<Self, OrderError> {
        if order_id.is_nil() {
            return Err(OrderError::MissingOrderId);
        }
        if product_id.is_nil() {
            return Err(OrderError::MissingProductId);
        }
        if quantity <= 0 {
            return Err(OrderError::InvalidQuantity(quantity));
        }

        let currency = unit_price.currency().clone();
        let mut item = Self {
            id: Uuid::new_v4(),
            order_id,
            product_id,
            quantity,
            unit_price,
            discount: Money::zero(currency.clone()),
            subtotal: Money::zero(currency),
        };
        item.recalculate_subtotal()?;
        Ok(item)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn order_id(&self) -> Uuid {
        self.order_id
    }

    pub fn product_id(&self) -> Uuid {
        self.product_id
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    pub fn unit_price(&self) -> &Money {
        &self.unit_price
    }

    pub fn discount(&self) -> &Money {
        &self.discount
    }

    pub fn subtotal(&self) -> &Money {
        &self.subtotal
    }

    /// Change the quantity. Rejected if the currently applied discount would
    /// exceed the new gross amount.
    pub(crate) fn change_quantity(&mut self, new_quantity: i32) -> Result<(), OrderError> {
        if new_quantity <= 0 {
            return Err(OrderError::InvalidQuantity(new_quantity));
        }

        let previous = self.quantity;
        self.quantity = new_quantity;
        if let Err(err) = self.recalculate_subtotal() {
            self.quantity = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Apply an absolute discount, bounded by the gross line amount.
    pub(crate) fn apply_discount(&mut self, discount: Money) -> Result<(), OrderError> {
        if discount.currency() != self.unit_price.currency() {
            return Err(OrderError::Money(MoneyError::CurrencyMismatch {
                left: self.unit_price.currency().clone(),
                right: discount.currency().clone(),
            }));
        }

        let gross = self.unit_price.multiply(Decimal::from(self.quantity))?;
        if discount.amount() > gross.amount() {
            return Err(OrderError::DiscountExceedsTotal {
                discount: discount.amount(),
                gross: gross.amount(),
            });
        }

        self.discount = discount;
        self.recalculate_subtotal()
    }

    fn recalculate_subtotal(&mut self) -> Result<(), OrderError> {
        let gross = self.unit_price.multiply(Decimal::from(self.quantity))?;
        if self.discount.amount() > gross.amount() {
            return Err(OrderError::DiscountExceedsTotal {
                discount: self.discount.amount(),
                gross: gross.amount(),
            });
        }
        self.subtotal = gross.subtract(&self.discount)?;
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Currency;
    use rust_decimal_macros::dec;

    fn usd() -> Currency {
        Currency::new("USD").unwrap()
    }

    fn create_test_item(quantity: i32, unit_price: Decimal) -> OrderItem {
        OrderItem::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            quantity,
            Money::new(unit_price, usd()).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_order_number_generate_shape() {
        let number = OrderNumber::generate();
        let parsed = OrderNumber::parse(number.as_str());
        assert!(parsed.is_ok());
        assert!(number.as_str().starts_with("ORD-"));
    }

    #[test]
    fn test_order_number_parse_uppercases() {
        let parsed = OrderNumber::parse("ord-20250115-00042").unwrap();
        assert_eq!(parsed.as_str(), "ORD-20250115-00042");
    }

    #[test]
    fn test_order_number_parse_rejects_garbage() {
        for bad in ["", "ORD-2025-00042", "XYZ-20250115-00042", "ORD-20250115-42"] {
            let result = OrderNumber::parse(bad);
            assert!(matches!(result, Err(OrderError::InvalidOrderNumber(_))));
        }
    }

    #[test]
    fn test_transition_table_round_trip() {
        for &(from, to) in ALLOWED_TRANSITIONS {
            assert!(from.can_transition_to(to));
        }
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Processing.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
    }

    #[test]
    fn test_shipping_address_formatted() {
        let address = ShippingAddress {
            street: "12 Hive Lane".to_string(),
            city: "Sanaa".to_string(),
            state: "SA".to_string(),
            postal_code: "00100".to_string(),
            country: "Yemen".to_string(),
        };
        assert_eq!(address.formatted(), "12 Hive Lane, Sanaa, SA 00100, Yemen");
    }

    #[test]
    fn test_item_subtotal_is_price_times_quantity() {
        let item = create_test_item(3, dec!(4.50));
        assert_eq!(item.subtotal().amount(), dec!(13.50));
    }

    #[test]
    fn test_item_rejects_non_positive_quantity() {
        let result = OrderItem::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            0,
            Money::new(dec!(1.00), usd()).unwrap(),
        );
        assert!(matches!(result, Err(OrderError::InvalidQuantity(0))));
    }

    #[test]
    fn test_change_quantity_recomputes_subtotal() {
        let mut item = create_test_item(2, dec!(19.99));
        item.change_quantity(5).unwrap();
        assert_eq!(item.subtotal().amount(), dec!(99.95));
    }

    #[test]
    fn test_discount_reduces_subtotal() {
        let mut item = create_test_item(2, dec!(10.00));
        item.apply_discount(Money::new(dec!(5.00), usd()).unwrap())
            .unwrap();
        assert_eq!(item.subtotal().amount(), dec!(15.00));
    }

    #[test]
    fn test_discount_above_gross_rejected() {
        let mut item = create_test_item(1, dec!(10.00));
        let result = item.apply_discount(Money::new(dec!(10.01), usd()).unwrap());
        assert!(matches!(
            result,
            Err(OrderError::DiscountExceedsTotal { .. })
        ));
        assert_eq!(item.subtotal().amount(), dec!(10.00));
    }

    #[test]
    fn test_quantity_shrink_below_discount_rejected() {
        let mut item = create_test_item(10, dec!(1.00));
        item.apply_discount(Money::new(dec!(8.00), usd()).unwrap())
            .unwrap();

        let result = item.change_quantity(2);
        assert!(matches!(
            result,
            Err(OrderError::DiscountExceedsTotal { .. })
        ));
        // Rejection leaves the item untouched.
        assert_eq!(item.quantity(), 10);
        assert_eq!(item.subtotal().amount(), dec!(2.00));
    }

    #[test]
    fn test_discount_currency_mismatch_rejected() {
        let mut item = create_test_item(1, dec!(10.00));
        let eur = Currency::new("EUR").unwrap();
        let result = item.apply_discount(Money::new(dec!(1.00), eur).unwrap());
        assert!(matches!(result, Err(OrderError::Money(_))));
    }
}
