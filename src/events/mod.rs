// ============================================================================
// Integration Events - Wire Payloads on the Event Bus
// ============================================================================
//
// Typed JSON bodies exchanged with the other services. Field names are
// PascalCase to stay bit-compatible with the existing producers and
// consumers on the bus; do not rename fields without coordinating a bus-wide
// migration.
//
// ============================================================================

pub mod inbound;
pub mod outbound;

/// Routing keys used on the topic exchange.
pub mod routing_keys {
    // Outbound
    pub const ORDER_CREATED: &str = "order.created";
    pub const ORDER_SHIPPED: &str = "order.shipped";
    pub const FEEDBACK_RECEIVED: &str = "feedback.received";
    pub const PRODUCT_OUT_OF_STOCK: &str = "product.out-of-stock";

    // Inbound
    pub const USER_REGISTERED: &str = "user.registered";
    pub const USER_LOGGED_IN: &str = "user.logged-in";
    pub const USER_LOGGED_OUT: &str = "user.logged-out";
}
