use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::customer::Customer;
use crate::domain::order::Order;
use crate::domain::product::Product;

// ============================================================================
// Repositories - Persistence Seams for the Aggregates
// ============================================================================

pub mod memory;

pub use memory::{InMemoryCustomerRepository, InMemoryOrderRepository, InMemoryProductCatalog};

/// Customer lookups are keyed by the auth id the identity service assigns,
/// which is what inbound user events carry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn find_by_auth_id(&self, auth_id: &str) -> anyhow::Result<Option<Customer>>;
    async fn insert(&self, customer: Customer) -> anyhow::Result<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn find_by_id(&self, product_id: Uuid) -> anyhow::Result<Option<Product>>;
    async fn save(&self, product: Product) -> anyhow::Result<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn save(&self, order: Order) -> anyhow::Result<()>;
    async fn load(&self, order_id: Uuid) -> anyhow::Result<Option<Order>>;
}
