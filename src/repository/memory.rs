use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CustomerRepository, OrderRepository, ProductCatalog};
use crate::domain::customer::Customer;
use crate::domain::order::Order;
use crate::domain::product::Product;

// ============================================================================
// In-Memory Stores
// ============================================================================
//
// Single-process stores behind the repository traits. State does not
// survive a restart; a durable store slots in behind the same traits.
//
// ============================================================================

#[derive(Default)]
pub struct InMemoryCustomerRepository {
    customers: RwLock<HashMap<String, Customer>>,
}

impl InMemoryCustomerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.customers.read().await.len()
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn find_by_auth_id(&self, auth_id: &str) -> anyhow::Result<Option<Customer>> {
        Ok(self.customers.read().await.get(auth_id).cloned())
    }

    async fn insert(&self, customer: Customer) -> anyhow::Result<()> {
        self.customers
            .write()
            .await
            .insert(customer.external_auth_id().to_string(), customer);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryProductCatalog {
    products: RwLock<HashMap<Uuid, Product>>,
}

impl InMemoryProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn find_by_id(&self, product_id: Uuid) -> anyhow::Result<Option<Product>> {
        Ok(self.products.read().await.get(&product_id).cloned())
    }

    async fn save(&self, product: Product) -> anyhow::Result<()> {
        self.products.write().await.insert(product.id(), product);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<Uuid, Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn save(&self, order: Order) -> anyhow::Result<()> {
        self.orders.write().await.insert(order.id(), order);
        Ok(())
    }

    async fn load(&self, order_id: Uuid) -> anyhow::Result<Option<Order>> {
        Ok(self.orders.read().await.get(&order_id).cloned())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
