use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{EventHandler, HandlerError};
use crate::domain::customer::Customer;
use crate::events::inbound::{UserLoggedInEvent, UserLoggedOutEvent, UserRegisteredEvent};
use crate::events::routing_keys;
use crate::repository::CustomerRepository;

// ============================================================================
// User Event Handlers - Reactions to Identity Service Events
// ============================================================================

/// Provisions a local customer record the first time a user registers with
/// the identity service. Redeliveries are absorbed by the existence check.
pub struct UserRegisteredHandler {
    customers: Arc<dyn CustomerRepository>,
}

impl UserRegisteredHandler {
    pub fn new(customers: Arc<dyn CustomerRepository>) -> Self {
        Self { customers }
    }
}

#[async_trait]
impl EventHandler for UserRegisteredHandler {
    fn routing_key(&self) -> &'static str {
        routing_keys::USER_REGISTERED
    }

    async fn handle(&self, payload: &[u8]) -> Result<(), HandlerError> {
        let event: UserRegisteredEvent = serde_json::from_slice(payload)?;
        let auth_id = event.user_id.to_string();

        if self.customers.find_by_auth_id(&auth_id).await?.is_some() {
            info!(user_id = %event.user_id, "Customer already provisioned, skipping");
            return Ok(());
        }

        // The registration event carries no display name, so start with the
        // local part of the email address.
        let name = event.email.split('@').next().unwrap_or_default();
        let customer = Customer::create(&auth_id, name, &event.email, None, None).map_err(|e| {
            warn!(user_id = %event.user_id, kind = ?e.kind(), "Rejected registration payload");
            HandlerError::Domain(e.to_string())
        })?;
        let customer_id = customer.id();

        self.customers.insert(customer).await?;
        info!(
            user_id = %event.user_id,
            customer_id = %customer_id,
            role = %event.role,
            "👤 Customer provisioned"
        );
        Ok(())
    }
}

/// Login events only get recorded for now.
pub struct UserLoggedInHandler;

#[async_trait]
impl EventHandler for UserLoggedInHandler {
    fn routing_key(&self) -> &'static str {
        routing_keys::USER_LOGGED_IN
    }

    async fn handle(&self, payload: &[u8]) -> Result<(), HandlerError> {
        let event: UserLoggedInEvent = serde_json::from_slice(payload)?;
        debug!(
            user_id = %event.user_id,
            ip_address = event.ip_address.as_deref().unwrap_or("unknown"),
            "User logged in"
        );
        // TODO: record last-login on the customer profile once it grows one.
        Ok(())
    }
}

pub struct UserLoggedOutHandler;

#[async_trait]
impl EventHandler for UserLoggedOutHandler {
    fn routing_key(&self) -> &'static str {
        routing_keys::USER_LOGGED_OUT
    }

    async fn handle(&self, payload: &[u8]) -> Result<(), HandlerError> {
        let event: UserLoggedOutEvent = serde_json::from_slice(payload)?;
        debug!(user_id = %event.user_id, "User logged out");
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryCustomerRepository, MockCustomerRepository};
    use crate::utils::IsTransient;
    use uuid::Uuid;

    fn registered_payload(user_id: Uuid, email: &str) -> Vec<u8> {
        serde_json::json!({
            "UserId": user_id,
            "Email": email,
            "Role": "member",
            "RegisteredAt": "2025-03-01T10:00:00Z",
        })
        .to_string()
        .into_bytes()
    }

    #[tokio::test]
    async fn test_registration_creates_customer_named_after_email() {
        let repo = Arc::new(InMemoryCustomerRepository::new());
        let handler = UserRegisteredHandler::new(repo.clone());
        let user_id = Uuid::new_v4();

        handler
            .handle(&registered_payload(user_id, "amina@shahd.coop"))
            .await
            .expect("handler should succeed");

        let customer = repo
            .find_by_auth_id(&user_id.to_string())
            .await
            .expect("lookup should succeed")
            .expect("customer should exist");
        assert_eq!(customer.name(), "amina");
        assert_eq!(customer.email(), "amina@shahd.coop");
    }

    #[tokio::test]
    async fn test_duplicate_registration_creates_one_customer() {
        let repo = Arc::new(InMemoryCustomerRepository::new());
        let handler = UserRegisteredHandler::new(repo.clone());
        let payload = registered_payload(Uuid::new_v4(), "amina@shahd.coop");

        handler
            .handle(&payload)
            .await
            .expect("first delivery should succeed");
        handler
            .handle(&payload)
            .await
            .expect("redelivery should succeed");

        assert_eq!(repo.count().await, 1);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_permanent() {
        let handler = UserRegisteredHandler::new(Arc::new(InMemoryCustomerRepository::new()));

        let result = handler.handle(b"not json").await;

        match result {
            Err(HandlerError::MalformedPayload(_)) => {}
            other => panic!("expected MalformedPayload, got {:?}", other),
        }
        if let Err(err) = handler.handle(b"not json").await {
            assert!(!err.is_transient());
        }
    }

    #[tokio::test]
    async fn test_repository_failure_is_transient() {
        let mut repo = MockCustomerRepository::new();
        repo.expect_find_by_auth_id()
            .returning(|_| Err(anyhow::anyhow!("database unavailable")));
        let handler = UserRegisteredHandler::new(Arc::new(repo));

        let result = handler
            .handle(&registered_payload(Uuid::new_v4(), "amina@shahd.coop"))
            .await;

        match result {
            Err(err @ HandlerError::Repository(_)) => assert!(err.is_transient()),
            other => panic!("expected Repository error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_existing_customer_skips_insert() {
        let user_id = Uuid::new_v4();
        let existing = Customer::create(&user_id.to_string(), "amina", "amina@shahd.coop", None, None)
            .expect("test customer should be valid");

        let mut repo = MockCustomerRepository::new();
        repo.expect_find_by_auth_id()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_insert().times(0);
        let handler = UserRegisteredHandler::new(Arc::new(repo));

        handler
            .handle(&registered_payload(user_id, "amina@shahd.coop"))
            .await
            .expect("handler should succeed");
    }

    #[tokio::test]
    async fn test_login_and_logout_events_parse() {
        let login = UserLoggedInHandler;
        let logout = UserLoggedOutHandler;
        let user_id = Uuid::new_v4();

        login
            .handle(
                serde_json::json!({
                    "UserId": user_id,
                    "Email": "amina@shahd.coop",
                    "IpAddress": null,
                    "LoggedInAt": "2025-03-01T10:00:00Z",
                })
                .to_string()
                .as_bytes(),
            )
            .await
            .expect("login handler should succeed");

        logout
            .handle(
                serde_json::json!({
                    "UserId": user_id,
                    "LoggedOutAt": "2025-03-01T11:00:00Z",
                })
                .to_string()
                .as_bytes(),
            )
            .await
            .expect("logout handler should succeed");
    }
}
