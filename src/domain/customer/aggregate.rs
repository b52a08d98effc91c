use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::CustomerError;
use crate::domain::order::ShippingAddress;

// ============================================================================
// Customer Aggregate
// ============================================================================

/// A storefront customer provisioned from identity events. The external auth
/// id is the idempotency key for provisioning; loyalty points never go
/// negative and only move on an active account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    id: Uuid,
    external_auth_id: String,
    name: String,
    email: String,
    phone: Option<String>,
    address: Option<ShippingAddress>,
    loyalty_points: i32,
    is_active: bool,
    date_joined: DateTime<Utc>,
}

impl Customer {
    pub fn create(
        external_auth_id: &str,
        name: &str,
        email: &str,
        phone: Option<String>,
        address: Option<ShippingAddress>,
    ) -> Result<Self, CustomerError> {
        if external_auth_id.trim().is_empty() {
            return Err(CustomerError::EmptyAuthId);
        }
        if name.trim().is_empty() {
            return Err(CustomerError::EmptyName);
        }
        if email.trim().is_empty() {
            return Err(CustomerError::EmptyEmail);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            external_auth_id: external_auth_id.trim().to_string(),
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            phone,
            address,
            loyalty_points: 0,
            is_active: true,
            date_joined: Utc::now(),
        })
    }

    // ------------------------------------------------------------------
    // Loyalty points
    // ------------------------------------------------------------------

    pub fn add_loyalty_points(&mut self, points: i32) -> Result<(), CustomerError> {
        if points < 0 {
            return Err(CustomerError::NegativePoints(points));
        }
        if !self.is_active {
            return Err(CustomerError::Inactive);
        }

        self.loyalty_points += points;
        Ok(())
    }

    pub fn redeem_loyalty_points(&mut self, points: i32) -> Result<(), CustomerError> {
        if points < 0 {
            return Err(CustomerError::NegativePoints(points));
        }
        if !self.is_active {
            return Err(CustomerError::Inactive);
        }
        if points > self.loyalty_points {
            return Err(CustomerError::InsufficientPoints {
                requested: points,
                available: self.loyalty_points,
            });
        }

        self.loyalty_points -= points;
        Ok(())
    }

    pub fn can_place_order(&self) -> bool {
        self.is_active
    }

    pub fn activate_account(&mut self) {
        self.is_active = true;
    }

    pub fn deactivate_account(&mut self) {
        self.is_active = false;
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn external_auth_id(&self) -> &str {
        &self.external_auth_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn address(&self) -> Option<&ShippingAddress> {
        self.address.as_ref()
    }

    pub fn loyalty_points(&self) -> i32 {
        self.loyalty_points
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn date_joined(&self) -> DateTime<Utc> {
        self.date_joined
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
