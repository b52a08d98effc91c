use chrono::{DateTime, Utc};

// ============================================================================
// Health Check Abstractions
// ============================================================================
//
// Shared health types. Infrastructure components report these to the
// health monitor, which aggregates them for the /health endpoint.
//
// ============================================================================

/// Health status of a component
#[derive(Debug, Clone, PartialEq)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    pub fn is_unhealthy(&self) -> bool {
        matches!(self, HealthStatus::Unhealthy(_))
    }

    /// Stable label for the health endpoint payload
    pub fn as_label(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded(_) => "degraded",
            HealthStatus::Unhealthy(_) => "unhealthy",
        }
    }
}

/// Health information for a component
#[derive(Debug, Clone)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    pub last_check: DateTime<Utc>,
    pub details: Option<String>,
}

impl ComponentHealth {
    pub fn new(name: impl Into<String>, status: HealthStatus) -> Self {
        Self {
            name: name.into(),
            status,
            last_check: Utc::now(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels() {
        assert_eq!(HealthStatus::Healthy.as_label(), "healthy");
        assert_eq!(
            HealthStatus::Degraded("probe".to_string()).as_label(),
            "degraded"
        );
        assert!(HealthStatus::Unhealthy("down".to_string()).is_unhealthy());
    }

    #[test]
    fn test_component_health_builder() {
        let health = ComponentHealth::new("connection", HealthStatus::Healthy)
            .with_details("amqp://localhost");
        assert_eq!(health.name, "connection");
        assert!(health.status.is_healthy());
        assert_eq!(health.details.as_deref(), Some("amqp://localhost"));
    }
}
