// Private module declaration
mod server;

use prometheus::{
    HistogramOpts, HistogramTimer, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Event publishing (throughput per routing key, outcomes)
// - Event consumption (ack/requeue outcomes, handler latency)
// - Broker connection health
// - Circuit breaker state
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the entire application
#[allow(dead_code)]
pub struct Metrics {
    registry: Registry,

    // Publishing Metrics
    pub events_published: IntCounterVec,

    // Consumption Metrics
    pub messages_consumed: IntCounterVec,
    pub handler_duration: HistogramVec,

    // Infrastructure Metrics
    pub connection_healthy: IntGauge,
    pub circuit_breaker_state: IntGauge,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Publishing Metrics
        let events_published = IntCounterVec::new(
            Opts::new(
                "events_published_total",
                "Events published, by routing key and outcome",
            ),
            &["routing_key", "outcome"],
        )?;
        registry.register(Box::new(events_published.clone()))?;

        // Consumption Metrics
        let messages_consumed = IntCounterVec::new(
            Opts::new(
                "messages_consumed_total",
                "Deliveries consumed, by routing key and outcome",
            ),
            &["routing_key", "outcome"],
        )?;
        registry.register(Box::new(messages_consumed.clone()))?;

        let handler_duration = HistogramVec::new(
            HistogramOpts::new("handler_duration_seconds", "Event handler duration")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["routing_key"],
        )?;
        registry.register(Box::new(handler_duration.clone()))?;

        // Infrastructure Metrics
        let connection_healthy = IntGauge::new(
            "broker_connection_healthy",
            "Broker connection status (1=connected, 0=lost)",
        )?;
        registry.register(Box::new(connection_healthy.clone()))?;

        let circuit_breaker_state = IntGauge::new(
            "circuit_breaker_state",
            "Publish circuit breaker state (0=closed, 1=half-open, 2=open)",
        )?;
        registry.register(Box::new(circuit_breaker_state.clone()))?;

        Ok(Self {
            registry,
            events_published,
            messages_consumed,
            handler_duration,
            connection_healthy,
            circuit_breaker_state,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record a publish outcome
    pub fn record_published(&self, routing_key: &str, outcome: &str) {
        self.events_published
            .with_label_values(&[routing_key, outcome])
            .inc();
    }

    /// Helper to record a consumed delivery
    pub fn record_consumed(&self, routing_key: &str, outcome: &str) {
        self.messages_consumed
            .with_label_values(&[routing_key, outcome])
            .inc();
    }

    /// Timer for one handler invocation; observes on `observe_duration`
    pub fn start_handler_timer(&self, routing_key: &str) -> HistogramTimer {
        self.handler_duration
            .with_label_values(&[routing_key])
            .start_timer()
    }

    /// Helper to update broker connection health
    pub fn set_connection_healthy(&self, healthy: bool) {
        self.connection_healthy.set(if healthy { 1 } else { 0 });
    }

    /// Helper to update circuit breaker state
    pub fn set_circuit_state(&self, state_code: i64) {
        self.circuit_breaker_state.set(state_code);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}
