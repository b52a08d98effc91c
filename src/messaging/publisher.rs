use std::sync::Arc;

use lapin::options::{BasicPublishOptions, ExchangeDeclareOptions};
use lapin::types::FieldTable;
use lapin::{Channel, ExchangeKind};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use super::connection::BrokerConnection;
use super::envelope::EventEnvelope;
use super::error::PublishError;
use crate::metrics::Metrics;
use crate::utils::{
    retry_on_transient, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitState,
    RetryConfig,
};

// ============================================================================
// Event Publisher - Topic Exchange Publishing with Circuit Breaker
// ============================================================================
//
// Owns one channel, serialized behind a mutex. Publishes run through a
// short retry loop inside the circuit breaker, so a dead broker fails fast
// instead of stalling every caller for the full retry budget.
//
// ============================================================================

pub struct EventPublisher {
    channel: Mutex<Channel>,
    exchange: String,
    breaker: CircuitBreaker,
    retry: RetryConfig,
    metrics: Arc<Metrics>,
}

impl EventPublisher {
    /// Opens a channel and declares the topic exchange. Declaration is
    /// idempotent as long as every peer uses the same durability settings.
    pub async fn new(
        connection: &BrokerConnection,
        exchange: &str,
        metrics: Arc<Metrics>,
    ) -> anyhow::Result<Self> {
        let channel = connection.create_channel().await?;

        channel
            .exchange_declare(
                exchange,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;

        info!(exchange = %exchange, "📣 Event publisher ready");

        Ok(Self {
            channel: Mutex::new(channel),
            exchange: exchange.to_string(),
            breaker: CircuitBreaker::new(CircuitBreakerConfig::default()),
            retry: RetryConfig::for_publish(),
            metrics,
        })
    }

    /// Publishes a single event under `routing_key`. Messages go out
    /// persistent; there is no local buffering, so an error here means the
    /// event was not delivered to the broker.
    pub async fn publish<T: Serialize>(
        &self,
        routing_key: &str,
        event: &T,
    ) -> Result<(), PublishError> {
        // Serialization failures are permanent, no point tripping the breaker.
        let envelope = EventEnvelope::encode(routing_key, event)?;

        let outcome = self
            .breaker
            .call(async {
                retry_on_transient(self.retry.clone(), |_| self.publish_envelope(&envelope))
                    .await
                    .into_result()
            })
            .await;

        match outcome {
            Ok(()) => {
                self.metrics.record_published(routing_key, "success");
                debug!(routing_key = %routing_key, "Event published");
                Ok(())
            }
            Err(CircuitBreakerError::CircuitOpen) => {
                self.metrics.record_published(routing_key, "rejected");
                error!(
                    routing_key = %routing_key,
                    "Publish rejected, circuit breaker is open"
                );
                Err(PublishError::CircuitOpen)
            }
            Err(CircuitBreakerError::OperationFailed(err)) => {
                self.metrics.record_published(routing_key, "failure");
                error!(routing_key = %routing_key, error = %err, "Publish failed");
                Err(err)
            }
        }
    }

    async fn publish_envelope(&self, envelope: &EventEnvelope) -> Result<(), PublishError> {
        let channel = self.channel.lock().await;

        if !channel.status().connected() {
            return Err(PublishError::ChannelClosed);
        }

        channel
            .basic_publish(
                &self.exchange,
                envelope.routing_key(),
                BasicPublishOptions::default(),
                envelope.payload(),
                envelope.properties(),
            )
            .await?
            .await?;

        Ok(())
    }

    pub async fn circuit_state(&self) -> CircuitState {
        self.breaker.current_state().await
    }
}
