use std::sync::Arc;

use anyhow::Context as _;
use futures_util::StreamExt;
use lapin::message::Delivery;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicQosOptions,
    ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{Channel, ExchangeKind};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::connection::BrokerConnection;
use crate::handlers::{DispatchOutcome, EventDispatcher};
use crate::metrics::Metrics;
use crate::utils::IsTransient;

// ============================================================================
// Queue Consumer - Durable Queue with Manual Acknowledgement
// ============================================================================
//
// Prefetch is 1: one message in flight at a time, acked only after its
// handler returns. Failed messages are nacked back onto the queue. There is
// no dead-letter exchange on this topology, so a message that fails
// permanently will be redelivered until an operator intervenes.
//
// ============================================================================

pub struct QueueConsumer {
    channel: Channel,
    queue: String,
    dispatcher: EventDispatcher,
    metrics: Arc<Metrics>,
}

impl QueueConsumer {
    /// Declares the queue, binds it to the exchange for every routing key
    /// the dispatcher knows, and sets prefetch. Declaration is idempotent.
    pub async fn bind(
        connection: &BrokerConnection,
        exchange: &str,
        queue: &str,
        dispatcher: EventDispatcher,
        metrics: Arc<Metrics>,
    ) -> anyhow::Result<Self> {
        let channel = connection
            .create_channel()
            .await
            .context("failed to open consumer channel")?;

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

        channel
            .queue_declare(
                queue,
                QueueDeclareOptions {
                    durable: true,
                    exclusive: false,
                    auto_delete: false,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;

        for routing_key in dispatcher.routing_keys() {
            channel
                .queue_bind(
                    queue,
                    exchange,
                    routing_key,
                    QueueBindOptions::default(),
                    FieldTable::default(),
                )
                .await?;
            info!(queue = %queue, routing_key = %routing_key, "Queue bound");
        }

        channel.basic_qos(1, BasicQosOptions::default()).await?;

        Ok(Self {
            channel,
            queue: queue.to_string(),
            dispatcher,
            metrics,
        })
    }

    /// Consumes until the shutdown signal flips or the broker closes the
    /// stream. Each delivery is fully processed before the next is pulled.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        let mut consumer = self
            .channel
            .basic_consume(
                &self.queue,
                "cooperative-orders",
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .context("failed to start consuming")?;

        info!(queue = %self.queue, "📥 Consuming events");

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Consumer received shutdown signal");
                        break;
                    }
                }
                delivery = consumer.next() => match delivery {
                    Some(Ok(delivery)) => self.process(delivery).await?,
                    Some(Err(e)) => {
                        error!(error = %e, "Consumer stream error");
                        return Err(e.into());
                    }
                    None => {
                        warn!("Consumer stream closed by broker");
                        break;
                    }
                },
            }
        }

        self.channel.close(200, "consumer stopped").await?;
        Ok(())
    }

    async fn process(&self, delivery: Delivery) -> anyhow::Result<()> {
        let routing_key = delivery.routing_key.as_str().to_string();

        let timer = self.metrics.start_handler_timer(&routing_key);
        let outcome = self.dispatcher.dispatch(&routing_key, &delivery.data).await;
        timer.observe_duration();

        match outcome {
            DispatchOutcome::Handled => {
                delivery.ack(BasicAckOptions::default()).await?;
                self.metrics.record_consumed(&routing_key, "ack");
                debug!(routing_key = %routing_key, "Event handled");
            }
            DispatchOutcome::NoHandler => {
                // Unknown events are acked so they do not clog the queue.
                delivery.ack(BasicAckOptions::default()).await?;
                self.metrics.record_consumed(&routing_key, "unknown");
                warn!(routing_key = %routing_key, "No handler registered, acking");
            }
            DispatchOutcome::Failed(err) => {
                if err.is_transient() {
                    warn!(
                        routing_key = %routing_key,
                        error = %err,
                        "Handler failed, message requeued"
                    );
                } else {
                    error!(
                        routing_key = %routing_key,
                        delivery_tag = delivery.delivery_tag,
                        error = %err,
                        "Handler failed permanently, requeueing anyway (no dead-letter queue)"
                    );
                }
                delivery
                    .nack(BasicNackOptions {
                        requeue: true,
                        ..Default::default()
                    })
                    .await?;
                self.metrics.record_consumed(&routing_key, "nack");
            }
        }

        Ok(())
    }
}
