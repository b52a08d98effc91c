use kameo::Actor;
use kameo::actor::ActorRef;
use kameo::error::Infallible;
use kameo::message::{Context, Message};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::health_monitor::{HealthMonitorActor, UpdateHealth};
use crate::actors::core::HealthStatus;
use crate::messaging::QueueConsumer;

// ============================================================================
// Consumer Actor - Owns the Queue Consumption Loop
// ============================================================================
//
// Wraps the consumer loop in an actor so the rest of the system can stop it
// with a message and drain in-flight work before the connection closes.
// The loop itself runs on its own task; the actor only holds the shutdown
// handle.
//
// ============================================================================

pub struct ConsumerActor {
    consumer: Option<QueueConsumer>,
    health: ActorRef<HealthMonitorActor>,
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl ConsumerActor {
    pub fn new(consumer: QueueConsumer, health: ActorRef<HealthMonitorActor>) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            consumer: Some(consumer),
            health,
            shutdown_tx,
            task: None,
        }
    }
}

// ============================================================================
// Messages
// ============================================================================

/// Stops the consumer loop and waits for the in-flight delivery to finish.
pub struct StopConsuming;

impl Actor for ConsumerActor {
    type Args = Self;
    type Error = Infallible;

    async fn on_start(
        mut state: Self::Args,
        _actor_ref: ActorRef<Self>,
    ) -> Result<Self, Self::Error> {
        tracing::info!("ConsumerActor started");

        if let Some(consumer) = state.consumer.take() {
            let shutdown_rx = state.shutdown_tx.subscribe();
            let health = state.health.clone();

            state.task = Some(tokio::spawn(async move {
                // Fire and forget - use tell
                let _ = health.tell(UpdateHealth {
                    component: "consumer".to_string(),
                    status: HealthStatus::Healthy,
                    details: None,
                }).send().await;

                match consumer.run(shutdown_rx).await {
                    Ok(()) => {
                        tracing::info!("Consumer loop stopped");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "❌ Consumer loop terminated");
                        let _ = health.tell(UpdateHealth {
                            component: "consumer".to_string(),
                            status: HealthStatus::Unhealthy(e.to_string()),
                            details: None,
                        }).send().await;
                    }
                }
            }));
        }

        Ok(state)
    }
}

// ============================================================================
// Message Handlers
// ============================================================================

impl Message<StopConsuming> for ConsumerActor {
    type Reply = ();

    async fn handle(
        &mut self,
        _msg: StopConsuming,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        tracing::info!("Stopping consumer");
        let _ = self.shutdown_tx.send(true);

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Consumer task did not stop cleanly");
            }
        }
    }
}
