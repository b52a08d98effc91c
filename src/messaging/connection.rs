use anyhow::Context as _;
use lapin::{Channel, Connection, ConnectionProperties};
use tracing::{info, warn};

use crate::config::RabbitMqConfig;
use crate::utils::{retry_with_backoff, RetryConfig};

// ============================================================================
// Broker Connection - Managed AMQP Connection Lifecycle
// ============================================================================

/// Owns the single AMQP connection for the process. Channels are cheap and
/// are opened per publisher/consumer; the connection itself is shared.
pub struct BrokerConnection {
    connection: Connection,
}

impl BrokerConnection {
    /// Connects to the broker, retrying with backoff so the service can
    /// start while RabbitMQ is still booting.
    pub async fn open(config: &RabbitMqConfig) -> anyhow::Result<Self> {
        let uri = config.amqp_uri();
        info!(
            host = %config.host,
            port = config.port,
            vhost = %config.vhost,
            "Connecting to RabbitMQ"
        );

        let connection = retry_with_backoff(RetryConfig::for_connect(), |attempt| {
            let uri = uri.clone();
            async move {
                if attempt > 1 {
                    warn!(attempt = attempt, "Retrying broker connection");
                }
                Connection::connect(
                    &uri,
                    ConnectionProperties::default()
                        .with_connection_name("cooperative-orders".into()),
                )
                .await
            }
        })
        .await
        .into_result()
        .context("failed to connect to RabbitMQ after retries")?;

        info!("✅ Connected to RabbitMQ");
        Ok(Self { connection })
    }

    pub async fn create_channel(&self) -> Result<Channel, lapin::Error> {
        self.connection.create_channel().await
    }

    /// True while the underlying TCP connection is up. `lapin` does not
    /// recover connections automatically, so a false here means the
    /// process needs a restart.
    pub fn is_healthy(&self) -> bool {
        self.connection.status().connected()
    }

    pub async fn close(&self) -> Result<(), lapin::Error> {
        info!("Closing broker connection");
        self.connection.close(200, "shutting down").await
    }
}
