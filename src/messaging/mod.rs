// ============================================================================
// Messaging - RabbitMQ Connection, Publishing and Consumption
// ============================================================================

pub mod connection;
pub mod consumer;
pub mod envelope;
pub mod error;
pub mod publisher;

pub use connection::BrokerConnection;
pub use consumer::QueueConsumer;
pub use envelope::EventEnvelope;
pub use error::PublishError;
pub use publisher::EventPublisher;
