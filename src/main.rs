use chrono::Utc;
use kameo::Actor;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

mod actors;
mod config;
mod domain;
mod events;
mod handlers;
mod messaging;
mod metrics;
mod repository;
mod utils;

use actors::{ConsumerActor, HealthMonitorActor, StopConsuming};
use config::Config;
use domain::customer::Customer;
use domain::money::{Currency, Money};
use domain::order::{Order, OrderStatus, ShippingAddress};
use domain::product::Product;
use domain::DomainEvent;
use events::outbound::{
    FeedbackReceivedEvent, OrderCreatedEvent, OrderShippedEvent, ProductOutOfStockEvent,
};
use events::routing_keys;
use handlers::{
    EventDispatcher, HandlerRegistry, UserLoggedInHandler, UserLoggedOutHandler,
    UserRegisteredHandler,
};
use messaging::{BrokerConnection, EventPublisher, QueueConsumer};
use repository::{
    CustomerRepository, InMemoryCustomerRepository, InMemoryOrderRepository,
    InMemoryProductCatalog, OrderRepository, ProductCatalog,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,cooperative_orders=debug")),
        )
        .init();

    tracing::info!("🚀 Starting Cooperative Orders Service");

    let config = Config::from_env();

    // === 1. Initialize Prometheus metrics ===
    tracing::info!("Initializing metrics");
    let metrics = Arc::new(metrics::Metrics::new()?);

    // === 2. Connect to RabbitMQ ===
    let connection = Arc::new(BrokerConnection::open(&config.rabbitmq).await?);

    // === 3. Create the event publisher (with circuit breaker) ===
    let publisher = Arc::new(
        EventPublisher::new(&connection, &config.rabbitmq.exchange, metrics.clone()).await?,
    );

    // === 4. Start the health monitor actor ===
    let health = HealthMonitorActor::spawn(HealthMonitorActor::new(
        connection.clone(),
        publisher.clone(),
        metrics.clone(),
    ));

    // Start metrics HTTP server in background thread
    let metrics_registry = Arc::new(metrics.registry().clone());
    let health_for_server = health.clone();
    let metrics_port = config.metrics_port;
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!(error = %e, "Failed to start metrics server runtime");
                return;
            }
        };
        rt.block_on(async {
            if let Err(e) =
                metrics::start_metrics_server(metrics_registry, health_for_server, metrics_port)
                    .await
            {
                tracing::error!("Metrics server error: {}", e);
            }
        });
    });

    // === 5. Wire inbound event handlers ===
    let customers = Arc::new(InMemoryCustomerRepository::new());
    let products = Arc::new(InMemoryProductCatalog::new());
    let orders = Arc::new(InMemoryOrderRepository::new());

    let mut handler_registry = HandlerRegistry::new();
    handler_registry.register(Arc::new(UserRegisteredHandler::new(customers.clone())));
    handler_registry.register(Arc::new(UserLoggedInHandler));
    handler_registry.register(Arc::new(UserLoggedOutHandler));
    let dispatcher = EventDispatcher::new(Arc::new(handler_registry));

    // === 6. Bind the queue and start consuming ===
    let consumer = QueueConsumer::bind(
        &connection,
        &config.rabbitmq.exchange,
        &config.rabbitmq.queue,
        dispatcher,
        metrics.clone(),
    )
    .await?;
    let consumer_actor = ConsumerActor::spawn(ConsumerActor::new(consumer, health.clone()));

    // === 7. Walk one order through its lifecycle on the bus ===
    tracing::info!("📝 Demonstrating the order lifecycle");

    // A customer who registered through the identity service earlier
    let customer = Customer::create(
        &Uuid::new_v4().to_string(),
        "Amina",
        "amina@shahd.coop",
        Some("+20 100 555 0199".to_string()),
        Some(ShippingAddress {
            street: "14 Qanat Street".to_string(),
            city: "Ismailia".to_string(),
            state: "Ismailia".to_string(),
            postal_code: "41511".to_string(),
            country: "Egypt".to_string(),
        }),
    )?;
    customers.insert(customer.clone()).await?;

    let currency = Currency::new("USD")?;
    let unit_price = Money::new(Decimal::new(1999, 2), currency.clone())?;
    let mut product = Product::create(
        "Wildflower Honey 500g",
        "HNY-WF-500",
        "Pantry",
        unit_price.clone(),
        12,
        5,
    )?;

    let mut order = Order::create(customer.id(), currency, customer.address().cloned())?;
    order.add_item(&product, 2, unit_price)?;
    order.place_order()?;
    product.reduce_stock(2)?;
    for event in order.drain_events() {
        tracing::debug!(event_type = event.event_type(), "Domain event raised");
    }

    publisher
        .publish(
            routing_keys::ORDER_CREATED,
            &OrderCreatedEvent::from_order(&order, &customer),
        )
        .await?;
    tracing::info!(order_number = %order.order_number(), "✅ Order placed and announced");

    order.update_status(OrderStatus::Shipped)?;
    order.set_tracking_number("EG-4417-0092")?;
    for event in order.drain_events() {
        tracing::debug!(event_type = event.event_type(), "Domain event raised");
    }

    publisher
        .publish(
            routing_keys::ORDER_SHIPPED,
            &OrderShippedEvent::from_order(&order, &customer, "Cooperative Post"),
        )
        .await?;
    tracing::info!(order_number = %order.order_number(), "✅ Order shipped");

    let order_id = order.id();
    orders.save(order).await?;

    // A bulk sale drops the stock through the threshold
    let was_above_threshold = !product.should_trigger_low_stock_alert();
    product.reduce_stock(7)?;
    for event in product.drain_events() {
        tracing::debug!(event_type = event.event_type(), "Domain event raised");
    }
    if was_above_threshold && product.should_trigger_low_stock_alert() {
        publisher
            .publish(
                routing_keys::PRODUCT_OUT_OF_STOCK,
                &ProductOutOfStockEvent::from_product(&product),
            )
            .await?;
        tracing::info!(
            sku = product.sku(),
            stock = product.stock_quantity(),
            "✅ Low-stock alert published"
        );
    }
    let product_id = product.id();
    let product_name = product.name().to_string();
    products.save(product).await?;

    let feedback = FeedbackReceivedEvent {
        feedback_id: Uuid::new_v4(),
        customer_id: customer.id(),
        customer_email: customer.email().to_string(),
        customer_name: customer.name().to_string(),
        product_id: Some(product_id),
        product_name: Some(product_name),
        order_id: Some(order_id),
        content: "The honey arrived quickly and tastes wonderful.".to_string(),
        rating: 5,
        submitted_at: Utc::now(),
    };
    publisher
        .publish(routing_keys::FEEDBACK_RECEIVED, &feedback)
        .await?;
    tracing::info!(rating = feedback.rating, "✅ Feedback forwarded");

    tracing::info!("🎉 Demo complete");

    // === 8. Run until interrupted, then drain and close ===
    tracing::info!("⏳ Service running, press Ctrl+C to stop");
    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down");
    if let Err(e) = consumer_actor.ask(StopConsuming).await {
        tracing::warn!(error = %e, "Consumer did not acknowledge stop");
    }
    connection.close().await?;
    tracing::info!("✅ Shutdown complete");

    Ok(())
}
