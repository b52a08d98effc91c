use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use kameo::actor::ActorRef;
use prometheus::{Encoder, Registry, TextEncoder};
use std::sync::Arc;

use crate::actors::{GetSystemHealth, HealthMonitorActor};

/// Start the metrics HTTP server
/// This should be called in a separate thread/runtime to avoid conflicts
pub async fn start_metrics_server(
    registry: Arc<Registry>,
    health: ActorRef<HealthMonitorActor>,
    port: u16,
) -> std::io::Result<()> {
    tracing::info!("📊 Starting metrics server on http://0.0.0.0:{}/metrics", port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(registry.clone()))
            .app_data(web::Data::new(health.clone()))
            .route("/metrics", web::get().to(metrics_handler))
            .route("/health", web::get().to(health_handler))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

async fn metrics_handler(registry: web::Data<Arc<Registry>>) -> impl Responder {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(e.to_string());
    }

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}

/// Reports the aggregated system health. Unhealthy returns 503 so load
/// balancers and orchestrators can act on it.
async fn health_handler(health: web::Data<ActorRef<HealthMonitorActor>>) -> impl Responder {
    let system = match health.ask(GetSystemHealth).await {
        Ok(system) => system,
        Err(_) => {
            return HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unknown",
                "service": "cooperative-orders",
            }));
        }
    };

    let components: serde_json::Map<String, serde_json::Value> = system
        .components
        .iter()
        .map(|(name, component)| {
            (
                name.clone(),
                serde_json::json!({
                    "status": component.status.as_label(),
                    "last_check": component.last_check,
                }),
            )
        })
        .collect();

    let body = serde_json::json!({
        "status": system.overall_status.as_label(),
        "service": "cooperative-orders",
        "checked_at": system.check_time,
        "components": components,
    });

    if system.overall_status.is_unhealthy() {
        HttpResponse::ServiceUnavailable().json(body)
    } else {
        HttpResponse::Ok().json(body)
    }
}
