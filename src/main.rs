use actix_web::{App, HttpServer};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod actors;
mod api;
mod config;
mod domain;
mod messaging;
mod metrics;
mod payment;
mod utils;

use actors::core::HealthCheckable;
use actors::EventDispatcher;
use api::AppState;
use config::AppConfig;
use domain::order::{OrderCoordinator, OrderProcessor};
use messaging::RedpandaClient;
use payment::HttpPaymentGateway;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG overrides the default filter, e.g. RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,order_coordinator=debug")),
        )
        .init();

    tracing::info!("🚀 Starting order coordinator");

    let config = AppConfig::from_env()?;
    tracing::info!(?config, "Configuration loaded");

    // === 1. Metrics registry ===
    let metrics = Arc::new(metrics::Metrics::new()?);

    // === 2. Outbound clients, built once and shared ===
    let payments = Arc::new(HttpPaymentGateway::new(
        &config.payment.base_url,
        &config.payment.charge_path,
        config.payment.timeout,
    )?);
    tracing::info!(url = %payments.charge_url(), "Payment gateway configured");

    let redpanda = Arc::new(RedpandaClient::new(
        &config.events.brokers,
        config.events.topic.clone(),
        config.events.message_timeout,
    )?);
    tracing::info!(brokers = %config.events.brokers, topic = %config.events.topic, "Event publisher configured");

    // === 3. Background publisher actor ===
    let events = EventDispatcher::spawn(redpanda.clone(), metrics.clone());

    // === 4. Coordinator ===
    let coordinator = OrderCoordinator::new(
        OrderProcessor::new(config.processing_delay),
        payments.clone(),
        events,
        metrics.clone(),
    );

    let shutdown = CancellationToken::new();
    let health_checks: Vec<Arc<dyn HealthCheckable>> = vec![
        payments.clone() as Arc<dyn HealthCheckable>,
        redpanda.clone() as Arc<dyn HealthCheckable>,
    ];
    let state = AppState {
        coordinator,
        shutdown: shutdown.clone(),
        health_checks,
    };

    spawn_breaker_gauges(metrics.clone(), payments, redpanda);

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("🛑 Shutdown signal received, interrupting in-flight processing");
                shutdown.cancel();
            }
        });
    }

    // === 5. HTTP server ===
    tracing::info!(addr = %config.http_addr, "📡 Listening for orders");
    let server_metrics = metrics.clone();
    HttpServer::new(move || App::new().configure(api::app_config(state.clone(), server_metrics.clone())))
        .bind(config.http_addr)?
        .run()
        .await?;

    shutdown.cancel();
    tracing::info!("🛑 Order coordinator stopped");

    Ok(())
}

/// Mirrors circuit breaker states into the metrics registry.
fn spawn_breaker_gauges(
    metrics: Arc<metrics::Metrics>,
    payments: Arc<HttpPaymentGateway>,
    redpanda: Arc<RedpandaClient>,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(10));
        loop {
            interval.tick().await;
            metrics.update_circuit_breaker_state("payment-gateway", payments.circuit_state().await.as_gauge());
            metrics.update_circuit_breaker_state("event-publisher", redpanda.circuit_state().await.as_gauge());
        }
    });
}
