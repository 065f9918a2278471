// ============================================================================
// HTTP API
// ============================================================================
//
//   POST /v1/order                       → Simple
//   POST /v1/order/full                  → Orchestrated
//   POST /v1/order/full/choreographed    → Choreographed
//   GET  /health
//   GET  /metrics
//
// Every order endpoint answers 200 with a ProcessingResult once the body
// has parsed; downstream trouble only changes the message.
//
// ============================================================================

mod handlers;

use actix_web::web;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::actors::core::HealthCheckable;
use crate::domain::order::OrderCoordinator;
use crate::metrics::{metrics_handler, Metrics};

/// Shared by all workers; built once in `main`.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: OrderCoordinator,
    pub shutdown: CancellationToken,
    pub health_checks: Vec<Arc<dyn HealthCheckable>>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/v1/order", web::post().to(handlers::place_order))
        .route("/v1/order/full", web::post().to(handlers::place_order_orchestrated))
        .route(
            "/v1/order/full/choreographed",
            web::post().to(handlers::place_order_choreographed),
        )
        .route("/health", web::get().to(handlers::health))
        .route("/metrics", web::get().to(metrics_handler));
}

/// Registers state and routes on an `App`.
pub fn app_config(state: AppState, metrics: Arc<Metrics>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::new(state))
            .app_data(web::Data::new(metrics))
            .configure(configure);
    }
}
