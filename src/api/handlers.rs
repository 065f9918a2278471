use actix_web::{web, HttpResponse, Responder};

use super::AppState;
use crate::actors::core::SystemHealth;
use crate::domain::order::{CoordinationStrategy, Order};

async fn run(state: &AppState, order: Order, strategy: CoordinationStrategy) -> HttpResponse {
    // Child token: a shutdown cuts the processing stage short for this request.
    let cancel = state.shutdown.child_token();
    let outcome = state.coordinator.handle(order, strategy, &cancel).await;

    HttpResponse::Ok().json(outcome.into_result())
}

pub async fn place_order(state: web::Data<AppState>, order: web::Json<Order>) -> impl Responder {
    run(&state, order.into_inner(), CoordinationStrategy::Simple).await
}

pub async fn place_order_orchestrated(state: web::Data<AppState>, order: web::Json<Order>) -> impl Responder {
    run(&state, order.into_inner(), CoordinationStrategy::Orchestrated).await
}

pub async fn place_order_choreographed(state: web::Data<AppState>, order: web::Json<Order>) -> impl Responder {
    run(&state, order.into_inner(), CoordinationStrategy::Choreographed).await
}

pub async fn health(state: web::Data<AppState>) -> impl Responder {
    let health = SystemHealth::collect(&state.health_checks).await;

    if health.overall_status.is_unhealthy() {
        HttpResponse::ServiceUnavailable().json(health.to_json())
    } else {
        HttpResponse::Ok().json(health.to_json())
    }
}
