//! Axum router wiring.
//!
//! Ingestion (`/v1/events`), read side (`/v1/counters`), and the operational
//! endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/events", post(transport::http::ingest_event))
        .route("/v1/counters", get(transport::http::get_counters))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .with_state(state)
}
