//! HTTP handlers for the event-delivery collaborator.
//!
//! Status mapping tells the delivery layer whether to redeliver:
//! - 200: applied or skipped
//! - 400 / 422: the event itself is bad; redelivery fails the same way
//! - 503: store write failed; redeliver
//! - 500: internal

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::Instrument;

use tally_core::error::{ClientCode, TallyError};

use crate::app_state::AppState;
use crate::dispatch::Outcome;
use crate::transport::codec::decode;

fn status_for(code: ClientCode) -> StatusCode {
    match code {
        ClientCode::BadRequest | ClientCode::UnknownEvent | ClientCode::UnsupportedVersion => {
            StatusCode::BAD_REQUEST
        }
        ClientCode::MalformedEvent => StatusCode::UNPROCESSABLE_ENTITY,
        ClientCode::StoreWriteFailed => StatusCode::SERVICE_UNAVAILABLE,
        ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(err: &TallyError) -> Response {
    let code = err.client_code();
    (
        status_for(code),
        Json(json!({
            "code": code.as_str(),
            "msg": err.to_string(),
            "retriable": err.is_retriable(),
        })),
    )
        .into_response()
}

fn outcome_response(outcome: Outcome) -> Response {
    let body = match outcome {
        Outcome::Applied(d) => json!({
            "status": outcome.as_str(),
            "counter": d.field.as_str(),
            "delta": d.amount,
        }),
        Outcome::Skipped => json!({ "status": outcome.as_str() }),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// `POST /v1/events`: one delivery, one envelope.
pub async fn ingest_event(State(app): State<AppState>, body: Bytes) -> Response {
    let inbound = match decode(&body) {
        Ok(i) => i,
        Err(e) => {
            app.metrics().events.inc(&[("type", "undecodable"), ("outcome", e.client_code().as_str())]);
            tracing::warn!(bytes = body.len(), error = %e, "rejecting delivery");
            return error_response(&e);
        }
    };

    let event_type = app.dispatcher().label_for(&inbound.env.event_type);
    let delivery = inbound.env.id.clone();
    let span = tracing::info_span!("event", event_type = %inbound.env.event_type, delivery = ?delivery, bytes = inbound.bytes_len);

    match app.dispatcher().dispatch(inbound.env).instrument(span).await {
        Ok(outcome) => {
            app.metrics().events.inc(&[("type", event_type), ("outcome", outcome.as_str())]);
            outcome_response(outcome)
        }
        Err(e) => {
            app.metrics().events.inc(&[("type", event_type), ("outcome", e.client_code().as_str())]);
            error_response(&e)
        }
    }
}

/// `GET /v1/counters`: current counters document.
pub async fn get_counters(State(app): State<AppState>) -> Response {
    match app.aggregator().snapshot().await {
        Ok(doc) => (StatusCode::OK, Json(doc)).into_response(),
        Err(e) => error_response(&e),
    }
}
