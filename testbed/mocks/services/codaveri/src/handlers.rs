use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::server::{MockState, RecordedHeaders};

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub id: String,
}

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "codaveri-mock"
    }))
}

pub async fn submit_execution(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    let recorded = RecordedHeaders::from_headers(&headers);
    state.record_headers(recorded.clone());
    state.record_submission(payload);

    if !state.is_authorized(&recorded) {
        return (StatusCode::UNAUTHORIZED, "invalid api key").into_response();
    }

    let fixture = &state.fixture;
    if let Some(failure) = &fixture.submit_failure {
        let status = StatusCode::from_u16(failure.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        tracing::info!("Rejecting submission with {}", status);
        return (status, failure.body.clone()).into_response();
    }

    state.reset_polls(&fixture.job_id);
    tracing::info!("Accepted submission as job {}", fixture.job_id);
    Json(fixture.accepted_body()).into_response()
}

pub async fn get_execution(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(query): Query<StatusQuery>,
) -> Response {
    let recorded = RecordedHeaders::from_headers(&headers);
    state.record_headers(recorded.clone());
    let attempt = state.record_poll(&query.id);

    if !state.is_authorized(&recorded) {
        return (StatusCode::UNAUTHORIZED, "invalid api key").into_response();
    }

    let fixture = &state.fixture;
    if query.id != fixture.job_id {
        return (StatusCode::NOT_FOUND, "unknown execution").into_response();
    }
    if attempt <= fixture.pending_polls {
        tracing::debug!("Job {} pending (query {})", query.id, attempt);
        return (StatusCode::NOT_FOUND, "execution not ready").into_response();
    }

    tracing::info!("Job {} complete (query {})", query.id, attempt);
    Json(fixture.completed_body()).into_response()
}
