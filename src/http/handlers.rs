//! Handlers for the exposed gate operations.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::GateError;
use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::observability::usage::UsageStatus;
use crate::pipeline::{ArchiveRequest, ArchiveResult};
use crate::security::rate_limit::RateLimiterStats;

/// Combined view served by `GET /stats`.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub stats: RateLimiterStats,
    pub status: UsageStatus,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub version: &'static str,
    pub healthy: bool,
    pub alerts: Vec<String>,
}

pub async fn archive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ArchiveRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Malformed archive request");
            let err = GateError::Validation(format!("Invalid request: {}", rejection.body_text()));
            return ArchiveResult::failed(&err).into_response();
        }
    };

    let result = match request_id(&headers) {
        Some(id) => state.pipeline.archive_with_id(request, id).await,
        None => state.pipeline.archive(request).await,
    };
    result.into_response()
}

pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        stats: state.pipeline.rate_limiter_stats(),
        status: state.pipeline.monitoring_status(),
    })
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let status = state.pipeline.monitoring_status();
    let code = if status.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        code,
        Json(HealthResponse {
            version: env!("CARGO_PKG_VERSION"),
            healthy: status.healthy,
            alerts: status.alerts,
        }),
    )
}
