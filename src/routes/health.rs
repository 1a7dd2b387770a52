use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/live", get(live))
        .route("/ready", get(ready))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LivenessResponse {
    status: &'static str,
    timestamp: String,
    uptime: u64,
    start_time: String,
    version: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReadinessResponse {
    status: &'static str,
    timestamp: String,
    uptime: u64,
    checks: ReadinessChecks,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReadinessChecks {
    classifier: &'static str,
    sessions: usize,
    redis: &'static str,
}

async fn root() -> Response {
    Json(HealthResponse {
        status: "ok",
        timestamp: now_iso(),
    })
    .into_response()
}

async fn live(State(state): State<AppState>) -> Response {
    let started: DateTime<Utc> = state.started_at_system().into();
    Json(LivenessResponse {
        status: "healthy",
        timestamp: now_iso(),
        uptime: state.uptime_seconds(),
        start_time: started.to_rfc3339_opts(SecondsFormat::Millis, true),
        version: env!("CARGO_PKG_VERSION"),
    })
    .into_response()
}

async fn ready(State(state): State<AppState>) -> Response {
    let engine = state.engine();
    let redis = match state.cache() {
        None => "disabled",
        Some(cache) => {
            if cache.is_connected().await {
                "connected"
            } else {
                "disconnected"
            }
        }
    };

    let status = if redis == "disconnected" {
        "degraded"
    } else {
        "healthy"
    };

    let response = ReadinessResponse {
        status,
        timestamp: now_iso(),
        uptime: state.uptime_seconds(),
        checks: ReadinessChecks {
            classifier: engine.classifier().source().as_str(),
            sessions: engine.session_count(),
            redis,
        },
    };
    (StatusCode::OK, Json(response)).into_response()
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
