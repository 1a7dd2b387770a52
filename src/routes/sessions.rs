use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use super::{restore_from_cache, snapshot_session, with_session};
use crate::response::{success, AppError};
use crate::screening::{AgeGroup, RecordAnswerInput, TestType};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartSessionRequest {
    #[serde(default)]
    age_group: AgeGroup,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerationQuery {
    test_type: Option<String>,
    count: Option<u32>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(start_session))
        .route("/:id", get(get_session))
        .route("/:id/answers", post(record_answer))
        .route("/:id/difficulty", get(get_difficulty))
        .route("/:id/generation-request", get(get_generation_request))
        .route("/:id/analysis", get(get_analysis))
        .route("/:id/features", get(get_features))
        .route("/:id/finalize", post(finalize))
}

async fn start_session(
    State(state): State<AppState>,
    payload: Result<Json<StartSessionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    let session_id = uuid::Uuid::new_v4().to_string();
    let summary = state.engine().start_session(&session_id, request.age_group)?;
    Ok((StatusCode::CREATED, success(summary)))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let summary = with_session(&state, &id, |engine, id| engine.session_summary(id)).await?;
    Ok(success(summary))
}

async fn record_answer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<RecordAnswerInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;
    let engine = state.engine();

    // Continue a cached session instead of starting over after a restart.
    if let Err(e) = engine.session_summary(&id) {
        if e.is_not_found() {
            restore_from_cache(&state, &id).await;
        }
    }

    let outcome = engine.record_answer(&id, input)?;
    snapshot_session(&state, &id).await;
    Ok(success(outcome))
}

async fn get_difficulty(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let view = with_session(&state, &id, |engine, id| engine.difficulty_params(id)).await?;
    Ok(success(view))
}

async fn get_generation_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<GenerationQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query?;
    let test_type = match query.test_type.as_deref() {
        None => TestType::default(),
        Some(raw) => TestType::parse(raw)
            .ok_or_else(|| AppError::validation(format!("unknown test type: {raw}")))?,
    };

    let request = with_session(&state, &id, |engine, id| {
        engine.generation_request(id, test_type, query.count)
    })
    .await?;
    Ok(success(request))
}

async fn get_analysis(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let analysis = with_session(&state, &id, |engine, id| engine.behavioral_analysis(id)).await?;
    Ok(success(analysis))
}

async fn get_features(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let features = with_session(&state, &id, |engine, id| engine.get_feature_vector(id)).await?;
    Ok(success(features))
}

async fn finalize(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let assessment = with_session(&state, &id, |engine, id| engine.finalize(id)).await?;
    Ok(success(assessment))
}
