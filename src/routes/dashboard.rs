use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use super::with_session;
use crate::response::{success, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/:id", get(get_report))
}

async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let report = with_session(&state, &id, |engine, id| engine.report(id)).await?;
    Ok(success(report))
}
