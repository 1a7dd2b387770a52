mod dashboard;
mod health;
mod sessions;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Router;

use crate::cache::keys::{session_record_key, SESSION_RECORD_TTL};
use crate::error::Result as ScreeningResult;
use crate::response::{json_error, AppError};
use crate::screening::{ScreeningEngine, SessionRecord};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/health", health::router())
        .nest("/api/sessions", sessions::router())
        .nest("/api/dashboard", dashboard::router())
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Route not found").into_response()
}

/// Runs a read operation, restoring the session from the snapshot cache
/// once if the engine does not know it.
pub(crate) async fn with_session<T, F>(
    state: &AppState,
    session_id: &str,
    op: F,
) -> Result<T, AppError>
where
    F: Fn(&ScreeningEngine, &str) -> ScreeningResult<T>,
{
    let engine = state.engine();
    match op(&*engine, session_id) {
        Err(e) if e.is_not_found() => {
            if restore_from_cache(state, session_id).await {
                op(&*engine, session_id).map_err(AppError::from)
            } else {
                Err(e.into())
            }
        }
        other => other.map_err(AppError::from),
    }
}

pub(crate) async fn restore_from_cache(state: &AppState, session_id: &str) -> bool {
    let Some(cache) = state.cache() else {
        return false;
    };
    let Some(record) = cache
        .get::<SessionRecord>(&session_record_key(session_id))
        .await
    else {
        return false;
    };
    if record.session_id != session_id {
        tracing::warn!(session_id, cached = %record.session_id, "Cached record id mismatch");
        return false;
    }

    match state.engine().restore(record) {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(session_id, error = %e, "Failed to restore cached session");
            false
        }
    }
}

pub(crate) async fn snapshot_session(state: &AppState, session_id: &str) {
    let Some(cache) = state.cache() else {
        return;
    };
    match state.engine().export_record(session_id) {
        Ok(record) => {
            cache
                .set(&session_record_key(session_id), &record, SESSION_RECORD_TTL)
                .await
        }
        Err(e) => tracing::warn!(session_id, error = %e, "Failed to export session snapshot"),
    }
}
