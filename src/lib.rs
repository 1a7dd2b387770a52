pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod response;
pub mod routes;
pub mod screening;
pub mod state;

use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::cache::RedisCache;
use crate::state::AppState;

pub fn create_app_with(state: AppState) -> axum::Router {
    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn connect_cache(redis_url: Option<&str>) -> Option<Arc<RedisCache>> {
    let url = redis_url?;
    match RedisCache::connect(url).await {
        Ok(cache) => {
            tracing::info!("Redis snapshot cache connected");
            Some(Arc::new(cache))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Redis unavailable, session snapshots disabled");
            None
        }
    }
}
