//! Axum router configuration

use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

use super::handlers::{
    cache_stats, health_check, list_folders, list_media, media_content, thumbnail, version_check,
};

/// Create the Axum router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors_enabled = state.config.cors_enabled;

    let router = Router::new()
        .route("/health", get(health_check))
        .route("/version", get(version_check))
        .route("/debug/cache", get(cache_stats))
        .route("/api/folders", get(list_folders))
        .route("/api/folders/{folder}", get(list_media))
        .route("/thumbs/{folder}/{title}", get(thumbnail))
        .route("/media/{folder}/{title}", get(media_content))
        .layer(TraceLayer::new_for_http());

    let router = if cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::OPTIONS, Method::HEAD])
            .allow_headers([header::ACCEPT, header::CONTENT_TYPE, header::ORIGIN])
            .max_age(Duration::from_secs(3600));
        router.layer(cors)
    } else {
        router
    };

    router.with_state(state)
}
