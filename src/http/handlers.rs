//! HTTP request handlers
//!
//! Implements handlers for the folder listing, thumbnail and media endpoints.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::TakeoutError;
use crate::index::Archive;
use crate::media::MediaSummary;
use crate::state::AppState;

/// HTTP error type
#[derive(Debug)]
pub enum HttpError {
    NotFound(String),
    Internal,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        match self {
            HttpError::NotFound(what) => {
                (StatusCode::NOT_FOUND, format!("Not found: {}", what)).into_response()
            }
            HttpError::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

impl From<TakeoutError> for HttpError {
    fn from(err: TakeoutError) -> Self {
        match err {
            TakeoutError::NotFound(what) => HttpError::NotFound(what),
            other => {
                tracing::error!("Request failed: {}", other);
                HttpError::Internal
            }
        }
    }
}

/// Folder entry as exposed over the API
#[derive(Debug, Serialize)]
pub struct FolderInfo {
    pub name: String,
    pub standard: bool,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// Version endpoint
pub async fn version_check() -> &'static str {
    concat!("takeout-server v", env!("CARGO_PKG_VERSION"))
}

/// Folder listing
/// GET /api/folders
pub async fn list_folders(State(state): State<Arc<AppState>>) -> Json<Vec<FolderInfo>> {
    let folders = state
        .archive
        .folders()
        .iter()
        .map(|f| FolderInfo {
            name: f.name().to_string(),
            standard: Archive::is_standard(f),
        })
        .collect();
    Json(folders)
}

/// Media in one folder, newest first
/// GET /api/folders/{folder}
pub async fn list_media(
    State(state): State<Arc<AppState>>,
    Path(folder): Path<String>,
) -> Result<Json<Vec<MediaSummary>>, HttpError> {
    let media = state.folder(&folder)?.media().await?;
    Ok(Json(media.iter().map(|m| m.summary()).collect()))
}

/// JPEG thumbnail
/// GET /thumbs/{folder}/{title}
pub async fn thumbnail(
    State(state): State<Arc<AppState>>,
    Path((folder, title)): Path<(String, String)>,
) -> Result<Response, HttpError> {
    let data = match state.thumbnail_cache.get(&folder, &title) {
        Some(data) => {
            tracing::debug!("Thumbnail cache hit: {}/{}", folder, title);
            data
        }
        None => {
            let media = state.media(&folder, &title).await?;
            let data = state
                .thumbnails
                .thumbnail_jpeg(&media)
                .await
                .map_err(TakeoutError::from)?;
            state.thumbnail_cache.insert(&folder, &title, data.clone());
            data
        }
    };

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/jpeg"));
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=86400"),
    );

    Ok((headers, data).into_response())
}

/// Browser-safe media body
/// GET /media/{folder}/{title}
pub async fn media_content(
    State(state): State<Arc<AppState>>,
    Path((folder, title)): Path<(String, String)>,
) -> Result<Response, HttpError> {
    let media = state.media(&folder, &title).await?;
    let body = state.browser_safe.open(&media).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(media.format.browser_mime_type()),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    Ok((headers, Body::from_stream(body.into_stream())).into_response())
}

/// Debug endpoint - thumbnail cache statistics
pub async fn cache_stats(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let stats = state.thumbnail_cache.stats();

    Json(serde_json::json!({
        "entry_count": stats.entry_count,
        "total_size_bytes": stats.total_size_bytes,
        "max_entries": stats.max_entries,
        "indexed_folders": state.archive.folders().iter().filter(|f| f.is_indexed()).count(),
    }))
}
