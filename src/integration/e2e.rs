//! End-to-end router tests
//!
//! Each test builds an archive on disk, loads it, and drives the router
//! in-process.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use image::ImageFormat;
use tempfile::TempDir;
use tower::util::ServiceExt;

use crate::http::create_router;
use crate::integration::fixtures::{test_state, ArchiveBuilder};

fn app<F>(dir: &TempDir, layout: F) -> Router
where
    F: FnOnce(ArchiveBuilder) -> ArchiveBuilder,
{
    create_router(test_state(dir.path(), layout))
}

async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

fn content_type(response: &Response) -> &str {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn folders_are_listed_with_standard_flag() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir, |b| b.folder("Photos from 2020").folder("Trip"));

    let response = get(&app, "/api/folders").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body(response).await).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {"name": "Photos from 2020", "standard": true},
            {"name": "Trip", "standard": false},
        ])
    );
}

#[tokio::test]
async fn media_listing_is_newest_first_and_skips_broken() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir, |b| {
        b.media("Trip", "a.jpg", "Morning", 1_000)
            .media("Trip", "b.mov", "Evening", 3_000)
            .media("Trip", "c.heic", "Noon", 2_000)
            .media("Trip", "d.avi", "Unsupported", 4_000)
    });

    let response = get(&app, "/api/folders/Trip").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body(response).await).unwrap();
    let items = json.as_array().unwrap();
    let titles: Vec<_> = items.iter().map(|m| m["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Evening", "Noon", "Morning"]);
    assert_eq!(items[0]["format"], "MOV");
    assert_eq!(items[0]["kind"], "video");
    assert_eq!(items[2]["taken_at"], "1970-01-01T00:16:40+00:00");
}

#[tokio::test]
async fn unknown_folder_and_title_are_404() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir, |b| b.media("Trip", "a.jpg", "Morning", 1));

    assert_eq!(get(&app, "/api/folders/Nope").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/thumbs/Trip/Evening").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/media/Nope/Morning").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn thumbnail_is_bounded_jpeg_and_cached() {
    let dir = TempDir::new().unwrap();
    let state = test_state(dir.path(), |b| {
        b.image("Trip", "wide.png", "Wide", 1, (1200, 600), ImageFormat::Png)
    });
    let app = create_router(state.clone());

    let response = get(&app, "/thumbs/Trip/Wide").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "image/jpeg");
    let data = body(response).await;
    let thumb = image::load_from_memory_with_format(&data, ImageFormat::Jpeg).unwrap();
    assert_eq!((thumb.width(), thumb.height()), (300, 150));
    assert!(state.thumbnail_cache.contains("Trip", "Wide"));

    let again = body(get(&app, "/thumbs/Trip/Wide").await).await;
    assert_eq!(again, data);
}

#[tokio::test]
async fn undecodable_thumbnail_is_500() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir, |b| b.media("Trip", "fake.png", "Fake", 1));

    let response = get(&app, "/thumbs/Trip/Fake").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = String::from_utf8(body(response).await).unwrap();
    assert!(!text.contains("fake.png"));
}

#[tokio::test]
async fn passthrough_media_is_unchanged() {
    let dir = TempDir::new().unwrap();
    let state = test_state(dir.path(), |b| {
        b.image("Trip", "shot.png", "Shot", 1, (32, 32), ImageFormat::Png)
    });
    let payload = state.media("Trip", "Shot").await.unwrap();
    let app = create_router(state);

    let response = get(&app, "/media/Trip/Shot").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "image/png");
    assert_eq!(
        body(response).await,
        std::fs::read(payload.payload_path()).unwrap()
    );
}

#[cfg(unix)]
#[tokio::test]
async fn heic_is_served_as_jpeg() {
    let dir = TempDir::new().unwrap();
    // `cat` stands in for the converter, so the payload must already be JPEG.
    let app = app(&dir, |b| {
        b.image("Trip", "photo.heic", "Photo", 1, (64, 64), ImageFormat::Jpeg)
    });

    let response = get(&app, "/media/Trip/Photo").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "image/jpeg");
    let data = body(response).await;
    assert!(image::load_from_memory_with_format(&data, ImageFormat::Jpeg).is_ok());
}

#[cfg(unix)]
#[tokio::test]
async fn mov_is_streamed_as_mp4() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir, |b| b.media("Trip", "clip.mov", "Clip", 1));

    let response = get(&app, "/media/Trip/Clip").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "video/mp4");
    assert_eq!(body(response).await, b"payload of Clip");
}
