//! HTTP server module
//!
//! This module handles HTTP request routing and handling:
//! - Axum router with the folder, thumbnail and media endpoints
//! - Request handlers mapping lookup misses to 404
//! - LRU thumbnail cache
//! - CORS middleware

pub mod cache;
pub mod handlers;
pub mod routes;

pub use routes::create_router;
