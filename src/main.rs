//! Takeout Photo Server
//!
//! Browses an extracted Google Photos Takeout export over HTTP: folder and
//! media listings, bounded JPEG thumbnails, and browser-safe delivery of
//! HEIC and MOV media through ImageMagick and ffmpeg.
//!
//! Usage: `takeout-server [config.toml] [takeout-root]`, or
//! `takeout-server --init-config [config.toml]` to write a default config.

#![allow(dead_code)]

mod codec;
mod config;
mod config_file;
mod error;
mod http;
mod index;
#[cfg(test)]
mod integration;
mod media;
mod state;
mod transcode;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::config_file::ConfigFile;
use crate::error::{Result, TakeoutError};
use crate::http::create_router;
use crate::index::Archive;
use crate::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "takeout-server";

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1).peekable();
    if args.next_if(|a| a == "--init-config").is_some() {
        let path = args.next().unwrap_or_else(|| "config.toml".to_string());
        config_file::generate_default_config(&path)?;
        println!("Wrote default configuration to {}", path);
        return Ok(());
    }

    let config_path = args.next().unwrap_or_else(|| "config.toml".to_string());
    let (mut config, load_error) = load_config(&config_path);
    if let Some(root) = args.next() {
        config.archive.root = root.into();
    }

    init_logging(&config);

    tracing::info!("{} v{} starting", APP_NAME, VERSION);
    if let Some(e) = load_error {
        tracing::warn!(
            "Failed to load config file {}: {}. Using defaults.",
            config_path,
            e
        );
    }
    tracing::info!("Configuration loaded: {:?}", config);

    for tool in codec::check_tools(&config.codec) {
        match &tool.path {
            Some(path) => tracing::info!("Found {} at {}", tool.name, path.display()),
            None => tracing::warn!(
                "{} not found; HEIC and MOV media will fail to convert",
                tool.name
            ),
        }
    }

    let archive = Archive::load(&config.archive.root)?;
    let state = Arc::new(AppState::new(config.clone(), archive));

    let app = create_router(state);

    let addr: SocketAddr = config
        .socket_addr()
        .parse()
        .map_err(|e| TakeoutError::Config(format!("invalid listen address: {}", e)))?;
    tracing::info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Read the config file, falling back to defaults when it is absent or invalid
fn load_config(path: &str) -> (ServerConfig, Option<TakeoutError>) {
    if !std::path::Path::new(path).exists() {
        return (ServerConfig::default(), None);
    }
    match ConfigFile::from_file(path) {
        Ok(cf) => (cf.into_server_config(), None),
        Err(e) => (ServerConfig::default(), Some(e)),
    }
}

/// Initialize logging with tracing
fn init_logging(config: &ServerConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("takeout_server={},tower_http=debug", config.log_level).into()
    });
    let registry = tracing_subscriber::registry().with(filter);

    if config.log_format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
