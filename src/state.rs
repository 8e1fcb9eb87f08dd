//! Application state management
//!
//! This module defines the AppState structure that holds:
//! - The loaded archive and its lazily indexed folders
//! - Thumbnail generation and browser-safe delivery
//! - Encoded thumbnail cache (LRU)
//! - Server configuration

use crate::codec::Codecs;
use crate::config::ServerConfig;
use crate::error::{Result, TakeoutError};
use crate::http::cache::ThumbnailCache;
use crate::index::{Archive, Folder};
use crate::media::Media;
use crate::transcode::{BrowserSafeTranscoder, ThumbnailGenerator};

/// Application state shared across all handlers
pub struct AppState {
    pub archive: Archive,
    pub thumbnails: ThumbnailGenerator,
    pub browser_safe: BrowserSafeTranscoder,
    pub thumbnail_cache: ThumbnailCache,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig, archive: Archive) -> Self {
        let codecs = Codecs::new(&config.codec);
        Self {
            archive,
            thumbnails: ThumbnailGenerator::new(codecs.clone(), config.thumbnail.clone()),
            browser_safe: BrowserSafeTranscoder::new(codecs),
            thumbnail_cache: ThumbnailCache::new(config.thumbnail.cache_entries),
            config,
        }
    }

    pub fn folder(&self, name: &str) -> Result<&Folder> {
        self.archive
            .get(name)
            .ok_or_else(|| TakeoutError::NotFound(format!("folder {}", name)))
    }

    /// Resolve `folder/title` to a single item.
    pub async fn media(&self, folder: &str, title: &str) -> Result<Media> {
        self.folder(folder)?.find(title).await
    }
}
