//! Server configuration

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Archive location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Root of the extracted Takeout export (contains `archive_browser.html`)
    pub root: PathBuf,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("Takeout"),
        }
    }
}

/// External codec programs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Raster image converter (ImageMagick)
    pub convert_program: PathBuf,

    /// Extra leading arguments for the converter, e.g. `["convert"]` for `magick`
    pub convert_args: Vec<String>,

    /// Audio/video transcoder (ffmpeg)
    pub ffmpeg_program: PathBuf,

    /// Extra leading arguments for the transcoder
    pub ffmpeg_args: Vec<String>,

    /// Deadline for blocking conversions and still frames, in seconds
    pub timeout_secs: u64,

    /// Deadline for a live transcode stream, in seconds
    pub stream_timeout_secs: u64,
}

impl Default for CodecConfig {
    fn default() -> Self {
        let (convert_program, convert_args) = if cfg!(windows) {
            (PathBuf::from("magick.exe"), vec!["convert".to_string()])
        } else {
            (PathBuf::from("convert"), Vec::new())
        };
        Self {
            convert_program,
            convert_args,
            ffmpeg_program: PathBuf::from(if cfg!(windows) { "ffmpeg.exe" } else { "ffmpeg" }),
            ffmpeg_args: Vec::new(),
            timeout_secs: 120,
            stream_timeout_secs: 4 * 3600,
        }
    }
}

impl CodecConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn stream_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_timeout_secs)
    }
}

/// Thumbnail configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailConfig {
    /// Bounding box for generated thumbnails
    pub max_width: u32,
    pub max_height: u32,

    /// Bounding box requested from the transcoder for video still frames
    pub still_width: u32,
    pub still_height: u32,

    /// JPEG quality of served thumbnails (1-100)
    pub jpeg_quality: u8,

    /// Maximum number of encoded thumbnails kept in memory
    pub cache_entries: usize,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_width: 300,
            max_height: 300,
            still_width: 300,
            still_height: 300,
            jpeg_quality: 80,
            cache_entries: 2048,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Archive configuration
    pub archive: ArchiveConfig,

    /// Codec configuration
    pub codec: CodecConfig,

    /// Thumbnail configuration
    pub thumbnail: ThumbnailConfig,

    /// Enable CORS
    pub cors_enabled: bool,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Log output format (pretty, json)
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            archive: ArchiveConfig::default(),
            codec: CodecConfig::default(),
            thumbnail: ThumbnailConfig::default(),
            cors_enabled: true,
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
