//! Configuration file support
//!
//! Loads server configuration from TOML files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::{ArchiveConfig, CodecConfig, ServerConfig, ThumbnailConfig};
use crate::error::{Result, TakeoutError};

/// Configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Server settings
    pub server: ServerSettings,
    /// Archive settings
    pub archive: ArchiveSettings,
    /// Codec settings
    pub codec: Option<CodecSettings>,
    /// Thumbnail settings
    pub thumbnail: Option<ThumbnailSettings>,
    /// Logging settings
    pub logging: Option<LoggingSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Enable CORS
    pub cors_enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveSettings {
    /// Takeout root directory
    pub root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodecSettings {
    pub convert_program: Option<PathBuf>,
    pub convert_args: Option<Vec<String>>,
    pub ffmpeg_program: Option<PathBuf>,
    pub ffmpeg_args: Option<Vec<String>>,
    pub timeout_secs: Option<u64>,
    pub stream_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailSettings {
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub still_width: Option<u32>,
    pub still_height: Option<u32>,
    pub jpeg_quality: Option<u8>,
    pub cache_entries: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: Option<String>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content).map_err(|e| TakeoutError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| TakeoutError::Config(e.to_string()))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Generate default configuration file
    pub fn default_config() -> Self {
        let codec = CodecConfig::default();
        let thumbnail = ThumbnailConfig::default();
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 8080,
                cors_enabled: Some(true),
            },
            archive: ArchiveSettings {
                root: ArchiveConfig::default().root,
            },
            codec: Some(CodecSettings {
                convert_program: Some(codec.convert_program),
                convert_args: Some(codec.convert_args),
                ffmpeg_program: Some(codec.ffmpeg_program),
                ffmpeg_args: Some(codec.ffmpeg_args),
                timeout_secs: Some(codec.timeout_secs),
                stream_timeout_secs: Some(codec.stream_timeout_secs),
            }),
            thumbnail: Some(ThumbnailSettings {
                max_width: Some(thumbnail.max_width),
                max_height: Some(thumbnail.max_height),
                still_width: Some(thumbnail.still_width),
                still_height: Some(thumbnail.still_height),
                jpeg_quality: Some(thumbnail.jpeg_quality),
                cache_entries: Some(thumbnail.cache_entries),
            }),
            logging: Some(LoggingSettings {
                level: "info".to_string(),
                format: Some("pretty".to_string()),
            }),
        }
    }

    /// Convert to ServerConfig, filling unset fields with defaults
    pub fn into_server_config(self) -> ServerConfig {
        let codec_defaults = CodecConfig::default();
        let thumb_defaults = ThumbnailConfig::default();

        let codec = match self.codec {
            Some(c) => CodecConfig {
                convert_program: c.convert_program.unwrap_or(codec_defaults.convert_program),
                convert_args: c.convert_args.unwrap_or(codec_defaults.convert_args),
                ffmpeg_program: c.ffmpeg_program.unwrap_or(codec_defaults.ffmpeg_program),
                ffmpeg_args: c.ffmpeg_args.unwrap_or(codec_defaults.ffmpeg_args),
                timeout_secs: c.timeout_secs.unwrap_or(codec_defaults.timeout_secs),
                stream_timeout_secs: c
                    .stream_timeout_secs
                    .unwrap_or(codec_defaults.stream_timeout_secs),
            },
            None => codec_defaults,
        };

        let thumbnail = match self.thumbnail {
            Some(t) => ThumbnailConfig {
                max_width: t.max_width.unwrap_or(thumb_defaults.max_width),
                max_height: t.max_height.unwrap_or(thumb_defaults.max_height),
                still_width: t.still_width.unwrap_or(thumb_defaults.still_width),
                still_height: t.still_height.unwrap_or(thumb_defaults.still_height),
                jpeg_quality: t.jpeg_quality.unwrap_or(thumb_defaults.jpeg_quality),
                cache_entries: t.cache_entries.unwrap_or(thumb_defaults.cache_entries),
            },
            None => thumb_defaults,
        };

        let (log_level, log_format) = match self.logging {
            Some(l) => (l.level, l.format.unwrap_or_else(|| "pretty".to_string())),
            None => ("info".to_string(), "pretty".to_string()),
        };

        ServerConfig {
            host: self.server.host,
            port: self.server.port,
            archive: ArchiveConfig {
                root: self.archive.root,
            },
            codec,
            thumbnail,
            cors_enabled: self.server.cors_enabled.unwrap_or(true),
            log_level,
            log_format,
        }
    }
}

/// Generate default configuration file at the specified path
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    ConfigFile::default_config().to_file(path)
}
