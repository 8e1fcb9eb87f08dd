//! External codec module - wraps the converter processes
//!
//! This module handles:
//! - Bounded, blocking invocations that capture the whole output
//! - Raster conversion through ImageMagick
//! - Video transcoding and still-frame extraction through ffmpeg
//! - Live transcode streams with best-effort failure reporting

pub mod command;
pub mod convert;
pub mod ffmpeg;
pub mod stream;

use std::path::{Path, PathBuf};

pub use convert::ImageConverter;
pub use ffmpeg::VideoTranscoder;
pub use stream::{OutcomeHandle, StreamEnd, StreamOutcome, TranscodeStream};

use crate::config::CodecConfig;

/// The two converters, built from configuration
#[derive(Debug, Clone)]
pub struct Codecs {
    pub image: ImageConverter,
    pub video: VideoTranscoder,
}

impl Codecs {
    pub fn new(config: &CodecConfig) -> Self {
        Self {
            image: ImageConverter::new(config),
            video: VideoTranscoder::new(config),
        }
    }
}

/// Availability of an external program
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub path: Option<PathBuf>,
}

impl ToolInfo {
    pub fn available(&self) -> bool {
        self.path.is_some()
    }
}

/// Look up a program on PATH (or as given, if it is a path).
pub fn check_tool(program: &Path) -> ToolInfo {
    ToolInfo {
        name: program.to_string_lossy().to_string(),
        path: which::which(program).ok(),
    }
}

/// Check both configured converters.
pub fn check_tools(config: &CodecConfig) -> Vec<ToolInfo> {
    vec![
        check_tool(&config.convert_program),
        check_tool(&config.ffmpeg_program),
    ]
}
