use std::path::PathBuf;

use thiserror::Error;

use crate::media::Format;

/// Main error type for the takeout server
#[derive(Error, Debug)]
pub enum TakeoutError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown media format: {}", path.display())]
    UnknownFormat { path: PathBuf },

    #[error("Malformed descriptor {}: {reason}", path.display())]
    MalformedDescriptor { path: PathBuf, reason: String },

    #[error("Descriptor {} has no photoTakenTime.timestamp", path.display())]
    MissingTimestamp { path: PathBuf },

    #[error("Descriptor {} has an invalid timestamp {value:?}: {source}", path.display())]
    InvalidTimestamp {
        path: PathBuf,
        value: String,
        source: std::num::ParseIntError,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid archive: {0}")]
    Archive(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Thumbnail generation failed: {0}")]
    Generation(#[from] GenerationError),
}

/// External codec process errors
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to spawn {tool}: {source}")]
    Spawn {
        tool: String,
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    Exited {
        tool: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("{tool} timed out after {secs}s")]
    TimedOut { tool: String, secs: u64 },

    #[error("{tool} cannot produce {target}")]
    Unsupported { tool: String, target: Format },

    #[error("I/O error talking to {tool}: {source}")]
    Io {
        tool: String,
        source: std::io::Error,
    },
}

impl CodecError {
    /// Name of the program that failed.
    pub fn tool(&self) -> &str {
        match self {
            CodecError::Spawn { tool, .. }
            | CodecError::Exited { tool, .. }
            | CodecError::TimedOut { tool, .. }
            | CodecError::Unsupported { tool, .. }
            | CodecError::Io { tool, .. } => tool,
        }
    }
}

/// Thumbnail pipeline errors
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("No thumbnail handler for {0}")]
    Unsupported(Format),

    #[error("Failed to read payload: {0}")]
    Io(#[from] std::io::Error),

    #[error("Thumbnail worker failed: {0}")]
    Worker(String),
}

impl TakeoutError {
    /// Whether this is an expected lookup miss rather than a failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, TakeoutError::NotFound(_))
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, TakeoutError>;
