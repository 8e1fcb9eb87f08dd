//! Media entities
//!
//! A [`Media`] pairs a Takeout JSON descriptor with the payload file it
//! describes. It is built once by [`descriptor::resolve`] and never mutated.

pub mod descriptor;
pub mod format;

pub use descriptor::{is_descriptor, resolve, DESCRIPTOR_SUFFIX};
pub use format::{classify, Format, MediaKind};

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A picture or video from the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub title: String,
    pub description: String,
    /// Capture time, Unix seconds
    pub taken_at: i64,
    pub format: Format,
    payload: PathBuf,
}

impl Media {
    pub(crate) fn new(
        title: String,
        description: String,
        taken_at: i64,
        format: Format,
        payload: PathBuf,
    ) -> Self {
        Self {
            title,
            description,
            taken_at,
            format,
            payload,
        }
    }

    /// Location of the binary payload
    pub fn payload_path(&self) -> &Path {
        &self.payload
    }

    pub fn kind(&self) -> MediaKind {
        self.format.kind()
    }

    /// Capture time as a UTC timestamp, if representable
    pub fn taken_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.taken_at, 0)
    }

    /// Serializable view for listings
    pub fn summary(&self) -> MediaSummary {
        MediaSummary {
            title: self.title.clone(),
            description: self.description.clone(),
            taken_at: self.taken_at_utc().map(|t| t.to_rfc3339()),
            timestamp: self.taken_at,
            format: self.format,
            kind: self.kind(),
        }
    }
}

/// Media entry as exposed over the API
#[derive(Debug, Clone, Serialize)]
pub struct MediaSummary {
    pub title: String,
    pub description: String,
    pub taken_at: Option<String>,
    pub timestamp: i64,
    pub format: Format,
    pub kind: MediaKind,
}
