//! Media format classification
//!
//! Maps a payload filename extension to a [`Format`]. Every format is either a
//! picture or a video; there is no catch-all, an unrecognized extension is an
//! error.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::error::{Result, TakeoutError};

/// Media format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Format {
    Png,
    Jpeg,
    Heic,
    Gif,
    Mov,
    Mp4,
}

/// Broad media category of a format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Picture,
    Video,
}

impl Format {
    pub const ALL: [Format; 6] = [
        Format::Png,
        Format::Jpeg,
        Format::Heic,
        Format::Gif,
        Format::Mov,
        Format::Mp4,
    ];

    /// Look up a format by (case-insensitive) file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Some(Format::Jpeg),
            "png" => Some(Format::Png),
            "heic" => Some(Format::Heic),
            "gif" => Some(Format::Gif),
            "mov" => Some(Format::Mov),
            "mp4" => Some(Format::Mp4),
            _ => None,
        }
    }

    pub fn kind(self) -> MediaKind {
        match self {
            Format::Png | Format::Jpeg | Format::Heic | Format::Gif => MediaKind::Picture,
            Format::Mov | Format::Mp4 => MediaKind::Video,
        }
    }

    pub fn is_picture(self) -> bool {
        self.kind() == MediaKind::Picture
    }

    pub fn is_video(self) -> bool {
        self.kind() == MediaKind::Video
    }

    /// Format token understood by the external converters
    pub fn codec_token(self) -> &'static str {
        match self {
            Format::Png => "png",
            Format::Jpeg => "jpeg",
            Format::Heic => "heic",
            Format::Gif => "gif",
            Format::Mov => "mov",
            Format::Mp4 => "mp4",
        }
    }

    /// MIME type of the payload as stored in the archive
    pub fn mime_type(self) -> &'static str {
        match self {
            Format::Png => "image/png",
            Format::Jpeg => "image/jpeg",
            Format::Heic => "image/heic",
            Format::Gif => "image/gif",
            Format::Mov => "video/quicktime",
            Format::Mp4 => "video/mp4",
        }
    }

    /// MIME type of the stream produced by browser-safe delivery
    pub fn browser_mime_type(self) -> &'static str {
        match self {
            Format::Heic => "image/jpeg",
            Format::Mov => "video/mp4",
            other => other.mime_type(),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Png => "PNG",
            Format::Jpeg => "JPEG",
            Format::Heic => "HEIC",
            Format::Gif => "GIF",
            Format::Mov => "MOV",
            Format::Mp4 => "MP4",
        };
        f.write_str(name)
    }
}

/// Classify a payload path by its extension. No I/O is performed.
pub fn classify<P: AsRef<Path>>(path: P) -> Result<Format> {
    let path = path.as_ref();
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(Format::from_extension)
        .ok_or_else(|| TakeoutError::UnknownFormat {
            path: path.to_path_buf(),
        })
}
