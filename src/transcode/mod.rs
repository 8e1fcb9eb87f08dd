//! Derived renditions of media
//!
//! This module handles:
//! - Bounded thumbnails for every supported format
//! - Browser-safe delivery (pass-through, HEIC to JPEG, MOV to fragmented MP4)

pub mod browser_safe;
pub mod thumbnail;

pub use browser_safe::{BrowserSafe, BrowserSafeTranscoder, Delivery};
pub use thumbnail::{encode_jpeg, fit_within, ThumbnailGenerator};
