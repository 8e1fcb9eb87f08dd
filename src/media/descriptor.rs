//! Takeout JSON descriptor parsing
//!
//! Each payload `IMG_0001.jpg` is accompanied by `IMG_0001.jpg.json`. Only
//! `title`, `description` and `photoTakenTime.timestamp` are read; everything
//! else in the descriptor is ignored.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{format::classify, Media};
use crate::error::{Result, TakeoutError};

/// Suffix appended to the payload filename to form the descriptor filename
pub const DESCRIPTOR_SUFFIX: &str = ".json";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Descriptor {
    title: Option<String>,
    #[serde(default)]
    description: String,
    photo_taken_time: Option<TakenTime>,
}

#[derive(Debug, Deserialize)]
struct TakenTime {
    timestamp: Option<String>,
}

/// Whether a path carries the descriptor suffix (case-insensitive)
pub fn is_descriptor(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .filter(|n| n.len() > DESCRIPTOR_SUFFIX.len())
        .and_then(|n| n.get(n.len() - DESCRIPTOR_SUFFIX.len()..))
        .map(|suffix| suffix.eq_ignore_ascii_case(DESCRIPTOR_SUFFIX))
        .unwrap_or(false)
}

/// Derive the payload path by stripping the descriptor suffix
fn payload_path(descriptor: &Path) -> Result<PathBuf> {
    let name = descriptor
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            TakeoutError::InvalidInput(format!(
                "descriptor name is not valid UTF-8: {}",
                descriptor.display()
            ))
        })?;
    let stem = name
        .get(..name.len().saturating_sub(DESCRIPTOR_SUFFIX.len()))
        .unwrap_or(name);
    Ok(descriptor.with_file_name(stem))
}

/// Resolve a descriptor file into a [`Media`].
///
/// The failure variants are distinct so bulk indexing can skip and log while
/// single-item lookups can surface the exact cause.
pub fn resolve<P: AsRef<Path>>(path: P) -> Result<Media> {
    let path = path.as_ref();
    if !is_descriptor(path) {
        return Err(TakeoutError::InvalidInput(format!(
            "media descriptor must have the {} extension: {}",
            DESCRIPTOR_SUFFIX,
            path.display()
        )));
    }

    let data = std::fs::read(path)?;
    let descriptor: Descriptor =
        serde_json::from_slice(&data).map_err(|e| TakeoutError::MalformedDescriptor {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let title = descriptor
        .title
        .ok_or_else(|| TakeoutError::MalformedDescriptor {
            path: path.to_path_buf(),
            reason: "missing title".to_string(),
        })?;

    let payload = payload_path(path)?;
    let format = classify(&payload)?;

    let raw = descriptor
        .photo_taken_time
        .and_then(|t| t.timestamp)
        .ok_or_else(|| TakeoutError::MissingTimestamp {
            path: path.to_path_buf(),
        })?;
    let taken_at = raw
        .parse::<i64>()
        .map_err(|source| TakeoutError::InvalidTimestamp {
            path: path.to_path_buf(),
            value: raw.clone(),
            source,
        })?;

    tracing::trace!("Resolved {:?} as {} ({})", payload, title, format);

    Ok(Media::new(
        title,
        descriptor.description,
        taken_at,
        format,
        payload,
    ))
}
