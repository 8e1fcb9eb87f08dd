//! Folder media index
//!
//! A folder's media list is built on first access by resolving every
//! descriptor in the directory. Descriptors that fail to resolve are logged
//! and skipped. The list is sorted newest first and never changes afterwards.

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tokio::sync::OnceCell;
use unicode_normalization::UnicodeNormalization;

use crate::error::{Result, TakeoutError};
use crate::media::{self, Media};

/// Export-level JSON files that describe the album rather than an item.
/// Localised exports translate the `metadata` name.
const RESERVED_DESCRIPTORS: &[&str] = &[
    "metadata",
    "métadonnées",
    "metadaten",
    "metadatos",
    "metadati",
    "metadados",
    "metagegevens",
    "metadane",
    "метаданные",
    "メタデータ",
    "元数据",
    "中繼資料",
    "메타데이터",
    "print-subscriptions",
    "shared_album_comments",
    "user-generated-memory-titles",
];

/// `name(2).json` style duplicates produced by the export
static DUPLICATE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<base>.+?)(?:\(\d+\))?\.json$").unwrap());

/// Whether `file_name` is an aggregate descriptor that must not be indexed
pub fn is_reserved_descriptor(file_name: &str) -> bool {
    let normalized: String = file_name.nfc().collect::<String>().to_lowercase();
    DUPLICATE_MARKER
        .captures(&normalized)
        .and_then(|c| c.name("base"))
        .map(|base| RESERVED_DESCRIPTORS.contains(&base.as_str()))
        .unwrap_or(false)
}

/// Result of resolving every descriptor in a directory
#[derive(Debug)]
pub struct FolderScan {
    /// Sorted by capture time, newest first
    pub media: Vec<Media>,
    pub skipped: Vec<(PathBuf, TakeoutError)>,
}

/// Resolve all item descriptors under `dir`.
///
/// Descriptors are visited in name order, so items sharing a timestamp keep
/// that order after sorting.
pub fn scan_folder(dir: &Path) -> Result<FolderScan> {
    let mut descriptors = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if !media::is_descriptor(&path) {
            continue;
        }
        let reserved = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(is_reserved_descriptor)
            .unwrap_or(false);
        if reserved {
            tracing::trace!("Ignoring aggregate descriptor {:?}", path);
            continue;
        }
        descriptors.push(path);
    }
    descriptors.sort();

    let mut found = Vec::with_capacity(descriptors.len());
    let mut skipped = Vec::new();
    for path in descriptors {
        match media::resolve(&path) {
            Ok(item) => found.push(item),
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", path, e);
                skipped.push((path, e));
            }
        }
    }

    found.sort_by(|a, b| b.taken_at.cmp(&a.taken_at));

    Ok(FolderScan {
        media: found,
        skipped,
    })
}

/// An album directory inside the archive
#[derive(Debug)]
pub struct Folder {
    name: String,
    path: PathBuf,
    media: OnceCell<Arc<[Media]>>,
}

impl Folder {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            media: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the list has been built yet
    pub fn is_indexed(&self) -> bool {
        self.media.initialized()
    }

    /// All media in this folder, newest first.
    ///
    /// The directory is scanned once; concurrent first callers wait for the
    /// same scan.
    pub async fn media(&self) -> Result<Arc<[Media]>> {
        let media = self
            .media
            .get_or_try_init(|| async {
                let dir = self.path.clone();
                let scan = tokio::task::spawn_blocking(move || scan_folder(&dir))
                    .await
                    .map_err(|e| TakeoutError::Io(std::io::Error::other(e)))??;
                tracing::info!(
                    "Indexed folder {}: {} items, {} skipped",
                    self.name,
                    scan.media.len(),
                    scan.skipped.len()
                );
                Ok::<_, TakeoutError>(Arc::from(scan.media))
            })
            .await?;
        Ok(Arc::clone(media))
    }

    /// Look up an item by its title.
    pub async fn find(&self, title: &str) -> Result<Media> {
        self.media()
            .await?
            .iter()
            .find(|m| m.title == title)
            .cloned()
            .ok_or_else(|| TakeoutError::NotFound(format!("{}/{}", self.name, title)))
    }
}
