//! Takeout archive layout
//!
//! ```text
//! Takeout/
//!   archive_browser.html
//!   Google Photos/          (U+00A0 between the words)
//!     Photos from 2021/
//!     Holiday album/
//! ```

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::folder::Folder;
use crate::error::{Result, TakeoutError};

/// File present at the root of every Takeout export
pub const MARKER_FILE: &str = "archive_browser.html";

/// Media directory as written by the export
pub const MEDIA_DIR: &str = "Google\u{a0}Photos";

/// Same directory after an unzip tool replaced the no-break space
const MEDIA_DIR_PLAIN: &str = "Google Photos";

/// Year folders Google creates automatically
static STANDARD_FOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Photos from ([12][0-9]{3})$").unwrap());

/// Year of an automatic `Photos from YYYY` folder
fn standard_year(name: &str) -> Option<u32> {
    STANDARD_FOLDER
        .captures(name)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}

/// A loaded Takeout archive
#[derive(Debug)]
pub struct Archive {
    folders: Vec<Folder>,
}

impl Archive {
    /// Validate the layout under `root` and list its folders.
    ///
    /// Folder contents are not read until first requested.
    pub fn load<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(TakeoutError::Archive(format!(
                "{} is not a directory",
                root.display()
            )));
        }
        if !root.join(MARKER_FILE).is_file() {
            return Err(TakeoutError::Archive(format!(
                "{} has no {}",
                root.display(),
                MARKER_FILE
            )));
        }

        let media_dir = [MEDIA_DIR, MEDIA_DIR_PLAIN]
            .iter()
            .map(|name| root.join(name))
            .find(|p| p.is_dir())
            .ok_or_else(|| {
                TakeoutError::Archive(format!("{} has no Google Photos directory", root.display()))
            })?;

        let mut folders = Vec::new();
        for entry in std::fs::read_dir(&media_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => folders.push(Folder::new(name, entry.path())),
                Err(name) => tracing::warn!("Ignoring folder with non UTF-8 name {:?}", name),
            }
        }
        folders.sort_by(|a, b| a.name().cmp(b.name()));

        tracing::info!(
            "Loaded archive {} with {} folders",
            root.display(),
            folders.len()
        );

        Ok(Self { folders })
    }

    /// All folders, ordered by name
    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn get(&self, name: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.name() == name)
    }

    /// Automatic year folders, newest year first
    pub fn standard_folders(&self) -> Vec<&Folder> {
        let mut years: Vec<(u32, &Folder)> = self
            .folders
            .iter()
            .filter_map(|f| standard_year(f.name()).map(|y| (y, f)))
            .collect();
        years.sort_by(|a, b| b.0.cmp(&a.0));
        years.into_iter().map(|(_, f)| f).collect()
    }

    pub fn is_standard(folder: &Folder) -> bool {
        standard_year(folder.name()).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::fixtures::ArchiveBuilder;
    use tempfile::TempDir;

    #[test]
    fn test_load_lists_folders_by_name() {
        let dir = TempDir::new().unwrap();
        let root = ArchiveBuilder::new(dir.path())
            .folder("Photos from 2019")
            .folder("Holiday")
            .folder("Photos from 2021")
            .folder("Archive")
            .build();

        let archive = Archive::load(&root).unwrap();
        let names: Vec<_> = archive.folders().iter().map(Folder::name).collect();
        assert_eq!(
            names,
            vec!["Archive", "Holiday", "Photos from 2019", "Photos from 2021"]
        );
        assert!(archive.get("Holiday").is_some());
        assert!(archive.get("holiday").is_none());
    }

    #[test]
    fn test_standard_folders_newest_first() {
        let dir = TempDir::new().unwrap();
        let root = ArchiveBuilder::new(dir.path())
            .folder("Photos from 2019")
            .folder("Photos from 2023")
            .folder("Photos from 1999")
            .folder("Photos from 3000")
            .folder("Old Photos from 2020")
            .build();

        let archive = Archive::load(&root).unwrap();
        let names: Vec<_> = archive
            .standard_folders()
            .into_iter()
            .map(Folder::name)
            .collect();
        assert_eq!(
            names,
            vec!["Photos from 2023", "Photos from 2019", "Photos from 1999"]
        );
    }

    #[test]
    fn test_standard_year() {
        assert_eq!(standard_year("Photos from 2021"), Some(2021));
        assert_eq!(standard_year("Photos from 1999"), Some(1999));
        assert_eq!(standard_year("Photos from 3000"), None);
        assert_eq!(standard_year("photos from 2021"), None);
        assert_eq!(standard_year("Photos from 2021 (1)"), None);
    }

    #[test]
    fn test_plain_space_media_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(MARKER_FILE), "").unwrap();
        std::fs::create_dir_all(dir.path().join("Google Photos").join("Album")).unwrap();

        let archive = Archive::load(dir.path()).unwrap();
        assert_eq!(archive.folders().len(), 1);
    }

    #[test]
    fn test_missing_marker() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(MEDIA_DIR)).unwrap();
        let err = Archive::load(dir.path()).unwrap_err();
        assert!(matches!(err, TakeoutError::Archive(ref m) if m.contains(MARKER_FILE)));
    }

    #[test]
    fn test_missing_media_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(MARKER_FILE), "").unwrap();
        assert!(matches!(
            Archive::load(dir.path()),
            Err(TakeoutError::Archive(_))
        ));
    }

    #[test]
    fn test_files_are_not_folders() {
        let dir = TempDir::new().unwrap();
        let root = ArchiveBuilder::new(dir.path()).folder("Album").build();
        std::fs::write(root.join(MEDIA_DIR).join("stray.json"), "{}").unwrap();

        let archive = Archive::load(&root).unwrap();
        assert_eq!(archive.folders().len(), 1);
    }
}
