//! Archive indexing module
//!
//! This module handles discovery of media in a Takeout export:
//! - Archive layout validation and folder listing
//! - Lazy, one-time resolution of each folder's descriptors
//! - Aggregate descriptor filtering (localised `metadata.json` variants)

pub mod archive;
pub mod folder;

pub use archive::Archive;
pub use folder::{scan_folder, Folder, FolderScan};
