//! Test fixtures
//!
//! Builds small Takeout archives on disk and codec configurations that run
//! shell snippets in place of ImageMagick and ffmpeg.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, RgbImage};

use crate::config::{CodecConfig, ServerConfig};
use crate::index::archive::{Archive, MARKER_FILE, MEDIA_DIR};
use crate::media::{Format, Media};
use crate::state::AppState;

/// Codec configuration whose converter and transcoder are `sh -c <script>`.
///
/// The script sees the real tool arguments as `$1`, `$2`, ... and the source
/// bytes on stdin.
pub fn sh_codec_config(convert_script: &str, ffmpeg_script: &str) -> CodecConfig {
    CodecConfig {
        convert_program: PathBuf::from("sh"),
        convert_args: vec!["-c".into(), convert_script.into(), "sh".into()],
        ffmpeg_program: PathBuf::from("sh"),
        ffmpeg_args: vec!["-c".into(), ffmpeg_script.into(), "sh".into()],
        timeout_secs: 30,
        stream_timeout_secs: 60,
    }
}

/// Write a gradient image of the given size and format.
pub fn write_image(dir: &Path, name: &str, width: u32, height: u32, format: ImageFormat) -> PathBuf {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let img = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(img),
        _ => DynamicImage::ImageRgba8(DynamicImage::ImageRgb8(img).to_rgba8()),
    };
    let path = dir.join(name);
    img.save_with_format(&path, format).unwrap();
    path
}

/// A Media entity pointing straight at `payload`.
pub fn media_for(payload: &Path, format: Format) -> Media {
    let title = payload
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    Media::new(title, String::new(), 1_600_000_000, format, payload.to_path_buf())
}

/// Write `<payload>.json` describing `payload`. Returns the descriptor path.
pub fn write_descriptor(dir: &Path, payload: &str, title: &str, taken_at: i64) -> PathBuf {
    let path = dir.join(format!("{payload}.json"));
    let json = serde_json::json!({
        "title": title,
        "description": "",
        "photoTakenTime": { "timestamp": taken_at.to_string(), "formatted": "" },
        "geoData": { "latitude": 0.0, "longitude": 0.0 },
    });
    std::fs::write(&path, json.to_string()).unwrap();
    path
}

/// Lays out a Takeout export under a temporary directory
pub struct ArchiveBuilder {
    root: PathBuf,
}

impl ArchiveBuilder {
    pub fn new(dir: &Path) -> Self {
        let root = dir.join("Takeout");
        std::fs::create_dir_all(root.join(MEDIA_DIR)).unwrap();
        std::fs::write(root.join(MARKER_FILE), "<html></html>").unwrap();
        Self { root }
    }

    fn folder_path(&self, folder: &str) -> PathBuf {
        self.root.join(MEDIA_DIR).join(folder)
    }

    pub fn folder(self, name: &str) -> Self {
        std::fs::create_dir_all(self.folder_path(name)).unwrap();
        self
    }

    /// Descriptor plus an opaque payload.
    pub fn media(self, folder: &str, payload: &str, title: &str, taken_at: i64) -> Self {
        let dir = self.folder_path(folder);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(payload), format!("payload of {title}")).unwrap();
        write_descriptor(&dir, payload, title, taken_at);
        self
    }

    /// Descriptor plus a real, decodable image payload.
    pub fn image(
        self,
        folder: &str,
        payload: &str,
        title: &str,
        taken_at: i64,
        size: (u32, u32),
        format: ImageFormat,
    ) -> Self {
        let dir = self.folder_path(folder);
        std::fs::create_dir_all(&dir).unwrap();
        write_image(&dir, payload, size.0, size.1, format);
        write_descriptor(&dir, payload, title, taken_at);
        self
    }

    pub fn build(self) -> PathBuf {
        self.root
    }
}

/// Application state over a freshly built archive, with pass-through
/// (`cat`) codecs.
pub fn test_state<F>(dir: &Path, layout: F) -> Arc<AppState>
where
    F: FnOnce(ArchiveBuilder) -> ArchiveBuilder,
{
    let root = layout(ArchiveBuilder::new(dir)).build();
    let mut config = ServerConfig::default();
    config.archive.root = root.clone();
    config.codec = sh_codec_config("cat", "cat");
    Arc::new(AppState::new(config, Archive::load(&root).unwrap()))
}
