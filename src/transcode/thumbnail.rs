//! Thumbnail generation
//!
//! PNG, JPEG and GIF are decoded in-process. HEIC is converted to JPEG by
//! ImageMagick first, and videos are represented by their first frame as
//! extracted by ffmpeg. The result is shrunk to fit the configured bounding
//! box; it is never enlarged and its aspect ratio is kept.

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use tokio::io::AsyncReadExt;

use crate::codec::Codecs;
use crate::config::ThumbnailConfig;
use crate::error::GenerationError;
use crate::media::{Format, Media};

/// Produces bounded preview images for media
#[derive(Debug, Clone)]
pub struct ThumbnailGenerator {
    codecs: Codecs,
    config: ThumbnailConfig,
}

/// Decoder the `image` crate uses for a natively supported format
fn native_decoder(format: Format) -> Option<ImageFormat> {
    match format {
        Format::Png => Some(ImageFormat::Png),
        Format::Jpeg => Some(ImageFormat::Jpeg),
        Format::Gif => Some(ImageFormat::Gif),
        Format::Heic | Format::Mov | Format::Mp4 => None,
    }
}

impl ThumbnailGenerator {
    pub fn new(codecs: Codecs, config: ThumbnailConfig) -> Self {
        Self { codecs, config }
    }

    /// Generate a thumbnail for `media`.
    pub async fn thumbnail(&self, media: &Media) -> Result<DynamicImage, GenerationError> {
        let mut file = tokio::fs::File::open(media.payload_path()).await?;

        let (data, decoder) = if media.format.is_video() {
            let frame = self
                .codecs
                .video
                .extract_still_frame(file, self.config.still_width, self.config.still_height)
                .await?;
            (frame, ImageFormat::Jpeg)
        } else if let Some(decoder) = native_decoder(media.format) {
            let mut data = Vec::new();
            file.read_to_end(&mut data).await?;
            (data, decoder)
        } else {
            let converted = self.codecs.image.transform(file, Format::Jpeg).await?;
            (converted, ImageFormat::Jpeg)
        };

        if !decoder.reading_enabled() {
            return Err(GenerationError::Unsupported(media.format));
        }

        let (max_width, max_height) = (self.config.max_width, self.config.max_height);
        let title = media.title.clone();
        tokio::task::spawn_blocking(move || -> Result<DynamicImage, GenerationError> {
            let img = image::load_from_memory_with_format(&data, decoder)?;
            tracing::debug!(
                "Decoded {} ({}x{}) for thumbnail",
                title,
                img.width(),
                img.height()
            );
            Ok(fit_within(img, max_width, max_height))
        })
        .await
        .map_err(|e| GenerationError::Worker(e.to_string()))?
    }

    /// Generate a thumbnail and encode it as JPEG.
    pub async fn thumbnail_jpeg(&self, media: &Media) -> Result<Bytes, GenerationError> {
        let img = self.thumbnail(media).await?;
        let quality = self.config.jpeg_quality;
        tokio::task::spawn_blocking(move || encode_jpeg(&img, quality))
            .await
            .map_err(|e| GenerationError::Worker(e.to_string()))?
    }
}

/// Shrink `img` to fit within `max_width`x`max_height`, keeping its aspect ratio.
/// Images that already fit are returned untouched.
pub fn fit_within(img: DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    if img.width() <= max_width && img.height() <= max_height {
        return img;
    }
    img.resize(max_width, max_height, FilterType::CatmullRom)
}

/// Encode as baseline JPEG. Alpha is dropped since JPEG cannot carry it.
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Bytes, GenerationError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buf = Cursor::new(Vec::new());
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100)))?;
    Ok(Bytes::from(buf.into_inner()))
}
