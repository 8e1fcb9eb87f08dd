//! Browser-safe delivery
//!
//! Every supported format maps to exactly one delivery path:
//!
//! | Source | Delivered as | Path |
//! |---|---|---|
//! | PNG, JPEG, GIF, MP4 | unchanged | file pass-through |
//! | HEIC | JPEG | ImageMagick, buffered |
//! | MOV | fragmented MP4 | ffmpeg, streamed live |

use std::io;

use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::io::ReaderStream;

use crate::codec::{Codecs, StreamOutcome, TranscodeStream};
use crate::error::Result;
use crate::media::{Format, Media};

/// Body of a browser-safe response
#[derive(Debug)]
pub enum BrowserSafe {
    /// Payload is already playable; served from disk
    Passthrough(tokio::fs::File),
    /// Fully converted in memory
    Converted(Bytes),
    /// Produced live by a running transcoder
    Transcoded(TranscodeStream),
}

impl BrowserSafe {
    pub fn into_stream(self) -> BoxStream<'static, io::Result<Bytes>> {
        match self {
            BrowserSafe::Passthrough(file) => ReaderStream::new(file).boxed(),
            BrowserSafe::Converted(bytes) => stream::once(async move { Ok(bytes) }).boxed(),
            BrowserSafe::Transcoded(stream) => stream.boxed(),
        }
    }
}

/// Summary of a completed delivery
#[derive(Debug)]
pub struct Delivery {
    pub bytes_written: u64,
    /// Present for transcoded bodies only
    pub outcome: Option<StreamOutcome>,
}

impl Delivery {
    /// False when a live transcode ended early. The bytes already written
    /// stay written; the client simply received a short body.
    pub fn is_complete(&self) -> bool {
        self.outcome.as_ref().map_or(true, StreamOutcome::is_complete)
    }
}

/// Turns media into something every browser can display
#[derive(Debug, Clone)]
pub struct BrowserSafeTranscoder {
    codecs: Codecs,
}

impl BrowserSafeTranscoder {
    pub fn new(codecs: Codecs) -> Self {
        Self { codecs }
    }

    /// Open the browser-safe body for `media`.
    ///
    /// Conversion failures before the first byte are returned here. A live
    /// transcode that fails later only truncates the body.
    pub async fn open(&self, media: &Media) -> Result<BrowserSafe> {
        let file = tokio::fs::File::open(media.payload_path()).await?;
        let body = match media.format {
            Format::Png | Format::Jpeg | Format::Gif | Format::Mp4 => BrowserSafe::Passthrough(file),
            Format::Heic => {
                let jpeg = self.codecs.image.transform(file, Format::Jpeg).await?;
                BrowserSafe::Converted(Bytes::from(jpeg))
            }
            Format::Mov => BrowserSafe::Transcoded(self.codecs.video.transform(file, Format::Mp4)?),
        };
        tracing::debug!(
            "Delivering {} ({}) as {}",
            media.title,
            media.format,
            media.format.browser_mime_type()
        );
        Ok(body)
    }

    /// Write the browser-safe form of `media` to `sink`.
    pub async fn deliver<W>(&self, media: &Media, sink: &mut W) -> Result<Delivery>
    where
        W: AsyncWrite + Unpin,
    {
        let mut body = self.open(media).await?;
        let outcome = match &mut body {
            BrowserSafe::Transcoded(stream) => stream.outcome(),
            _ => None,
        };

        let mut chunks = body.into_stream();
        let mut bytes_written = 0u64;
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            sink.write_all(&chunk).await?;
            bytes_written += chunk.len() as u64;
        }
        sink.flush().await?;
        drop(chunks);

        let outcome = match outcome {
            Some(handle) => handle.wait().await,
            None => None,
        };
        let delivery = Delivery {
            bytes_written,
            outcome,
        };
        if !delivery.is_complete() {
            tracing::warn!(
                "{} delivered incomplete after {} bytes",
                media.title,
                bytes_written
            );
        }
        Ok(delivery)
    }
}
