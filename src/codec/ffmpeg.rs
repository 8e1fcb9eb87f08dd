//! Audio/video conversion through ffmpeg
//!
//! Source bytes always arrive on `pipe:0` and results leave on `pipe:1`.

use std::time::Duration;

use tokio::io::AsyncRead;

use super::command::{feed_stdin, ToolCommand};
use super::stream::TranscodeStream;
use crate::config::CodecConfig;
use crate::error::CodecError;
use crate::media::Format;

/// ffmpeg wrapper for full transcodes and still frames
#[derive(Debug, Clone)]
pub struct VideoTranscoder {
    base: ToolCommand,
    stream_timeout: Duration,
}

impl VideoTranscoder {
    pub fn new(config: &CodecConfig) -> Self {
        let mut base = ToolCommand::new(config.ffmpeg_program.clone());
        base.args(config.ffmpeg_args.iter().cloned())
            .args(["-hide_banner", "-nostdin", "-loglevel", "error"])
            .timeout(config.timeout());
        Self {
            base,
            stream_timeout: config.stream_timeout(),
        }
    }

    pub fn tool_name(&self) -> String {
        self.base.tool_name()
    }

    fn with_input(&self) -> ToolCommand {
        let mut cmd = self.base.clone();
        cmd.args(["-i", "pipe:0"]);
        cmd
    }

    /// Start transcoding `source` to `target` and return the live output.
    ///
    /// Spawn failures are reported immediately. Anything that goes wrong
    /// later only shows up in the stream's outcome.
    pub fn transform<R>(&self, source: R, target: Format) -> Result<TranscodeStream, CodecError>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        if !target.is_video() {
            return Err(CodecError::Unsupported {
                tool: self.tool_name(),
                target,
            });
        }
        let mut cmd = self.with_input();
        cmd.args(video_output_args(target));
        cmd.arg("pipe:1");

        let tool = cmd.tool_name();
        let mut child = cmd.spawn()?;
        feed_stdin(tool.clone(), child.stdin.take(), source);
        tracing::debug!("Streaming {} transcode to {}", tool, target);

        Ok(TranscodeStream::spawn(tool, child, self.stream_timeout))
    }

    /// Extract the first frame, scaled to fit `width`x`height`, as one JPEG.
    pub async fn extract_still_frame<R>(
        &self,
        source: R,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, CodecError>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let mut cmd = self.with_input();
        cmd.args(still_frame_args(width, height));
        cmd.run(source).await
    }
}

/// Output options for a video target: fragmented MP4/MOV with H.264 and AAC,
/// so it can be written to a pipe and played while still downloading.
fn video_output_args(target: Format) -> Vec<String> {
    let args = [
        "-map",
        "0:v:0",
        "-map",
        "0:a:0?",
        "-c:v",
        "libx264",
        "-preset",
        "veryfast",
        "-pix_fmt",
        "yuv420p",
        "-c:a",
        "aac",
        "-movflags",
        "frag_keyframe+empty_moov+default_base_moof",
        "-f",
        target.codec_token(),
    ];
    args.iter().map(|s| s.to_string()).collect()
}

fn still_frame_args(width: u32, height: u32) -> Vec<String> {
    vec![
        "-frames:v".to_string(),
        "1".to_string(),
        "-vf".to_string(),
        format!("scale=w={width}:h={height}:force_original_aspect_ratio=decrease"),
        "-c:v".to_string(),
        "mjpeg".to_string(),
        "-f".to_string(),
        "image2pipe".to_string(),
        "pipe:1".to_string(),
    ]
}
