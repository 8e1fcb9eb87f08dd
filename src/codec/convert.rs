//! Raster image conversion through ImageMagick

use tokio::io::AsyncRead;

use super::command::ToolCommand;
use crate::config::CodecConfig;
use crate::error::CodecError;
use crate::media::Format;

/// Synchronous image converter: `convert - <format>:-`
#[derive(Debug, Clone)]
pub struct ImageConverter {
    base: ToolCommand,
}

impl ImageConverter {
    pub fn new(config: &CodecConfig) -> Self {
        let mut base = ToolCommand::new(config.convert_program.clone());
        base.args(config.convert_args.iter().cloned())
            .timeout(config.timeout());
        Self { base }
    }

    pub fn tool_name(&self) -> String {
        self.base.tool_name()
    }

    /// Convert `source` to `target`, returning the whole converted image.
    pub async fn transform<R>(&self, source: R, target: Format) -> Result<Vec<u8>, CodecError>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        if !target.is_picture() {
            return Err(CodecError::Unsupported {
                tool: self.tool_name(),
                target,
            });
        }

        let mut cmd = self.base.clone();
        cmd.args(["-".to_string(), format!("{}:-", target.codec_token())]);

        let started = std::time::Instant::now();
        let out = cmd.run(source).await?;
        tracing::debug!(
            "{} produced {} bytes of {} in {:?}",
            cmd.tool_name(),
            out.len(),
            target,
            started.elapsed()
        );
        Ok(out)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::integration::fixtures::sh_codec_config;
    use std::io::Cursor;

    #[tokio::test]
    async fn transform_passes_target_token() {
        // $1 is the input marker, $2 the output spec.
        let config = sh_codec_config("printf '%s %s' \"$1\" \"$2\"", "cat");
        let converter = ImageConverter::new(&config);
        let out = converter
            .transform(tokio::io::empty(), Format::Jpeg)
            .await
            .unwrap();
        assert_eq!(out, b"- jpeg:-");
    }

    #[tokio::test]
    async fn transform_captures_output() {
        let config = sh_codec_config("cat", "cat");
        let converter = ImageConverter::new(&config);
        let out = converter
            .transform(Cursor::new(b"pixels".to_vec()), Format::Png)
            .await
            .unwrap();
        assert_eq!(out, b"pixels");
    }

    #[tokio::test]
    async fn transform_rejects_video_target() {
        let converter = ImageConverter::new(&sh_codec_config("cat", "cat"));
        let result = converter.transform(tokio::io::empty(), Format::Mp4).await;
        assert!(matches!(result, Err(CodecError::Unsupported { .. })));
    }

    #[tokio::test]
    async fn transform_nonzero_exit_is_codec_error() {
        let config = sh_codec_config("echo 'convert: no decode delegate' >&2; exit 1", "cat");
        let err = ImageConverter::new(&config)
            .transform(tokio::io::empty(), Format::Jpeg)
            .await
            .unwrap_err();
        match err {
            CodecError::Exited { stderr, .. } => {
                assert_eq!(stderr, "convert: no decode delegate")
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
