//! Builder for external codec invocations.
//!
//! Every invocation reads its source from stdin and writes its result to
//! stdout. The child is spawned with `kill_on_drop`, so abandoning the future
//! or the handle that owns it also terminates the process.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::task::JoinHandle;

use crate::error::CodecError;

/// Default deadline for a blocking invocation: 2 minutes.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Longest stderr tail kept for diagnostics.
const MAX_STDERR: usize = 4096;

/// A program plus its arguments.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Set the maximum execution time for [`ToolCommand::run`].
    pub fn timeout(&mut self, d: Duration) -> &mut Self {
        self.timeout = d;
        self
    }

    /// Short program name used in logs and errors.
    pub fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Spawn the process with all three standard streams piped.
    pub fn spawn(&self) -> Result<Child, CodecError> {
        tracing::debug!("Spawning {:?} {:?}", self.program, self.args);
        Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CodecError::Spawn {
                tool: self.tool_name(),
                source,
            })
    }

    /// Run to completion, feeding `input` to stdin and capturing all of stdout.
    ///
    /// # Errors
    ///
    /// - [`CodecError::Spawn`] if the program cannot be started.
    /// - [`CodecError::Exited`] on a non-zero exit, carrying stderr.
    /// - [`CodecError::TimedOut`] if the deadline passes; the process is killed.
    pub async fn run<R>(&self, input: R) -> Result<Vec<u8>, CodecError>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let tool = self.tool_name();
        let mut child = self.spawn()?;
        let feeder = feed_stdin(tool.clone(), child.stdin.take(), input);

        let result = tokio::time::timeout(self.timeout, child.wait_with_output()).await;
        feeder.abort();

        match result {
            Ok(Ok(output)) if output.status.success() => Ok(output.stdout),
            Ok(Ok(output)) => Err(CodecError::Exited {
                tool,
                status: output.status,
                stderr: stderr_tail(&output.stderr),
            }),
            Ok(Err(source)) => Err(CodecError::Io { tool, source }),
            // The child was dropped with the future and killed by kill_on_drop.
            Err(_elapsed) => Err(CodecError::TimedOut {
                tool,
                secs: self.timeout.as_secs(),
            }),
        }
    }
}

/// Copy `input` into the child's stdin on a separate task, closing the pipe at
/// EOF. A converter that stops reading early (e.g. after the first video
/// frame) breaks the pipe; that is expected and only logged.
pub fn feed_stdin<R>(tool: String, stdin: Option<ChildStdin>, mut input: R) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let Some(mut stdin) = stdin else {
            return;
        };
        match tokio::io::copy(&mut input, &mut stdin).await {
            Ok(n) => {
                tracing::trace!("Fed {} bytes to {}", n, tool);
                let _ = stdin.shutdown().await;
            }
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                tracing::debug!("{} closed its input early", tool);
            }
            Err(e) => tracing::warn!("Failed to feed {}: {}", tool, e),
        }
    })
}

/// Lossy, trimmed tail of a process's stderr.
pub fn stderr_tail(stderr: &[u8]) -> String {
    let start = stderr.len().saturating_sub(MAX_STDERR);
    String::from_utf8_lossy(&stderr[start..]).trim().to_string()
}
