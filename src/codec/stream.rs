//! Live transcoder output
//!
//! A [`TranscodeStream`] is the consuming end of a producer task that drains a
//! running transcoder's stdout into a bounded channel. The HTTP body reads
//! from it as the process produces bytes.
//!
//! Once the first chunk has been handed out the response is committed, so a
//! failure after that point is *not* surfaced as a stream error: the stream
//! simply ends. The failure is logged and recorded in the [`StreamOutcome`],
//! which callers can await through an [`OutcomeHandle`]. Dropping the stream
//! (a client disconnect) kills the process.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStderr};
use tokio::sync::{mpsc, oneshot};
use tokio_util::io::ReaderStream;

use super::command::stderr_tail;
use crate::error::CodecError;

/// Chunks buffered between the process and the consumer.
const CHANNEL_DEPTH: usize = 8;

/// How a transcode stream ended
#[derive(Debug)]
pub enum StreamEnd {
    /// The process exited cleanly after its output was fully delivered
    Completed,
    /// The consumer went away; the process was killed
    ClientGone,
    /// The process failed or overran its deadline. Whatever was already
    /// delivered stays delivered; the consumer only sees a short stream.
    Failed(CodecError),
}

/// Best-effort result of a transcode stream
#[derive(Debug)]
pub struct StreamOutcome {
    pub tool: String,
    pub bytes_sent: u64,
    pub end: StreamEnd,
}

impl StreamOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self.end, StreamEnd::Completed)
    }

    /// The error that cut the stream short, if any
    pub fn trailing_error(&self) -> Option<&CodecError> {
        match &self.end {
            StreamEnd::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Resolves once the producer behind a [`TranscodeStream`] has finished
#[derive(Debug)]
pub struct OutcomeHandle(oneshot::Receiver<StreamOutcome>);

impl OutcomeHandle {
    pub async fn wait(self) -> Option<StreamOutcome> {
        self.0.await.ok()
    }
}

/// Byte stream fed by a running transcoder process
#[derive(Debug)]
pub struct TranscodeStream {
    chunks: mpsc::Receiver<Bytes>,
    outcome: Option<oneshot::Receiver<StreamOutcome>>,
}

impl TranscodeStream {
    /// Take ownership of `child` and start draining its stdout.
    pub(crate) fn spawn(tool: String, mut child: Child, deadline: Duration) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_DEPTH);
        let (outcome_tx, outcome_rx) = oneshot::channel();

        tokio::spawn(async move {
            let outcome = pump(tool, &mut child, tx, deadline).await;
            match &outcome.end {
                StreamEnd::Completed => tracing::debug!(
                    "{} stream completed ({} bytes)",
                    outcome.tool,
                    outcome.bytes_sent
                ),
                StreamEnd::ClientGone => tracing::info!(
                    "{} stream abandoned by client after {} bytes, process killed",
                    outcome.tool,
                    outcome.bytes_sent
                ),
                StreamEnd::Failed(e) => tracing::warn!(
                    "{} stream ended early after {} bytes, response truncated: {}",
                    outcome.tool,
                    outcome.bytes_sent,
                    e
                ),
            }
            let _ = outcome_tx.send(outcome);
        });

        Self {
            chunks: rx,
            outcome: Some(outcome_rx),
        }
    }

    /// Detach a handle to the final outcome. Returns `None` after the first call.
    pub fn outcome(&mut self) -> Option<OutcomeHandle> {
        self.outcome.take().map(OutcomeHandle)
    }
}

impl Stream for TranscodeStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.chunks.poll_recv(cx).map(|chunk| chunk.map(Ok))
    }
}

async fn pump(
    tool: String,
    child: &mut Child,
    tx: mpsc::Sender<Bytes>,
    deadline: Duration,
) -> StreamOutcome {
    let stderr = tokio::spawn(collect_stderr(child.stderr.take()));
    let mut bytes_sent = 0u64;
    let timer = tokio::time::sleep(deadline);
    tokio::pin!(timer);

    let timed_out = |tool: &str| {
        StreamEnd::Failed(CodecError::TimedOut {
            tool: tool.to_string(),
            secs: deadline.as_secs(),
        })
    };

    let end = match child.stdout.take() {
        None => StreamEnd::Failed(CodecError::Io {
            tool: tool.clone(),
            source: io::Error::new(io::ErrorKind::BrokenPipe, "stdout not captured"),
        }),
        Some(stdout) => {
            let mut output = ReaderStream::new(stdout);
            loop {
                tokio::select! {
                    _ = &mut timer => break timed_out(&tool),
                    _ = tx.closed() => break StreamEnd::ClientGone,
                    chunk = output.next() => match chunk {
                        Some(Ok(bytes)) => {
                            let len = bytes.len() as u64;
                            // A consumer that stops reading must not outlive the deadline.
                            tokio::select! {
                                _ = &mut timer => break timed_out(&tool),
                                sent = tx.send(bytes) => if sent.is_err() {
                                    break StreamEnd::ClientGone;
                                },
                            }
                            bytes_sent += len;
                        }
                        Some(Err(source)) => {
                            break StreamEnd::Failed(CodecError::Io {
                                tool: tool.clone(),
                                source,
                            })
                        }
                        None => break StreamEnd::Completed,
                    },
                }
            }
        }
    };

    let end = match end {
        StreamEnd::Completed => {
            tokio::select! {
                _ = &mut timer => timed_out(&tool),
                status = child.wait() => match status {
                    Ok(status) if status.success() => StreamEnd::Completed,
                    Ok(status) => StreamEnd::Failed(CodecError::Exited {
                        tool: tool.clone(),
                        status,
                        stderr: stderr.await.unwrap_or_default(),
                    }),
                    Err(source) => StreamEnd::Failed(CodecError::Io {
                        tool: tool.clone(),
                        source,
                    }),
                },
            }
        }
        other => other,
    };

    if !matches!(end, StreamEnd::Completed) {
        if let Err(e) = child.kill().await {
            tracing::debug!("Failed to kill {}: {}", tool, e);
        }
    }

    StreamOutcome {
        tool,
        bytes_sent,
        end,
    }
}

async fn collect_stderr(stderr: Option<ChildStderr>) -> String {
    let mut buf = Vec::new();
    if let Some(mut stderr) = stderr {
        let _ = stderr.read_to_end(&mut buf).await;
    }
    stderr_tail(&buf)
}
