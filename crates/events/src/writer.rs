//! Progress stream writer.
//!
//! [`EventSink::append`] serializes one event to one JSON line, writes
//! it, and flushes before returning, so no event is ever buffered behind
//! a later one. The underlying handle is held only for the duration of a
//! single write.

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, Mutex};

use crate::protocol::ProgressEvent;

/// Errors from writing to the progress stream.
///
/// These concern telemetry delivery, not job correctness; callers log
/// them rather than aborting the job.
#[derive(Debug, thiserror::Error)]
pub enum StreamWriteError {
    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write event: {0}")]
    Io(#[from] std::io::Error),

    #[error("stream channel closed by the consumer")]
    Closed,
}

/// Serialize an event to exactly one newline-terminated JSON line.
pub fn encode_line(event: &ProgressEvent) -> Result<String, StreamWriteError> {
    let mut line = serde_json::to_string(event)?;
    line.push('\n');
    Ok(line)
}

/// Append-only sink for progress events.
///
/// Implementations must write events in `append` call order and must not
/// merge, deduplicate, or reorder them.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn append(&self, event: &ProgressEvent) -> Result<(), StreamWriteError>;
}

// ---------------------------------------------------------------------------
// WriterSink
// ---------------------------------------------------------------------------

/// Sink over any [`AsyncWrite`] handle (file, socket, duplex pipe).
///
/// The writer is behind a `Mutex` acquired per append and released as
/// soon as the flush returns, so concurrent writers interleave whole
/// lines and never a partial one.
pub struct WriterSink<W> {
    inner: Mutex<W>,
}

impl<W: AsyncWrite + Unpin + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: Mutex::new(writer),
        }
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> EventSink for WriterSink<W> {
    async fn append(&self, event: &ProgressEvent) -> Result<(), StreamWriteError> {
        let line = encode_line(event)?;
        let mut writer = self.inner.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ChannelSink
// ---------------------------------------------------------------------------

/// Sink over an mpsc channel, used to feed an HTTP response body.
///
/// Each event becomes one `Bytes` message holding one complete line, so
/// the transport can forward it immediately without additional framing.
#[derive(Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<Bytes>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<Bytes>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl EventSink for ChannelSink {
    async fn append(&self, event: &ProgressEvent) -> Result<(), StreamWriteError> {
        let line = encode_line(event)?;
        self.tx
            .send(Bytes::from(line))
            .await
            .map_err(|_| StreamWriteError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn writer_sink_emits_one_line_per_event() {
        let (tx, mut rx) = tokio::io::duplex(4096);
        let sink = WriterSink::new(tx);

        sink.append(&ProgressEvent::progress("upload", "stored", 10))
            .await
            .unwrap();
        sink.append(&ProgressEvent::frame_processed(1, 2))
            .await
            .unwrap();
        drop(sink);

        let mut out = String::new();
        rx.read_to_string(&mut out).await.unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"type\":\"progress\""));
        assert!(lines[1].contains("\"type\":\"frameProcessed\""));
        assert!(out.ends_with('\n'));
    }

    #[tokio::test]
    async fn writer_sink_preserves_append_order() {
        let (tx, mut rx) = tokio::io::duplex(16384);
        let sink = WriterSink::new(tx);

        for i in 1..=20usize {
            sink.append(&ProgressEvent::frame_processed(i, 20))
                .await
                .unwrap();
        }
        drop(sink);

        let mut out = String::new();
        rx.read_to_string(&mut out).await.unwrap();

        let currents: Vec<usize> = out
            .lines()
            .map(|l| {
                let v: serde_json::Value = serde_json::from_str(l).unwrap();
                v["current"].as_u64().unwrap() as usize
            })
            .collect();
        assert_eq!(currents, (1..=20).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn channel_sink_sends_complete_lines() {
        let (tx, mut rx) = mpsc::channel(8);
        let sink = ChannelSink::new(tx);

        sink.append(&ProgressEvent::error("boom")).await.unwrap();

        let chunk = rx.recv().await.unwrap();
        let text = std::str::from_utf8(&chunk).unwrap();
        assert!(text.ends_with('\n'));
        let v: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(v["type"], "error");
        assert_eq!(v["message"], "boom");
    }

    #[tokio::test]
    async fn channel_sink_reports_closed_consumer() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sink = ChannelSink::new(tx);

        let err = sink
            .append(&ProgressEvent::progress("upload", "", 10))
            .await
            .unwrap_err();
        assert!(matches!(err, StreamWriteError::Closed));
    }
}
