//! Session event stream handle.
//!
//! [`EventStream`] owns one SSE connection and yields [`StreamEvent`]s in
//! wire order. It ends on a terminal event, when the server closes the
//! connection, when its deadline passes, or when its cancellation token fires.

use std::fmt;
use std::time::Duration;

use eventsource_stream::{EventStreamError, Eventsource};
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::time::Instant;
use tokio_stream::Stream;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::events::{decode_frame, StreamEvent};

type Frame = std::result::Result<eventsource_stream::Event, EventStreamError<String>>;

type FrameStream = BoxStream<'static, Frame>;

/// An open event stream.
///
/// Single-pass and forward-only. Dropping the handle closes the connection.
pub struct EventStream {
    frames: Option<FrameStream>,
    deadline: Instant,
    timeout: Duration,
    cancel: CancellationToken,
    cancelled: bool,
    last_event_id: Option<String>,
}

impl EventStream {
    /// Wrap a raw SSE byte stream.
    ///
    /// The deadline starts now. This is what [`crate::api::StreamingApi::open`]
    /// uses once the server has answered; it is public so other transports
    /// can be plugged in.
    pub fn from_byte_stream<S, B, E>(bytes: S, timeout: Duration) -> Self
    where
        S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
        B: AsRef<[u8]> + 'static,
        E: fmt::Display + Send + 'static,
    {
        Self::with_deadline(bytes, Instant::now() + timeout, timeout)
    }

    pub(crate) fn with_deadline<S, B, E>(bytes: S, deadline: Instant, timeout: Duration) -> Self
    where
        S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
        B: AsRef<[u8]> + 'static,
        E: fmt::Display + Send + 'static,
    {
        let frames = bytes
            .scan(Vec::new(), |tail, chunk| {
                futures::future::ready(Some(chunk.map(|b| decode_utf8(tail, b.as_ref()))))
            })
            .eventsource()
            .map(|frame| {
                frame.map_err(|e| match e {
                    EventStreamError::Utf8(e) => EventStreamError::Utf8(e),
                    EventStreamError::Parser(e) => EventStreamError::Parser(e),
                    EventStreamError::Transport(e) => EventStreamError::Transport(e.to_string()),
                })
            })
            .boxed();

        Self {
            frames: Some(frames),
            deadline,
            timeout,
            cancel: CancellationToken::new(),
            cancelled: false,
            last_event_id: None,
        }
    }

    /// Stop the stream when `token` is cancelled.
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Seed the resumption ID (normally the one sent on open).
    pub fn with_last_event_id(mut self, id: Option<String>) -> Self {
        self.last_event_id = id.filter(|id| !id.is_empty());
        self
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the stream has ended or been closed. Malformed
    /// frames are logged and skipped. A passed deadline yields
    /// [`Error::DeadlineExceeded`] once, after which the stream is closed.
    pub async fn next(&mut self) -> Option<Result<StreamEvent>> {
        loop {
            let frames = self.frames.as_mut()?;

            let wake = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Wake::Cancelled,
                _ = tokio::time::sleep_until(self.deadline) => Wake::Deadline,
                frame = frames.next() => Wake::Frame(frame),
            };

            let frame = match wake {
                Wake::Cancelled => {
                    tracing::debug!("Event stream cancelled");
                    self.cancelled = true;
                    self.close();
                    return None;
                }
                Wake::Deadline => {
                    tracing::warn!(timeout = ?self.timeout, "Event stream deadline exceeded");
                    self.close();
                    return Some(Err(Error::DeadlineExceeded(self.timeout)));
                }
                Wake::Frame(None) => {
                    tracing::debug!("Event stream ended by server");
                    self.close();
                    return None;
                }
                Wake::Frame(Some(Err(EventStreamError::Utf8(e)))) => {
                    tracing::warn!(error = %e, "Skipping undecodable frame");
                    continue;
                }
                // The parser keeps its buffer on error, so it cannot move past one.
                Wake::Frame(Some(Err(e))) => {
                    self.close();
                    return Some(Err(Error::Stream(e.to_string())));
                }
                Wake::Frame(Some(Ok(frame))) => frame,
            };

            if !frame.id.is_empty() {
                self.last_event_id = Some(frame.id.clone());
            }
            if frame.data.trim().is_empty() {
                continue;
            }

            match decode_frame(&frame.event, &frame.data) {
                Ok(event) => {
                    if event.is_terminal() {
                        self.close();
                    }
                    return Some(Ok(event));
                }
                Err(e) => {
                    tracing::warn!(data = %frame.data, error = %e, "Skipping malformed frame");
                }
            }
        }
    }

    /// Close the connection. Safe to call more than once.
    pub fn close(&mut self) {
        if self.frames.take().is_some() {
            tracing::debug!(last_event_id = ?self.last_event_id, "Event stream closed");
        }
    }

    /// Whether the stream has ended or been closed.
    pub fn is_closed(&self) -> bool {
        self.frames.is_none()
    }

    /// Whether the stream ended because its cancellation token fired.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// ID of the last frame that carried one.
    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    /// Deadline this stream was opened with.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Adapt into a [`Stream`] for use with combinators.
    pub fn into_stream(self) -> impl Stream<Item = Result<StreamEvent>> + Send {
        futures::stream::unfold(self, |mut stream| async move {
            let event = stream.next().await?;
            Some((event, stream))
        })
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("closed", &self.is_closed())
            .field("timeout", &self.timeout)
            .field("last_event_id", &self.last_event_id)
            .finish()
    }
}

/// Decode the next chunk, carrying an incomplete trailing sequence in `tail`.
///
/// An invalid sequence cuts the current frame short with a blank line, so the
/// truncated frame fails to decode and is skipped instead of stalling the
/// parser on bytes that can never become text.
fn decode_utf8(tail: &mut Vec<u8>, chunk: &[u8]) -> String {
    tail.extend_from_slice(chunk);
    let bytes = std::mem::take(tail);
    let mut rest = bytes.as_slice();
    let mut out = String::with_capacity(rest.len());

    loop {
        match std::str::from_utf8(rest) {
            Ok(text) => {
                out.push_str(text);
                return out;
            }
            Err(e) => {
                let (valid, after) = rest.split_at(e.valid_up_to());
                out.push_str(&String::from_utf8_lossy(valid));
                match e.error_len() {
                    None => {
                        tail.extend_from_slice(after);
                        return out;
                    }
                    Some(len) => {
                        tracing::warn!(bytes = len, "Invalid UTF-8 in event stream, dropping frame");
                        out.push_str("\n\n");
                        rest = &after[len..];
                    }
                }
            }
        }
    }
}

enum Wake {
    Cancelled,
    Deadline,
    Frame(Option<Frame>),
}
