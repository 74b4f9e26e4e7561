//! Routing decoded events to handler callbacks.
//!
//! Implement [`EventHandler`] for the events you care about and hand it to
//! [`consume`]. Every callback defaults to doing nothing.

use serde_json::Value;

use crate::error::Result;
use crate::events::{
    ConnectedData, ContentData, ErrorData, PermissionData, SessionEventData, StreamEvent,
    ThinkingData, ToolData, ToolExecutionData, UserMessageData,
};
use crate::stream::EventStream;

/// Callbacks for stream events, one per tag.
#[allow(unused_variables)]
pub trait EventHandler {
    /// The server acknowledged the stream.
    fn on_connected(&mut self, data: &ConnectedData) {}

    /// The model started reasoning.
    fn on_thinking(&mut self, data: &ThinkingData) {}

    /// A chunk of assistant text.
    fn on_content(&mut self, data: &ContentData) {}

    /// The model asked for a tool.
    fn on_tool(&mut self, data: &ToolData) {}

    /// A tool began executing.
    fn on_tool_execution_start(&mut self, data: &ToolExecutionData) {}

    /// A tool finished executing.
    fn on_tool_execution_complete(&mut self, data: &ToolExecutionData) {}

    /// The server is waiting for a permission decision.
    fn on_permission(&mut self, data: &PermissionData) {}

    /// The triggering message was stored.
    fn on_user_message_created(&mut self, data: &UserMessageData) {}

    /// A session was created.
    fn on_session_created(&mut self, data: &SessionEventData) {}

    /// A session was deleted.
    fn on_session_deleted(&mut self, data: &SessionEventData) {}

    /// Processing finished.
    fn on_complete(&mut self) {}

    /// Processing failed.
    fn on_error(&mut self, data: &ErrorData) {}

    /// Keep-alive.
    fn on_heartbeat(&mut self) {}

    /// An event this client does not recognize.
    fn on_unknown(&mut self, event_type: &str, raw: &Value) {}
}

/// Whether the consume loop should keep reading after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next event.
    Continue,
    /// The event was terminal.
    Stop,
}

/// How a consume loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// A `complete` event arrived.
    Completed,
    /// An `error` event arrived.
    ServerError(String),
    /// The server closed the connection without a terminal event.
    Disconnected,
    /// The stream's cancellation token fired.
    Cancelled,
}

impl ConsumeOutcome {
    /// Whether processing finished normally.
    pub fn is_completed(&self) -> bool {
        matches!(self, ConsumeOutcome::Completed)
    }
}

/// Call the one handler method matching `event`.
pub fn dispatch<H: EventHandler + ?Sized>(handler: &mut H, event: &StreamEvent) -> Flow {
    match event {
        StreamEvent::Connected(data) => handler.on_connected(data),
        StreamEvent::Thinking(data) => handler.on_thinking(data),
        StreamEvent::Content(data) => handler.on_content(data),
        StreamEvent::Tool(data) => handler.on_tool(data),
        StreamEvent::ToolExecutionStart(data) => handler.on_tool_execution_start(data),
        StreamEvent::ToolExecutionComplete(data) => handler.on_tool_execution_complete(data),
        StreamEvent::Permission(data) => handler.on_permission(data),
        StreamEvent::UserMessageCreated(data) => handler.on_user_message_created(data),
        StreamEvent::SessionCreated(data) => handler.on_session_created(data),
        StreamEvent::SessionDeleted(data) => handler.on_session_deleted(data),
        StreamEvent::Heartbeat => handler.on_heartbeat(),
        StreamEvent::Unknown { event_type, raw } => handler.on_unknown(event_type, raw),
        StreamEvent::Complete => {
            handler.on_complete();
            return Flow::Stop;
        }
        StreamEvent::Error(data) => {
            handler.on_error(data);
            return Flow::Stop;
        }
    }
    Flow::Continue
}

/// Drive `stream` to its end, dispatching every event to `handler`.
///
/// Stops at the first terminal event. Deadline and transport failures are
/// returned as errors. The stream is closed on every exit path.
pub async fn consume<H: EventHandler + ?Sized>(
    stream: &mut EventStream,
    handler: &mut H,
) -> Result<ConsumeOutcome> {
    let outcome = loop {
        let event = match stream.next().await {
            Some(Ok(event)) => event,
            Some(Err(e)) => {
                stream.close();
                return Err(e);
            }
            None if stream.is_cancelled() => break ConsumeOutcome::Cancelled,
            None => break ConsumeOutcome::Disconnected,
        };

        tracing::trace!(event_type = event.event_type(), "Dispatching event");

        if dispatch(handler, &event) == Flow::Stop {
            break match event {
                StreamEvent::Error(data) => ConsumeOutcome::ServerError(data.error),
                _ => ConsumeOutcome::Completed,
            };
        }
    };

    stream.close();
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use bytes::Bytes;

    /// Records the name of every callback in order.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl EventHandler for Recorder {
        fn on_connected(&mut self, _data: &ConnectedData) {
            self.calls.push("connected".into());
        }
        fn on_content(&mut self, data: &ContentData) {
            self.calls.push(format!("content:{}", data.content));
        }
        fn on_complete(&mut self) {
            self.calls.push("complete".into());
        }
        fn on_error(&mut self, data: &ErrorData) {
            self.calls.push(format!("error:{}", data.error));
        }
        fn on_heartbeat(&mut self) {
            self.calls.push("heartbeat".into());
        }
        fn on_unknown(&mut self, event_type: &str, _raw: &Value) {
            self.calls.push(format!("unknown:{}", event_type));
        }
    }

    fn sse(frames: &[&str]) -> EventStream {
        let chunks: Vec<std::result::Result<Bytes, std::io::Error>> = frames
            .iter()
            .map(|f| Ok(Bytes::from(format!("data: {}\n\n", f))))
            .collect();
        EventStream::from_byte_stream(futures::stream::iter(chunks), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_connected_content_complete() {
        let mut stream = sse(&[
            r#"{"type":"connected"}"#,
            r#"{"type":"content","data":{"content":"hi"}}"#,
            r#"{"type":"complete"}"#,
        ]);
        let mut recorder = Recorder::default();

        let outcome = consume(&mut stream, &mut recorder).await.unwrap();

        assert_eq!(outcome, ConsumeOutcome::Completed);
        assert_eq!(recorder.calls, vec!["connected", "content:hi", "complete"]);
        assert!(stream.is_closed());
    }

    #[tokio::test]
    async fn test_heartbeats_never_reach_content() {
        let mut frames = vec![r#"{"type":"heartbeat"}"#; 5];
        frames.push(r#"{"type":"complete"}"#);
        let mut stream = sse(&frames);
        let mut recorder = Recorder::default();

        let outcome = consume(&mut stream, &mut recorder).await.unwrap();

        assert_eq!(outcome, ConsumeOutcome::Completed);
        assert!(!recorder.calls.iter().any(|c| c.starts_with("content")));
        assert_eq!(recorder.calls.len(), 6);
    }

    #[tokio::test]
    async fn test_unknown_tag_does_not_stop_the_loop() {
        let mut stream = sse(&[
            r#"{"type":"bogus_tag"}"#,
            r#"{"type":"content","data":{"content":"after"}}"#,
            r#"{"type":"complete"}"#,
        ]);
        let mut recorder = Recorder::default();

        consume(&mut stream, &mut recorder).await.unwrap();

        assert_eq!(
            recorder.calls,
            vec!["unknown:bogus_tag", "content:after", "complete"]
        );
    }

    #[tokio::test]
    async fn test_error_event_is_terminal() {
        let mut stream = sse(&[
            r#"{"type":"error","data":{"error":"boom"}}"#,
            r#"{"type":"content","data":{"content":"never"}}"#,
        ]);
        let mut recorder = Recorder::default();

        let outcome = consume(&mut stream, &mut recorder).await.unwrap();

        assert_eq!(outcome, ConsumeOutcome::ServerError("boom".into()));
        assert_eq!(recorder.calls, vec!["error:boom"]);
    }

    #[tokio::test]
    async fn test_server_close_is_disconnected() {
        let mut stream = sse(&[r#"{"type":"heartbeat"}"#]);
        let mut recorder = Recorder::default();

        let outcome = consume(&mut stream, &mut recorder).await.unwrap();
        assert_eq!(outcome, ConsumeOutcome::Disconnected);
    }

    #[tokio::test]
    async fn test_deadline_surfaces_as_error() {
        let mut stream = EventStream::from_byte_stream(
            futures::stream::pending::<std::result::Result<Bytes, std::io::Error>>(),
            Duration::from_millis(30),
        );
        let mut recorder = Recorder::default();

        let err = consume(&mut stream, &mut recorder).await.unwrap_err();
        assert!(err.is_timeout());
        assert!(stream.is_closed());
    }

    #[test]
    fn test_dispatch_flow() {
        let mut recorder = Recorder::default();
        assert_eq!(dispatch(&mut recorder, &StreamEvent::Heartbeat), Flow::Continue);
        assert_eq!(dispatch(&mut recorder, &StreamEvent::Complete), Flow::Stop);
    }
}
