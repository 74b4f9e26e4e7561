//! Typed events carried on a session's event stream.
//!
//! Every frame is a JSON object with a `type` tag and, for most tags, a
//! `data` payload:
//!
//! ```text
//! data: {"type":"content","data":{"content":"hi"}}
//! ```
//!
//! [`decode_frame`] is the only place the tag is inspected. Tags this client
//! does not know become [`StreamEvent::Unknown`] so newer servers keep working.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// One decoded event from the stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// The model started reasoning.
    Thinking(ThinkingData),
    /// A chunk of assistant text.
    Content(ContentData),
    /// The model asked for a tool.
    Tool(ToolData),
    /// A tool began executing.
    ToolExecutionStart(ToolExecutionData),
    /// A tool finished executing.
    ToolExecutionComplete(ToolExecutionData),
    /// The server needs the user to approve an action.
    Permission(PermissionData),
    /// The triggering user message was stored.
    UserMessageCreated(UserMessageData),
    /// A session was created.
    SessionCreated(SessionEventData),
    /// A session was deleted.
    SessionDeleted(SessionEventData),
    /// Processing finished. Terminal.
    Complete,
    /// Processing failed. Terminal.
    Error(ErrorData),
    /// Keep-alive with nothing to show.
    Heartbeat,
    /// The server acknowledged the stream.
    Connected(ConnectedData),
    /// A tag this client does not recognize.
    Unknown {
        /// The raw `type` value.
        event_type: String,
        /// The whole frame.
        raw: Value,
    },
}

impl StreamEvent {
    /// The wire tag for this event.
    pub fn event_type(&self) -> &str {
        match self {
            StreamEvent::Thinking(_) => "thinking",
            StreamEvent::Content(_) => "content",
            StreamEvent::Tool(_) => "tool",
            StreamEvent::ToolExecutionStart(_) => "tool_execution_start",
            StreamEvent::ToolExecutionComplete(_) => "tool_execution_complete",
            StreamEvent::Permission(_) => "permission",
            StreamEvent::UserMessageCreated(_) => "user_message_created",
            StreamEvent::SessionCreated(_) => "session_created",
            StreamEvent::SessionDeleted(_) => "session_deleted",
            StreamEvent::Complete => "complete",
            StreamEvent::Error(_) => "error",
            StreamEvent::Heartbeat => "heartbeat",
            StreamEvent::Connected(_) => "connected",
            StreamEvent::Unknown { event_type, .. } => event_type,
        }
    }

    /// Whether no further events should be read after this one.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Complete | StreamEvent::Error(_))
    }
}

/// Payload of a `thinking` event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThinkingData {
    /// Reasoning text, when the provider streams it.
    #[serde(default)]
    pub content: Option<String>,
}

/// Payload of a `content` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentData {
    /// Text chunk.
    pub content: String,
}

/// Payload of a `tool` event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolData {
    /// Tool call ID.
    #[serde(default)]
    pub id: Option<String>,
    /// Tool name.
    #[serde(default)]
    pub name: Option<String>,
    /// Tool input.
    #[serde(default)]
    pub input: Option<Value>,
    /// Call status.
    #[serde(default)]
    pub status: Option<String>,
}

/// Payload of `tool_execution_start` and `tool_execution_complete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolExecutionData {
    /// Tool call ID.
    #[serde(alias = "tool_id", alias = "tool_call_id")]
    pub id: String,
    /// Tool name.
    #[serde(default, alias = "tool_name")]
    pub name: Option<String>,
    /// Execution status (`running`, `completed`, `error`).
    #[serde(default)]
    pub status: Option<String>,
}

/// Payload of a `permission` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionData {
    /// Permission ID to grant or deny.
    pub id: String,
    /// What is being asked for.
    #[serde(default)]
    pub description: Option<String>,
    /// Action name (e.g. `execute`, `write`).
    #[serde(default)]
    pub action: Option<String>,
    /// Tool that wants the permission.
    #[serde(default)]
    pub tool_name: Option<String>,
    /// Path the action touches.
    #[serde(default)]
    pub path: Option<String>,
}

impl PermissionData {
    /// Best human-readable summary of the request.
    pub fn summary(&self) -> &str {
        self.description
            .as_deref()
            .or(self.action.as_deref())
            .unwrap_or("permission requested")
    }
}

/// Payload of `user_message_created`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMessageData {
    /// Stored message ID.
    #[serde(default, alias = "message_id")]
    pub id: Option<String>,
    /// Message text.
    #[serde(default)]
    pub content: Option<String>,
    /// Owning session.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Payload of `session_created` and `session_deleted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEventData {
    /// Session ID.
    #[serde(alias = "id")]
    pub session_id: String,
    /// Session title.
    #[serde(default)]
    pub title: Option<String>,
}

/// Payload of an `error` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorData {
    /// Error message.
    #[serde(alias = "message")]
    pub error: String,
}

/// Payload of `connected`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectedData {
    /// Session the stream is bound to.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Decode one SSE frame.
///
/// `sse_event` is the frame's `event:` field, used only when the JSON has no
/// `type`. Unknown tags decode to [`StreamEvent::Unknown`]; a known tag whose
/// payload is missing or has the wrong shape is [`Error::MalformedFrame`].
pub fn decode_frame(sse_event: &str, data: &str) -> Result<StreamEvent> {
    let frame: Value = serde_json::from_str(data)
        .map_err(|e| Error::MalformedFrame(format!("invalid JSON: {}", e)))?;

    let Value::Object(mut fields) = frame else {
        return Err(Error::MalformedFrame("frame is not a JSON object".into()));
    };

    let tag = match fields.get("type") {
        Some(Value::String(tag)) => tag.clone(),
        Some(_) => return Err(Error::MalformedFrame("'type' is not a string".into())),
        None if !sse_event.is_empty() && sse_event != "message" => sse_event.to_string(),
        None => return Err(Error::MalformedFrame("frame has no 'type'".into())),
    };
    let payload = fields.remove("data");

    let event = match tag.as_str() {
        "thinking" => StreamEvent::Thinking(optional(&tag, payload)?),
        "content" => StreamEvent::Content(required(&tag, payload)?),
        "tool" => StreamEvent::Tool(required(&tag, payload)?),
        "tool_execution_start" => StreamEvent::ToolExecutionStart(required(&tag, payload)?),
        "tool_execution_complete" => StreamEvent::ToolExecutionComplete(required(&tag, payload)?),
        "permission" => StreamEvent::Permission(required(&tag, payload)?),
        "user_message_created" => StreamEvent::UserMessageCreated(required(&tag, payload)?),
        "session_created" => StreamEvent::SessionCreated(required(&tag, payload)?),
        "session_deleted" => StreamEvent::SessionDeleted(required(&tag, payload)?),
        "complete" => StreamEvent::Complete,
        "error" => StreamEvent::Error(required(&tag, payload)?),
        "heartbeat" => StreamEvent::Heartbeat,
        "connected" => StreamEvent::Connected(optional(&tag, payload)?),
        _ => {
            if let Some(payload) = payload {
                fields.insert("data".to_string(), payload);
            }
            StreamEvent::Unknown {
                event_type: tag,
                raw: Value::Object(fields),
            }
        }
    };

    Ok(event)
}

/// Payload that must be a populated object matching `T`.
fn required<T: DeserializeOwned>(tag: &str, payload: Option<Value>) -> Result<T> {
    match payload {
        Some(value @ Value::Object(_)) => serde_json::from_value(value)
            .map_err(|e| Error::MalformedFrame(format!("'{}' payload: {}", tag, e))),
        Some(_) => Err(Error::MalformedFrame(format!(
            "'{}' payload is not an object",
            tag
        ))),
        None => Err(Error::MalformedFrame(format!("'{}' frame has no payload", tag))),
    }
}

/// Payload that may be absent; absent means `T::default()`.
fn optional<T: DeserializeOwned + Default>(tag: &str, payload: Option<Value>) -> Result<T> {
    match payload {
        None | Some(Value::Null) => Ok(T::default()),
        Some(_) => required(tag, payload),
    }
}
