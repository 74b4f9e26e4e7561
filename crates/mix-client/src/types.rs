//! Request and response types for the Mix API.
//!
//! These types mirror the server's API contract. Fields the server may omit
//! are `Option`, never sentinel values.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Sessions
// ─────────────────────────────────────────────────────────────────────────────

/// Kind of session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    /// A top-level, user-facing session.
    Main,
    /// A session spawned for a delegated sub-agent.
    Subagent,
    /// A type this client does not know about.
    #[serde(other)]
    Other,
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionType::Main => write!(f, "main"),
            SessionType::Subagent => write!(f, "subagent"),
            SessionType::Other => write!(f, "other"),
        }
    }
}

/// Request to create a new session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    /// Session title.
    pub title: String,
    /// Session type (server default is `main`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_type: Option<SessionType>,
    /// Working directory the session's tools operate in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
}

impl CreateSessionRequest {
    /// Create a request with just a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the session type.
    pub fn with_type(mut self, session_type: SessionType) -> Self {
        self.session_type = Some(session_type);
        self
    }
}

/// A session as returned by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session ID.
    pub id: String,
    /// Session title.
    #[serde(default)]
    pub title: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Session type.
    #[serde(default)]
    pub session_type: Option<SessionType>,
    /// Working directory.
    #[serde(default)]
    pub working_directory: Option<String>,
    /// Number of user messages.
    #[serde(default)]
    pub user_message_count: Option<u64>,
    /// Number of assistant messages.
    #[serde(default)]
    pub assistant_message_count: Option<u64>,
}

/// Request to fork a session at a message index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForkSessionRequest {
    /// Messages up to and including this index are copied.
    pub message_index: i64,
    /// Title for the forked session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Request to rewind a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewindSessionRequest {
    /// Messages after this one are deleted.
    pub message_id: String,
}

/// What a session callback runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackType {
    /// Run a bash script.
    BashScript,
    /// Hand off to a sub-agent.
    SubAgent,
    /// A type this client does not know about.
    #[serde(other)]
    Other,
}

/// A hook the server runs when a session event fires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Callback {
    /// Callback kind.
    #[serde(rename = "type")]
    pub kind: CallbackType,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Event that triggers the callback (e.g. `tool_execution_complete`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// Restrict to a single tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    /// Script body for `bash_script` callbacks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bash_script: Option<String>,
    /// Prompt for `sub_agent` callbacks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_agent_prompt: Option<String>,
}

impl Callback {
    /// Create a callback of the given kind with no other settings.
    pub fn new(kind: CallbackType) -> Self {
        Self {
            kind,
            name: None,
            event_type: None,
            tool_name: None,
            bash_script: None,
            sub_agent_prompt: None,
        }
    }
}

/// Request to replace a session's callbacks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCallbacksRequest {
    /// The full callback list.
    pub callbacks: Vec<Callback>,
}

/// A full session export, including messages and usage totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionExport {
    /// Session ID.
    pub id: String,
    /// Session title.
    #[serde(default)]
    pub title: String,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Session type.
    #[serde(default)]
    pub session_type: Option<SessionType>,
    /// Every message in the session.
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Prompt tokens consumed.
    #[serde(default)]
    pub prompt_tokens: Option<u64>,
    /// Completion tokens produced.
    #[serde(default)]
    pub completion_tokens: Option<u64>,
    /// Total tokens.
    #[serde(default)]
    pub total_tokens: Option<u64>,
    /// Total cost in USD.
    #[serde(default)]
    pub cost: Option<f64>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────────────────────────────────────

/// Request to send a user message into a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    /// Message text.
    pub text: String,
}

impl SendMessageRequest {
    /// Create a request from text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A stored message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message ID.
    pub id: String,
    /// Owning session.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Role (`user`, `assistant`, `tool`).
    pub role: String,
    /// The user's input for this turn.
    #[serde(default)]
    pub user_input: String,
    /// The assistant's reply, once produced.
    #[serde(default)]
    pub assistant_response: Option<String>,
    /// Model reasoning, if the provider exposes it.
    #[serde(default)]
    pub reasoning: Option<String>,
    /// Reasoning time in milliseconds.
    #[serde(default)]
    pub reasoning_duration: Option<i64>,
    /// Tool calls made while producing this message.
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

impl Message {
    /// The text worth showing: the reply for assistant messages, else the input.
    pub fn display_content(&self) -> &str {
        match (&*self.role, &self.assistant_response) {
            ("assistant", Some(response)) => response,
            _ => &self.user_input,
        }
    }

    /// Whether any tool was called.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// A tool call recorded on a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool call ID.
    #[serde(default)]
    pub id: Option<String>,
    /// Tool name.
    pub name: String,
    /// Tool input.
    #[serde(default)]
    pub input: Option<serde_json::Value>,
    /// Tool output.
    #[serde(default)]
    pub result: Option<String>,
    /// Whether the call failed.
    #[serde(default)]
    pub is_error: Option<bool>,
}

/// Query parameters for message history.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HistoryQuery {
    /// Maximum number of messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Number of messages to skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Files
// ─────────────────────────────────────────────────────────────────────────────

/// A file stored in a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    /// File name (also its path within the session).
    pub name: String,
    /// Download URL.
    #[serde(default)]
    pub url: String,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Modification time (Unix seconds).
    #[serde(default)]
    pub modified: i64,
    /// Whether this entry is a directory.
    #[serde(default)]
    pub is_dir: bool,
}

/// Options for downloading a session file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DownloadOptions {
    /// Thumbnail spec: `100` (box), `w100`, `h100` or `100x200`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
    /// Ask the server for a content-disposition attachment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download: Option<bool>,
}

impl DownloadOptions {
    /// Request a thumbnail fitting a square box.
    pub fn thumbnail(size: u32) -> Self {
        Self {
            thumb: Some(size.to_string()),
            download: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authentication
// ─────────────────────────────────────────────────────────────────────────────

/// Providers whose credentials the server understands.
pub const KNOWN_PROVIDERS: &[&str] = &["anthropic", "openai", "gemini", "brave", "openrouter"];

/// Authentication status across providers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Status keyed by provider name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderAuth>,
}

/// Authentication status of one provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderAuth {
    /// Whether credentials are present and usable.
    #[serde(default)]
    pub authenticated: Option<bool>,
    /// `api_key` or `oauth`.
    #[serde(default)]
    pub auth_method: Option<String>,
}

impl ProviderAuth {
    /// Whether the provider is authenticated; unknown counts as no.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated.unwrap_or(false)
    }
}

/// Request to store an API key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreApiKeyRequest {
    /// Provider name.
    pub provider: String,
    /// The key.
    pub api_key: String,
}

/// Result of validating the preferred provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderValidation {
    /// Whether the preferred provider has working credentials.
    #[serde(default)]
    pub valid: Option<bool>,
    /// The preferred provider.
    #[serde(default)]
    pub provider: Option<String>,
    /// How it authenticates.
    #[serde(default)]
    pub auth_method: Option<String>,
    /// Human-readable detail.
    #[serde(default)]
    pub message: Option<String>,
}

/// Response when an OAuth flow starts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OAuthStart {
    /// URL the user must visit.
    #[serde(default)]
    pub auth_url: Option<String>,
    /// Opaque state for the callback.
    #[serde(default)]
    pub state: Option<String>,
    /// Human-readable detail.
    #[serde(default)]
    pub message: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Preferences
// ─────────────────────────────────────────────────────────────────────────────

/// Model preferences.
///
/// Doubles as a partial update: only `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Preferred provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_provider: Option<String>,
    /// Model for the main agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_agent_model: Option<String>,
    /// Model for sub agents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_agent_model: Option<String>,
    /// Response token cap for the main agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_agent_max_tokens: Option<u32>,
    /// Response token cap for sub agents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_agent_max_tokens: Option<u32>,
    /// `low`, `medium` or `high`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_agent_reasoning_effort: Option<String>,
    /// `low`, `medium` or `high`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_agent_reasoning_effort: Option<String>,
}

impl Preferences {
    /// Labelled values of every field that is set, in a stable order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        let mut push = |label: &'static str, value: Option<String>| {
            if let Some(value) = value {
                out.push((label, value));
            }
        };
        push("Preferred Provider", self.preferred_provider.clone());
        push("Main Agent Model", self.main_agent_model.clone());
        push("Sub Agent Model", self.sub_agent_model.clone());
        push(
            "Main Agent Max Tokens",
            self.main_agent_max_tokens.map(|v| v.to_string()),
        );
        push(
            "Sub Agent Max Tokens",
            self.sub_agent_max_tokens.map(|v| v.to_string()),
        );
        push(
            "Main Agent Reasoning Effort",
            self.main_agent_reasoning_effort.clone(),
        );
        push(
            "Sub Agent Reasoning Effort",
            self.sub_agent_reasoning_effort.clone(),
        );
        out
    }
}

/// Preferences plus the providers they may refer to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreferencesResponse {
    /// Stored preferences, if any were ever saved.
    #[serde(default)]
    pub preferences: Option<Preferences>,
    /// Providers the server can use, keyed by name.
    #[serde(default)]
    pub available_providers: BTreeMap<String, ProviderInfo>,
}

/// A provider and its models.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Model identifiers.
    #[serde(default)]
    pub models: Vec<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tools
// ─────────────────────────────────────────────────────────────────────────────

/// A tool the LLM can call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmTool {
    /// Tool name.
    #[serde(default)]
    pub name: Option<String>,
    /// Tool description.
    #[serde(default)]
    pub description: Option<String>,
    /// JSON schema of the parameters.
    #[serde(default)]
    pub parameters: Option<serde_json::Value>,
    /// Required parameter names.
    #[serde(default)]
    pub required: Vec<String>,
}

/// Response for listing LLM tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmToolsResponse {
    /// Tools.
    #[serde(default)]
    pub tools: Vec<LlmTool>,
}

/// Credential status grouped by category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolCredentialsStatus {
    /// Categories keyed by name.
    #[serde(default)]
    pub categories: BTreeMap<String, ToolCategory>,
}

/// A category of tools sharing credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolCategory {
    /// Display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Tools in this category.
    #[serde(default)]
    pub tools: Vec<ToolCredential>,
}

/// Credential status of one tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolCredential {
    /// Tool name.
    #[serde(default)]
    pub name: Option<String>,
    /// Display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Whether the tool's credentials are configured.
    #[serde(default)]
    pub authenticated: Option<bool>,
}

// ─────────────────────────────────────────────────────────────────────────────
// System
// ─────────────────────────────────────────────────────────────────────────────

/// Health check response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status (`ok`, `degraded`, ...).
    #[serde(default)]
    pub status: Option<String>,
    /// Server version.
    #[serde(default)]
    pub version: Option<String>,
    /// Server time.
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl HealthResponse {
    /// Status or `unknown`.
    pub fn status_str(&self) -> &str {
        self.status.as_deref().unwrap_or("unknown")
    }
}

/// A slash command the server understands.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandInfo {
    /// Command name.
    #[serde(default)]
    pub name: Option<String>,
    /// Command description.
    #[serde(default)]
    pub description: Option<String>,
    /// Usage string.
    #[serde(default)]
    pub usage: Option<String>,
}

/// An MCP server known to the Mix server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpServer {
    /// Server name.
    pub name: String,
    /// Status string.
    #[serde(default)]
    pub status: String,
    /// Whether connected.
    #[serde(default)]
    pub connected: bool,
    /// Tools exposed, when connected.
    #[serde(default)]
    pub tools: Option<Vec<McpTool>>,
}

/// A tool exposed by an MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpTool {
    /// Tool name.
    pub name: String,
    /// Tool description.
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_parses_rfc3339_and_unknown_type() {
        let session: Session = serde_json::from_value(json!({
            "id": "s1",
            "title": "Demo",
            "created_at": "2026-01-02T03:04:05Z",
            "session_type": "batch"
        }))
        .unwrap();
        assert_eq!(session.session_type, Some(SessionType::Other));
        assert_eq!(session.created_at.to_rfc3339(), "2026-01-02T03:04:05+00:00");
    }

    #[test]
    fn test_create_session_skips_absent_fields() {
        let body = serde_json::to_value(CreateSessionRequest::new("t")).unwrap();
        assert_eq!(body, json!({"title": "t"}));

        let body =
            serde_json::to_value(CreateSessionRequest::new("t").with_type(SessionType::Main))
                .unwrap();
        assert_eq!(body, json!({"title": "t", "session_type": "main"}));
    }

    #[test]
    fn test_message_display_content() {
        let mut msg: Message = serde_json::from_value(json!({
            "id": "m1",
            "role": "assistant",
            "user_input": "question",
            "assistant_response": "answer"
        }))
        .unwrap();
        assert_eq!(msg.display_content(), "answer");

        msg.role = "user".to_string();
        assert_eq!(msg.display_content(), "question");

        msg.role = "assistant".to_string();
        msg.assistant_response = None;
        assert_eq!(msg.display_content(), "question");
        assert!(!msg.has_tool_calls());
    }

    #[test]
    fn test_preferences_partial_update_body() {
        let update = Preferences {
            main_agent_max_tokens: Some(4096),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"main_agent_max_tokens": 4096})
        );
    }

    #[test]
    fn test_preferences_entries_order() {
        let prefs = Preferences {
            sub_agent_model: Some("small".into()),
            preferred_provider: Some("anthropic".into()),
            ..Default::default()
        };
        let labels: Vec<_> = prefs.entries().into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["Preferred Provider", "Sub Agent Model"]);
    }

    #[test]
    fn test_callback_type_field_name() {
        let cb = Callback::new(CallbackType::BashScript);
        assert_eq!(
            serde_json::to_value(&cb).unwrap(),
            json!({"type": "bash_script"})
        );
    }

    #[test]
    fn test_download_options_query() {
        let opts = DownloadOptions::thumbnail(100);
        assert_eq!(opts.thumb.as_deref(), Some("100"));
        assert!(opts.download.is_none());
    }
}
