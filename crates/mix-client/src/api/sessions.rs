//! Sessions API.

use reqwest::Method;

use crate::client::MixClient;
use crate::error::Result;
use crate::types::{
    Callback, CreateSessionRequest, ForkSessionRequest, RewindSessionRequest, Session,
    SessionExport, UpdateCallbacksRequest,
};

/// Sessions API client.
pub struct SessionsApi {
    client: MixClient,
}

impl SessionsApi {
    pub(crate) fn new(client: MixClient) -> Self {
        Self { client }
    }

    /// List all sessions.
    pub async fn list(&self) -> Result<Vec<Session>> {
        self.client.call(Method::GET, "sessions")?.json().await
    }

    /// Get a session by ID.
    pub async fn get(&self, id: &str) -> Result<Session> {
        self.client
            .call(Method::GET, &format!("sessions/{}", id))?
            .json()
            .await
    }

    /// Create a new session.
    pub async fn create(&self, request: CreateSessionRequest) -> Result<Session> {
        self.client
            .call(Method::POST, "sessions")?
            .body(&request)
            .json()
            .await
    }

    /// Delete a session.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client
            .call(Method::DELETE, &format!("sessions/{}", id))?
            .unit()
            .await
    }

    /// Fork a session, keeping messages up to `message_index`.
    pub async fn fork(&self, id: &str, request: ForkSessionRequest) -> Result<Session> {
        self.client
            .call(Method::POST, &format!("sessions/{}/fork", id))?
            .body(&request)
            .json()
            .await
    }

    /// Replace the session's callbacks.
    pub async fn update_callbacks(&self, id: &str, callbacks: Vec<Callback>) -> Result<()> {
        self.client
            .call(Method::PUT, &format!("sessions/{}/callbacks", id))?
            .body(&UpdateCallbacksRequest { callbacks })
            .unit()
            .await
    }

    /// Export a session with its full transcript.
    pub async fn export(&self, id: &str) -> Result<SessionExport> {
        self.client
            .call(Method::GET, &format!("sessions/{}/export", id))?
            .json()
            .await
    }

    /// Drop every message after `message_id`.
    pub async fn rewind(&self, id: &str, message_id: impl Into<String>) -> Result<()> {
        let request = RewindSessionRequest {
            message_id: message_id.into(),
        };
        self.client
            .call(Method::POST, &format!("sessions/{}/rewind", id))?
            .body(&request)
            .unit()
            .await
    }

    /// Stop whatever the session is processing.
    pub async fn cancel(&self, id: &str) -> Result<()> {
        self.client
            .call(Method::POST, &format!("sessions/{}/cancel", id))?
            .empty_body()
            .unit()
            .await
    }
}
