//! Messages API.

use reqwest::Method;

use crate::client::MixClient;
use crate::error::Result;
use crate::types::{HistoryQuery, Message, SendMessageRequest};

/// Messages API client.
pub struct MessagesApi {
    client: MixClient,
}

impl MessagesApi {
    pub(crate) fn new(client: MixClient) -> Self {
        Self { client }
    }

    /// Send a message to a session.
    ///
    /// The server processes it asynchronously; results arrive on the
    /// session's event stream.
    pub async fn send(&self, session_id: &str, text: impl Into<String>) -> Result<()> {
        self.client
            .call(Method::POST, &format!("sessions/{}/messages", session_id))?
            .body(&SendMessageRequest::new(text))
            .unit()
            .await
    }

    /// List a session's messages.
    pub async fn list(&self, session_id: &str) -> Result<Vec<Message>> {
        self.client
            .call(Method::GET, &format!("sessions/{}/messages", session_id))?
            .json()
            .await
    }

    /// Message history across all sessions.
    pub async fn history(&self, query: HistoryQuery) -> Result<Vec<Message>> {
        self.client
            .call(Method::GET, "messages/history")?
            .query(&query)
            .json()
            .await
    }
}
