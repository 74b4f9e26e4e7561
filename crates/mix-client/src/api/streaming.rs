//! Streaming API.

use std::time::Duration;

use reqwest::header::{ACCEPT, CACHE_CONTROL};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::client::{extract_error, MixClient};
use crate::error::{Error, Result};
use crate::stream::EventStream;

/// Header carrying the resumption point.
const LAST_EVENT_ID: &str = "Last-Event-ID";

/// Options for opening an event stream.
#[derive(Debug, Clone, Default)]
pub struct StreamOptions {
    /// Resume after this event ID.
    pub last_event_id: Option<String>,
    /// Overall deadline; falls back to the client's stream timeout.
    pub timeout: Option<Duration>,
    /// Token that closes the stream when cancelled.
    pub cancel: Option<CancellationToken>,
}

impl StreamOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume after the given event ID.
    pub fn last_event_id(mut self, id: impl Into<String>) -> Self {
        self.last_event_id = Some(id.into());
        self
    }

    /// Set the stream deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Close the stream when `token` is cancelled.
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Streaming API client.
pub struct StreamingApi {
    client: MixClient,
}

impl StreamingApi {
    pub(crate) fn new(client: MixClient) -> Self {
        Self { client }
    }

    /// Open the event stream for a session.
    ///
    /// The deadline covers both the handshake and the life of the stream.
    /// Anything that stops the stream from opening (unreachable server,
    /// non-success status, deadline, cancellation) is reported as an error
    /// for which [`Error::is_connection_error`] holds.
    pub async fn open(&self, session_id: &str, options: StreamOptions) -> Result<EventStream> {
        let timeout = options.timeout.unwrap_or_else(|| self.client.stream_timeout());
        let deadline = Instant::now() + timeout;
        let cancel = options.cancel.unwrap_or_default();
        let last_event_id = options.last_event_id.filter(|id| !id.is_empty());

        let url = self.client.root_url("stream")?;
        let mut request = self
            .client
            .http()
            .get(url)
            .query(&[("sessionId", session_id)])
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache");
        if let Some(id) = &last_event_id {
            request = request.header(LAST_EVENT_ID, id.as_str());
        }

        tracing::debug!(session_id, ?timeout, ?last_event_id, "Opening event stream");

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(Error::Connection("cancelled before the stream opened".to_string()));
            }
            result = tokio::time::timeout_at(deadline, request.send()) => match result {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => return Err(Error::Connection(e.to_string())),
                Err(_) => {
                    return Err(Error::Connection(format!(
                        "no response within {:?}",
                        timeout
                    )));
                }
            },
        };

        if !response.status().is_success() {
            return Err(extract_error(response).await);
        }

        tracing::debug!(session_id, "Event stream opened");

        Ok(
            EventStream::with_deadline(response.bytes_stream(), deadline, timeout)
                .with_cancel(cancel)
                .with_last_event_id(last_event_id),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let token = CancellationToken::new();
        let options = StreamOptions::new()
            .last_event_id("42")
            .timeout(Duration::from_secs(5))
            .cancel_token(token);

        assert_eq!(options.last_event_id.as_deref(), Some("42"));
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
        assert!(options.cancel.is_some());
    }

    #[tokio::test]
    async fn test_open_unreachable_is_connection_error() {
        // Port 9 (discard) is closed on test hosts.
        let client = MixClient::builder()
            .base_url("http://127.0.0.1:9")
            .build()
            .unwrap();

        let err = client
            .streaming()
            .open("s1", StreamOptions::new().timeout(Duration::from_secs(5)))
            .await
            .unwrap_err();
        assert!(err.is_connection_error());
    }

    #[tokio::test]
    async fn test_open_cancelled_is_connection_error() {
        let token = CancellationToken::new();
        token.cancel();
        let client = MixClient::localhost().unwrap();

        let err = client
            .streaming()
            .open("s1", StreamOptions::new().cancel_token(token))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
    }
}
