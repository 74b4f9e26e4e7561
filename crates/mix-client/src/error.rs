//! Errors returned by the Mix client.

use std::time::Duration;

use thiserror::Error;

/// Everything a client call can fail with.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure from reqwest.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The base URL or a joined path did not parse.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A body did not match the expected shape.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Any other non-success status.
    #[error("server returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Machine-readable code, if the body carried one.
        code: Option<String>,
        /// Message from the body, or `HTTP {status}`.
        message: String,
    },

    /// 401 from the server.
    #[error("unauthorized: {0}")]
    Auth(String),

    /// 404 from the server.
    #[error("not found: {0}")]
    NotFound(String),

    /// The client was built with bad settings.
    #[error("invalid client configuration: {0}")]
    Config(String),

    /// An event stream could not be established.
    #[error("could not open stream: {0}")]
    Connection(String),

    /// An open event stream failed mid-flight.
    #[error("stream failed: {0}")]
    Stream(String),

    /// The stream deadline elapsed while waiting for a frame.
    #[error("stream deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    /// A single frame could not be decoded.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),
}

impl Error {
    /// Check if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::Api { status: 404, .. })
    }

    /// Check if this is an authentication or authorization error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth(_) | Error::Api { status: 401 | 403, .. })
    }

    /// Check if this is a server-side (5xx) error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Api { status, .. } if *status >= 500)
    }

    /// Check if the stream could not be established at all.
    ///
    /// Covers transport failures and any non-success status on open.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Error::Connection(_) | Error::Api { .. } | Error::Auth(_) | Error::NotFound(_)
        )
    }

    /// Check if this error ended an open stream.
    pub fn is_stream_error(&self) -> bool {
        matches!(self, Error::Stream(_) | Error::DeadlineExceeded(_))
    }

    /// Check if a deadline caused this error.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::DeadlineExceeded(_) => true,
            Error::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// Result alias for client calls.
pub type Result<T> = std::result::Result<T, Error>;

/// Error body sent with a non-success status.
///
/// The server is inconsistent about field names, so both `message` and
/// `error` are accepted.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, alias = "error")]
    pub message: Option<String>,
}
