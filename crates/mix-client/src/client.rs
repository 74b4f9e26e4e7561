//! The shared HTTP client and its request plumbing.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::api::{
    AuthenticationApi, FilesApi, MessagesApi, PermissionsApi, PreferencesApi, SessionsApi,
    StreamingApi, SystemApi, ToolsApi,
};
use crate::error::{Error, ErrorResponse, Result};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default deadline for event streams.
const DEFAULT_STREAM_TIMEOUT: Duration = Duration::from_secs(60);

/// Server address used by [`MixClient::localhost`].
pub const DEFAULT_BASE_URL: &str = "http://localhost:8088";

/// Mix API client.
///
/// Cheap to clone; all clones share one connection pool.
///
/// # Example
///
/// ```no_run
/// use mix_client::MixClient;
///
/// # async fn example() -> mix_client::Result<()> {
/// let client = MixClient::builder()
///     .base_url("http://localhost:8088")
///     .build()?;
///
/// let sessions = client.sessions().list().await?;
/// println!("{} sessions", sessions.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MixClient {
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// HTTP client.
    pub(crate) http: reqwest::Client,
    /// Base URL for API requests.
    pub(crate) base_url: Url,
    /// Request timeout.
    pub(crate) timeout: Duration,
    /// Default stream deadline.
    pub(crate) stream_timeout: Duration,
}

impl MixClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client with default settings pointing to localhost.
    pub fn localhost() -> Result<Self> {
        Self::builder().base_url(DEFAULT_BASE_URL).build()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Default deadline applied to event streams.
    pub fn stream_timeout(&self) -> Duration {
        self.inner.stream_timeout
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the sessions API.
    pub fn sessions(&self) -> SessionsApi {
        SessionsApi::new(self.clone())
    }

    /// Access the messages API.
    pub fn messages(&self) -> MessagesApi {
        MessagesApi::new(self.clone())
    }

    /// Access the session files API.
    pub fn files(&self) -> FilesApi {
        FilesApi::new(self.clone())
    }

    /// Access the authentication API.
    pub fn authentication(&self) -> AuthenticationApi {
        AuthenticationApi::new(self.clone())
    }

    /// Access the preferences API.
    pub fn preferences(&self) -> PreferencesApi {
        PreferencesApi::new(self.clone())
    }

    /// Access the permissions API.
    pub fn permissions(&self) -> PermissionsApi {
        PermissionsApi::new(self.clone())
    }

    /// Access the tools API.
    pub fn tools(&self) -> ToolsApi {
        ToolsApi::new(self.clone())
    }

    /// Access the system API.
    pub fn system(&self) -> SystemApi {
        SystemApi::new(self.clone())
    }

    /// Access the event streaming API.
    pub fn streaming(&self) -> StreamingApi {
        StreamingApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Request plumbing
    // ─────────────────────────────────────────────────────────────────────────

    /// URL of an API path (under `/api/`).
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        self.root_url(&format!("api/{}", path.trim_start_matches('/')))
    }

    /// URL relative to the server root.
    pub(crate) fn root_url(&self, path: &str) -> Result<Url> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    /// Start a call to an API path.
    pub(crate) fn call(&self, method: Method, path: &str) -> Result<Call<'_>> {
        let url = self.url(path)?;
        Ok(self.call_url(method, url))
    }

    /// Start a call to a path outside `/api/` (`/health`, `/internal/...`).
    pub(crate) fn call_root(&self, method: Method, path: &str) -> Result<Call<'_>> {
        let url = self.root_url(path)?;
        Ok(self.call_url(method, url))
    }

    fn call_url(&self, method: Method, url: Url) -> Call<'_> {
        Call {
            client: self,
            request: self
                .inner
                .http
                .request(method, url)
                .timeout(self.inner.timeout),
        }
    }

    /// Send a request, turning any non-success status into an [`Error`].
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        let request = request.build()?;
        tracing::debug!(method = %request.method(), url = %request.url(), "Sending request");

        let response = self.inner.http.execute(request).await?;
        if !response.status().is_success() {
            return Err(extract_error(response).await);
        }
        Ok(response)
    }
}

/// One pending API request.
///
/// Built by [`MixClient::call`]; finished by one of the `async` methods,
/// which pick how the response body is read.
pub(crate) struct Call<'a> {
    client: &'a MixClient,
    request: RequestBuilder,
}

impl Call<'_> {
    /// Attach a JSON body.
    pub(crate) fn body<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        self.request = self.request.json(body);
        self
    }

    /// Attach an empty JSON object, for POSTs the server expects a body on.
    pub(crate) fn empty_body(self) -> Self {
        self.body(&serde_json::json!({}))
    }

    pub(crate) fn query<Q: Serialize + ?Sized>(mut self, query: &Q) -> Self {
        self.request = self.request.query(query);
        self
    }

    pub(crate) fn multipart(mut self, form: reqwest::multipart::Form) -> Self {
        self.request = self.request.multipart(form);
        self
    }

    /// Decode the response as JSON.
    pub(crate) async fn json<T: DeserializeOwned>(self) -> Result<T> {
        let response = self.client.send(self.request).await?;
        Ok(response.json().await?)
    }

    /// Discard the response body.
    pub(crate) async fn unit(self) -> Result<()> {
        self.client.send(self.request).await?;
        Ok(())
    }

    /// Return the raw response body.
    pub(crate) async fn bytes(self) -> Result<Bytes> {
        let response = self.client.send(self.request).await?;
        Ok(response.bytes().await?)
    }
}

/// Map a non-success response to the matching [`Error`] variant.
pub(crate) async fn extract_error(response: reqwest::Response) -> Error {
    let status = response.status().as_u16();

    // Body may be empty or not JSON
    let parsed = response.json::<ErrorResponse>().await.ok();
    let message = parsed
        .as_ref()
        .and_then(|e| e.message.clone())
        .unwrap_or_else(|| format!("HTTP {}", status));

    match status {
        404 => Error::NotFound(message),
        401 => Error::Auth(message),
        _ => Error::Api {
            status,
            code: parsed.and_then(|e| e.code),
            message,
        },
    }
}

/// Builder for creating a [`MixClient`].
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    auth_token: Option<String>,
    timeout: Duration,
    stream_timeout: Duration,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            auth_token: None,
            timeout: DEFAULT_TIMEOUT,
            stream_timeout: DEFAULT_STREAM_TIMEOUT,
            user_agent: None,
        }
    }

    /// Set the base URL for the server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the bearer token sent with every request.
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the default deadline for event streams.
    pub fn stream_timeout(mut self, timeout: Duration) -> Self {
        self.stream_timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<MixClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // Normalize so relative joins keep any path prefix
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| Error::Config("Invalid auth token".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("mix-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .build()?;

        Ok(MixClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
                stream_timeout: self.stream_timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_base_url() {
        let result = ClientBuilder::new().build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_normalizes_trailing_slash() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8088")
            .build()
            .unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8088/");

        let client = ClientBuilder::new()
            .base_url("http://localhost:8088/")
            .build()
            .unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8088/");
    }

    #[test]
    fn test_builder_rejects_bad_token() {
        let result = ClientBuilder::new()
            .base_url("http://localhost:8088")
            .auth_token("bad\ntoken")
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_url_building() {
        let client = MixClient::localhost().unwrap();

        let url = client.url("sessions").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8088/api/sessions");

        let url = client.url("/sessions/abc/messages").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8088/api/sessions/abc/messages");

        let url = client.root_url("health").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8088/health");
    }

    #[test]
    fn test_call_applies_method_url_and_timeout() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8088")
            .timeout(Duration::from_secs(7))
            .build()
            .unwrap();

        let request = client
            .call(Method::PATCH, "preferences")
            .unwrap()
            .body(&serde_json::json!({"main_agent_max_tokens": 4096}))
            .request
            .build()
            .unwrap();
        assert_eq!(request.method(), Method::PATCH);
        assert_eq!(request.url().as_str(), "http://localhost:8088/api/preferences");
        assert_eq!(request.timeout(), Some(&Duration::from_secs(7)));

        let request = client
            .call_root(Method::POST, "internal/oauth/refresh")
            .unwrap()
            .request
            .build()
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://localhost:8088/internal/oauth/refresh"
        );
    }

    #[test]
    fn test_url_building_keeps_prefix() {
        let client = ClientBuilder::new()
            .base_url("https://gateway.example.com/mix")
            .build()
            .unwrap();

        let url = client.url("sessions").unwrap();
        assert_eq!(url.as_str(), "https://gateway.example.com/mix/api/sessions");
        let url = client.root_url("/stream").unwrap();
        assert_eq!(url.as_str(), "https://gateway.example.com/mix/stream");
    }
}
