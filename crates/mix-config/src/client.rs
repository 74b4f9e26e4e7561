//! Named connection contexts and the timings shared between them.
//!
//! ```yaml
//! current-context: local
//!
//! contexts:
//!   - name: local
//!     server: http://localhost:8088
//!   - name: lab
//!     server: https://mix.lab.internal
//!     auth:
//!       type: bearer
//!       token-env: MIX_LAB_TOKEN
//!     timeout: 60
//!
//! defaults:
//!   timeout: 30
//!   stream-timeout: 60
//!   grace-period-ms: 500
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::AuthConfig;
use crate::{ConfigError, Result};

/// Server used when nothing else is configured.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8088";

/// Contents of `client.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClientConfig {
    /// Context used when none is named on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_context: Option<String>,

    /// Known servers, in file order. Names are unique.
    #[serde(default)]
    pub contexts: Vec<Context>,

    /// Timings that apply unless a context overrides them.
    #[serde(default)]
    pub defaults: ClientDefaults,
}

impl ClientConfig {
    /// A config with no contexts and default timings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(ConfigError::from)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(ConfigError::from)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.contexts.iter().position(|c| c.name == name)
    }

    /// The context `current-context` points at. A dangling name yields `None`.
    pub fn current(&self) -> Option<&Context> {
        let name = self.current_context.as_deref()?;
        self.get_context(name)
    }

    pub fn get_context(&self, name: &str) -> Option<&Context> {
        self.position(name).map(|i| &self.contexts[i])
    }

    /// Insert `context`, replacing any existing one with the same name in place.
    pub fn set_context(&mut self, context: Context) {
        match self.position(&context.name) {
            Some(i) => self.contexts[i] = context,
            None => self.contexts.push(context),
        }
    }

    /// Remove and return a context. Clears `current-context` if it pointed here.
    pub fn remove_context(&mut self, name: &str) -> Option<Context> {
        let removed = self.contexts.remove(self.position(name)?);
        if self.current_context.as_deref() == Some(name) {
            self.current_context = None;
        }
        Some(removed)
    }

    /// Make `name` the current context.
    pub fn use_context(&mut self, name: &str) -> Result<()> {
        if self.position(name).is_none() {
            return Err(ConfigError::ContextNotFound(name.to_string()));
        }
        self.current_context = Some(name.to_string());
        Ok(())
    }

    /// The named context, or the current one when no name is given.
    ///
    /// Naming a context that does not exist is an error; having no current
    /// context is not.
    pub fn select(&self, name: Option<&str>) -> Result<Option<&Context>> {
        let Some(name) = name else {
            return Ok(self.current());
        };
        self.get_context(name)
            .map(Some)
            .ok_or_else(|| ConfigError::ContextNotFound(name.to_string()))
    }

    /// Server URL of the selected context, or [`DEFAULT_SERVER_URL`].
    pub fn resolve_server(&self, name: Option<&str>) -> Result<String> {
        let server = match self.select(name)? {
            Some(context) => context.server.clone(),
            None => DEFAULT_SERVER_URL.to_string(),
        };
        Ok(server)
    }

    /// Per-request timeout of the selected context, or the default.
    pub fn request_timeout(&self, name: Option<&str>) -> Result<Duration> {
        let secs = self
            .select(name)?
            .and_then(|c| c.timeout)
            .unwrap_or(self.defaults.timeout);
        Ok(Duration::from_secs(secs))
    }
}

/// One server the CLI can talk to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Context {
    pub name: String,

    /// Base URL, e.g. `http://localhost:8088`.
    pub server: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,

    /// Per-request timeout in seconds, overriding `defaults.timeout`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl Context {
    pub fn new(name: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            server: server.into(),
            auth: None,
            timeout: None,
        }
    }

    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Override the request timeout, in seconds.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Some(secs);
        self
    }

    /// Bearer token for this context, if it has auth configured and a token is available.
    pub fn token(&self) -> Result<Option<String>> {
        self.auth
            .as_ref()
            .map_or(Ok(None), |auth| auth.resolve())
    }
}

/// Timings shared by every context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClientDefaults {
    /// Per-request timeout, seconds.
    pub timeout: u64,

    /// Event stream deadline, seconds.
    pub stream_timeout: u64,

    /// How long to wait for a stream to connect before sending its trigger, milliseconds.
    pub grace_period_ms: u64,
}

impl ClientDefaults {
    pub fn stream_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_timeout)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}

impl Default for ClientDefaults {
    fn default() -> Self {
        Self {
            timeout: 30,
            stream_timeout: 60,
            grace_period_ms: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAB_YAML: &str = r#"
current-context: lab

contexts:
  - name: local
    server: http://localhost:8088

  - name: lab
    server: https://mix.lab.internal
    auth:
      type: bearer
      token-env: MIX_LAB_TOKEN
    timeout: 60

defaults:
  timeout: 10
  stream-timeout: 120
  grace-period-ms: 250
"#;

    #[test]
    fn test_new_has_default_timings() {
        let config = ClientConfig::new();
        assert!(config.current().is_none());
        assert!(config.contexts.is_empty());
        assert_eq!(config.defaults, ClientDefaults::default());
        assert_eq!(config.defaults.grace_period(), Duration::from_millis(500));
    }

    #[test]
    fn test_parse_contexts_and_defaults() {
        let config = ClientConfig::from_yaml(LAB_YAML).unwrap();

        assert_eq!(config.current().map(|c| c.name.as_str()), Some("lab"));
        assert_eq!(config.contexts.len(), 2);

        let lab = config.get_context("lab").unwrap();
        assert_eq!(lab.timeout, Some(60));
        assert!(matches!(
            &lab.auth,
            Some(AuthConfig::Bearer { token_env: Some(var), .. }) if var == "MIX_LAB_TOKEN"
        ));

        assert_eq!(config.defaults.stream_timeout(), Duration::from_secs(120));
        assert_eq!(config.defaults.grace_period(), Duration::from_millis(250));
    }

    #[test]
    fn test_missing_default_keys_keep_their_defaults() {
        let config = ClientConfig::from_yaml("defaults:\n  stream-timeout: 5\n").unwrap();
        assert_eq!(config.defaults.stream_timeout, 5);
        assert_eq!(config.defaults.timeout, 30);
        assert_eq!(config.defaults.grace_period_ms, 500);
    }

    #[test]
    fn test_dangling_current_context() {
        let config = ClientConfig::from_yaml("current-context: gone\n").unwrap();
        assert!(config.current().is_none());
        assert_eq!(config.resolve_server(None).unwrap(), DEFAULT_SERVER_URL);
    }

    #[test]
    fn test_resolve_server_order() {
        let mut config = ClientConfig::new();
        assert_eq!(config.resolve_server(None).unwrap(), DEFAULT_SERVER_URL);

        config.set_context(Context::new("local", "http://127.0.0.1:9000"));
        config.set_context(Context::new("lab", "https://mix.lab.internal"));
        config.use_context("local").unwrap();

        assert_eq!(config.resolve_server(None).unwrap(), "http://127.0.0.1:9000");
        assert_eq!(
            config.resolve_server(Some("lab")).unwrap(),
            "https://mix.lab.internal"
        );
        assert!(matches!(
            config.resolve_server(Some("missing")),
            Err(ConfigError::ContextNotFound(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_request_timeout_prefers_context() {
        let config = ClientConfig::from_yaml(LAB_YAML).unwrap();
        assert_eq!(config.request_timeout(None).unwrap(), Duration::from_secs(60));
        assert_eq!(
            config.request_timeout(Some("local")).unwrap(),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn test_set_context_replaces_in_place() {
        let mut config = ClientConfig::new();
        config.set_context(Context::new("a", "http://a"));
        config.set_context(Context::new("b", "http://b"));
        config.set_context(Context::new("a", "http://a2"));

        let names: Vec<_> = config.contexts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(config.get_context("a").unwrap().server, "http://a2");
    }

    #[test]
    fn test_remove_current_context_clears_it() {
        let mut config = ClientConfig::new();
        config.set_context(Context::new("local", "http://localhost:8088"));
        config.use_context("local").unwrap();

        assert_eq!(config.remove_context("local").unwrap().name, "local");
        assert!(config.current_context.is_none());
        assert!(config.remove_context("local").is_none());
        assert!(config.use_context("local").is_err());
    }

    #[test]
    fn test_yaml_omits_unset_fields() {
        let mut config = ClientConfig::new();
        config.set_context(Context::new("local", "http://localhost:8088"));
        let yaml = config.to_yaml().unwrap();
        assert!(!yaml.contains("current-context"));
        assert!(!yaml.contains("auth"));
        assert!(yaml.contains("grace-period-ms: 500"));
    }
}
