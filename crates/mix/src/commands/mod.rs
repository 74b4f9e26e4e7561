//! CLI command handlers.

use std::fmt::Display;
use std::time::Duration;

use anyhow::{Context as _, Result};
use console::{Style, style};
use mix_client::MixClient;
use mix_config::ClientConfig;

pub mod auth;
pub mod basic;
pub mod files;
pub mod messages;
pub mod permissions;
pub mod preferences;
pub mod sessions;
pub mod stream;
pub mod system;
pub mod tools;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Server URL to connect to.
    pub server_url: String,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
    /// Bearer token from the selected config context.
    pub auth_token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Default event stream deadline.
    pub stream_timeout: Duration,
    /// Delay between opening a stream and sending its trigger.
    pub grace_period: Duration,
}

impl Context {
    /// Build a context from the client config and command-line overrides.
    ///
    /// An explicit server URL wins over any context in the file.
    pub fn resolve(
        config: &ClientConfig,
        server: Option<String>,
        context_name: Option<&str>,
        json_output: bool,
        verbose: bool,
    ) -> Result<Self> {
        let server_url = match server {
            Some(url) => url,
            None => config.resolve_server(context_name)?,
        };
        let auth_token = match config.select(context_name)? {
            Some(context) => context
                .token()
                .with_context(|| format!("Failed to read token for context '{}'", context.name))?,
            None => None,
        };

        Ok(Self {
            server_url,
            json_output,
            verbose,
            auth_token,
            timeout: config.request_timeout(context_name)?,
            stream_timeout: config.defaults.stream_timeout(),
            grace_period: config.defaults.grace_period(),
        })
    }

    /// Create an API client for this context.
    pub fn client(&self) -> Result<MixClient> {
        let mut builder = MixClient::builder()
            .base_url(&self.server_url)
            .timeout(self.timeout)
            .stream_timeout(self.stream_timeout);
        if let Some(token) = &self.auth_token {
            builder = builder.auth_token(token);
        }
        builder
            .build()
            .with_context(|| format!("Invalid server URL: {}", self.server_url))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Output helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Print a walkthrough title.
pub fn banner(title: &str) {
    println!();
    println!("{}", style(title).bold());
    println!("{}", Style::new().dim().apply_to("─".repeat(50)));
    println!();
}

/// Print a numbered step heading.
pub fn step(n: u32, title: &str) {
    println!("{} {}", style(format!("{}.", n)).cyan(), title);
}

/// Print a labelled value under a step.
pub fn field(label: &str, value: impl Display) {
    println!("   {} {}", Style::new().dim().apply_to(label), value);
}

/// Print a success line.
pub fn success(message: impl Display) {
    println!("   {} {}", Style::new().green().apply_to("✓"), message);
}

/// Print a dimmed note.
pub fn note(message: impl Display) {
    println!("   {}", Style::new().dim().apply_to(message));
}

/// Report a failed step that the walkthrough can continue past.
pub fn failure(what: &str, err: impl Display) {
    eprintln!("   {} {}: {}", Style::new().red().apply_to("Error:"), what, err);
}

/// Print the closing line of a walkthrough.
pub fn finished(name: &str) {
    println!();
    println!(
        "{} {}",
        Style::new().green().apply_to("✓"),
        style(format!("{} walkthrough completed", name)).bold()
    );
}

/// Truncate to at most `max_len` characters, flattening newlines.
pub fn truncate(s: &str, max_len: usize) -> String {
    let s = s.replace('\n', " ");
    if s.chars().count() <= max_len {
        s
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Delete every session a walkthrough created. Failures are reported, not returned.
pub async fn cleanup_sessions(client: &MixClient, session_ids: &[String]) {
    if session_ids.is_empty() {
        return;
    }

    println!();
    println!("{}", style("Cleanup").bold());
    for id in session_ids {
        match client.sessions().delete(id).await {
            Ok(()) => note(format!("Deleted session {}", id)),
            Err(e) if e.is_not_found() => note(format!("Session {} already gone", id)),
            Err(e) => failure(&format!("delete session {}", id), e),
        }
    }
}

/// Print `value` as pretty JSON.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
