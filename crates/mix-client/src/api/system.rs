//! System API: health, slash commands and MCP servers.

use reqwest::Method;

use crate::client::MixClient;
use crate::error::Result;
use crate::types::{CommandInfo, HealthResponse, McpServer};

/// System API client.
pub struct SystemApi {
    client: MixClient,
}

impl SystemApi {
    pub(crate) fn new(client: MixClient) -> Self {
        Self { client }
    }

    /// Check server health.
    pub async fn health(&self) -> Result<HealthResponse> {
        self.client.call_root(Method::GET, "health")?.json().await
    }

    /// Check if the server is healthy (returns false on any error).
    pub async fn is_healthy(&self) -> bool {
        self.health().await.is_ok()
    }

    /// List available commands.
    pub async fn commands(&self) -> Result<Vec<CommandInfo>> {
        self.client.call(Method::GET, "commands")?.json().await
    }

    /// Get one command by name.
    pub async fn command(&self, name: &str) -> Result<CommandInfo> {
        self.client
            .call(Method::GET, &format!("commands/{}", name))?
            .json()
            .await
    }

    /// List configured MCP servers.
    pub async fn mcp_servers(&self) -> Result<Vec<McpServer>> {
        self.client.call(Method::GET, "mcp")?.json().await
    }
}
