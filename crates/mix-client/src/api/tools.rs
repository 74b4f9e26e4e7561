//! Tools API.

use reqwest::Method;
use serde_json::Value;

use crate::client::MixClient;
use crate::error::Result;
use crate::types::{LlmTool, LlmToolsResponse, ToolCredentialsStatus};

/// Tools API client.
pub struct ToolsApi {
    client: MixClient,
}

impl ToolsApi {
    pub(crate) fn new(client: MixClient) -> Self {
        Self { client }
    }

    /// Tools the model can call.
    pub async fn list(&self) -> Result<Vec<LlmTool>> {
        let response: LlmToolsResponse = self.client.call(Method::GET, "tools")?.json().await?;
        Ok(response.tools)
    }

    /// Raw tool status. The shape varies by server version.
    pub async fn status(&self) -> Result<Value> {
        self.client.call(Method::GET, "tools/status")?.json().await
    }

    /// Credential status grouped by tool category.
    pub async fn credentials(&self) -> Result<ToolCredentialsStatus> {
        self.client
            .call(Method::GET, "tools/credentials")?
            .json()
            .await
    }
}
