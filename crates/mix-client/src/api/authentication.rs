//! Authentication API.

use reqwest::Method;
use serde_json::Value;

use crate::client::MixClient;
use crate::error::Result;
use crate::types::{AuthStatus, OAuthStart, ProviderValidation, StoreApiKeyRequest};

/// Authentication API client.
pub struct AuthenticationApi {
    client: MixClient,
}

impl AuthenticationApi {
    pub(crate) fn new(client: MixClient) -> Self {
        Self { client }
    }

    /// Credential status for every provider.
    pub async fn status(&self) -> Result<AuthStatus> {
        self.client.call(Method::GET, "auth/status")?.json().await
    }

    /// Store an API key for a provider.
    pub async fn store_api_key(
        &self,
        provider: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<()> {
        let request = StoreApiKeyRequest {
            provider: provider.into(),
            api_key: api_key.into(),
        };
        self.client
            .call(Method::POST, "auth/api-key")?
            .body(&request)
            .unit()
            .await
    }

    /// Check that the preferred provider has working credentials.
    pub async fn validate_preferred(&self) -> Result<ProviderValidation> {
        self.client
            .call(Method::POST, "auth/validate-preferred")?
            .empty_body()
            .json()
            .await
    }

    /// Begin an OAuth flow for a provider.
    pub async fn start_oauth(&self, provider: &str) -> Result<OAuthStart> {
        self.client
            .call(Method::POST, &format!("auth/oauth/{}/start", provider))?
            .empty_body()
            .json()
            .await
    }

    /// OAuth token health. The shape varies by server version.
    pub async fn oauth_health(&self) -> Result<Value> {
        self.client.call(Method::GET, "auth/oauth-health")?.json().await
    }

    /// Delete stored credentials for a provider.
    pub async fn delete_credentials(&self, provider: &str) -> Result<()> {
        self.client
            .call(Method::DELETE, &format!("auth/{}", provider))?
            .unit()
            .await
    }

    /// Force a refresh of stored OAuth tokens.
    pub async fn refresh_oauth_tokens(&self) -> Result<()> {
        self.client
            .call_root(Method::POST, "internal/oauth/refresh")?
            .empty_body()
            .unit()
            .await
    }
}
