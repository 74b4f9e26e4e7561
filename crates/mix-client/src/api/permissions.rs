//! Permissions API.

use reqwest::Method;

use crate::client::MixClient;
use crate::error::Result;

/// Permissions API client.
///
/// Permission IDs come from `permission` events on a session stream.
pub struct PermissionsApi {
    client: MixClient,
}

impl PermissionsApi {
    pub(crate) fn new(client: MixClient) -> Self {
        Self { client }
    }

    /// Approve a pending request.
    pub async fn grant(&self, id: &str) -> Result<()> {
        self.decide(id, "grant").await
    }

    /// Reject a pending request.
    pub async fn deny(&self, id: &str) -> Result<()> {
        self.decide(id, "deny").await
    }

    async fn decide(&self, id: &str, decision: &str) -> Result<()> {
        self.client
            .call(Method::POST, &format!("permissions/{}/{}", id, decision))?
            .empty_body()
            .unit()
            .await
    }
}
