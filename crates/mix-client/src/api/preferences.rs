//! Preferences API.

use reqwest::Method;

use crate::client::MixClient;
use crate::error::Result;
use crate::types::{Preferences, PreferencesResponse};

/// Preferences API client.
pub struct PreferencesApi {
    client: MixClient,
}

impl PreferencesApi {
    pub(crate) fn new(client: MixClient) -> Self {
        Self { client }
    }

    /// Current preferences and the providers they can point at.
    pub async fn get(&self) -> Result<PreferencesResponse> {
        self.client.call(Method::GET, "preferences")?.json().await
    }

    /// Update the fields set in `update`, leaving the rest alone.
    ///
    /// Returns the stored preferences after the update.
    pub async fn update(&self, update: &Preferences) -> Result<Preferences> {
        self.client
            .call(Method::PATCH, "preferences")?
            .body(update)
            .json()
            .await
    }

    /// Restore server defaults, returning them.
    pub async fn reset(&self) -> Result<Preferences> {
        self.client
            .call(Method::POST, "preferences/reset")?
            .empty_body()
            .json()
            .await
    }
}
