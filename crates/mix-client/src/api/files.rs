//! Session files API.

use reqwest::multipart::{Form, Part};
use reqwest::Method;

use crate::client::MixClient;
use crate::error::Result;
use crate::types::{DownloadOptions, FileInfo};

/// Session files API client.
pub struct FilesApi {
    client: MixClient,
}

impl FilesApi {
    pub(crate) fn new(client: MixClient) -> Self {
        Self { client }
    }

    /// Upload a file into a session.
    pub async fn upload(
        &self,
        session_id: &str,
        file_name: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Result<FileInfo> {
        let part = Part::bytes(content.into()).file_name(file_name.into());
        let form = Form::new().part("file", part);
        self.client
            .call(Method::POST, &format!("sessions/{}/files", session_id))?
            .multipart(form)
            .json()
            .await
    }

    /// List a session's files.
    pub async fn list(&self, session_id: &str) -> Result<Vec<FileInfo>> {
        self.client
            .call(Method::GET, &format!("sessions/{}/files", session_id))?
            .json()
            .await
    }

    /// Download a file, optionally as a thumbnail.
    pub async fn download(
        &self,
        session_id: &str,
        path: &str,
        options: DownloadOptions,
    ) -> Result<bytes::Bytes> {
        self.client
            .call(Method::GET, &file_path(session_id, path))?
            .query(&options)
            .bytes()
            .await
    }

    /// Delete a file.
    pub async fn delete(&self, session_id: &str, path: &str) -> Result<()> {
        self.client
            .call(Method::DELETE, &file_path(session_id, path))?
            .unit()
            .await
    }
}

/// API path of a file; a leading `/` on `path` is ignored.
fn file_path(session_id: &str, path: &str) -> String {
    format!("sessions/{}/files/{}", session_id, path.trim_start_matches('/'))
}
