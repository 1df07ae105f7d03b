use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::merge::{FileStore, MergeError};
use crate::infra::google::auth::GoogleAuth;

/// Minimal Drive REST client covering the copy and permission calls the
/// merge needs.
pub struct DriveApiClient {
    client: Client,
    auth: Arc<GoogleAuth>,
    base_url: String,
}

impl DriveApiClient {
    pub fn new(auth: Arc<GoogleAuth>) -> Self {
        Self {
            client: Client::new(),
            auth,
            base_url: "https://www.googleapis.com".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CopyRequest<'a> {
    name: &'a str,
    parents: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct CopiedFile {
    id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PermissionRequest<'a> {
    role: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    email_address: &'a str,
}

#[async_trait]
impl FileStore for DriveApiClient {
    async fn copy_file(
        &self,
        file_id: &str,
        folder_id: &str,
        new_name: &str,
    ) -> Result<String, MergeError> {
        let token = self
            .auth
            .access_token()
            .await
            .map_err(|e| MergeError::Copy(e.to_string()))?;

        let url = format!("{}/drive/v3/files/{}/copy", self.base_url, file_id);
        let body = CopyRequest {
            name: new_name,
            parents: [folder_id],
        };

        tracing::debug!(file_id, new_name, "copying template");

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .query(&[("fields", "id")])
            .json(&body)
            .send()
            .await
            .map_err(|e| MergeError::Copy(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp
                .text()
                .await
                .map_err(|e| MergeError::Copy(e.to_string()))?;
            return Err(MergeError::Copy(format!(
                "Drive returned {} copying {}: {}",
                status, file_id, text
            )));
        }

        let copied: CopiedFile = resp
            .json()
            .await
            .map_err(|e| MergeError::Copy(e.to_string()))?;
        Ok(copied.id)
    }

    async fn set_permissions(&self, file_id: &str, email: &str) -> Result<(), MergeError> {
        let token = self
            .auth
            .access_token()
            .await
            .map_err(|e| MergeError::Permission(e.to_string()))?;

        let url = format!("{}/drive/v3/files/{}/permissions", self.base_url, file_id);
        let body = PermissionRequest {
            role: "owner",
            kind: "user",
            email_address: email,
        };

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .query(&[("transferOwnership", "true")])
            .json(&body)
            .send()
            .await
            .map_err(|e| MergeError::Permission(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp
                .text()
                .await
                .map_err(|e| MergeError::Permission(e.to_string()))?;
            return Err(MergeError::Permission(format!(
                "Drive returned {} updating permissions on {}: {}",
                status, file_id, text
            )));
        }

        Ok(())
    }
}
