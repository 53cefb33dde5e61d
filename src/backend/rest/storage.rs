use async_trait::async_trait;
use serde::Deserialize;

use super::RestBackend;
use crate::backend::{BackendError, BackendPath, BackendResult, StorageBackend, StoredObject};
use crate::models::FileBlob;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    name: String,
    content_type: Option<String>,
    download_tokens: Option<String>,
}

impl RestBackend {
    fn bucket_url(&self) -> String {
        format!(
            "{}/v0/b/{}/o",
            self.config.storage_url.trim_end_matches('/'),
            self.config.storage_bucket
        )
    }

    fn object_url(&self, path: &BackendPath) -> String {
        format!("{}/{}", self.bucket_url(), urlencoding::encode(&path.to_string()))
    }

    async fn storage_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.id_token().await {
            Some(token) => request.header("Authorization", format!("Firebase {}", token)),
            None => request,
        }
    }
}

#[async_trait]
impl StorageBackend for RestBackend {
    async fn put(&self, path: &BackendPath, blob: &FileBlob) -> BackendResult<StoredObject> {
        let url = self.bucket_url();
        let content_type = blob.resolved_content_type();
        let name = path.to_string();
        tracing::debug!("Uploading {} bytes to {} ({})", blob.bytes.len(), name, content_type);

        let request = self
            .client
            .post(&url)
            .query(&[("uploadType", "media"), ("name", name.as_str())])
            .header("Content-Type", content_type.clone())
            .body(blob.bytes.clone());
        let request = self.storage_auth(request).await;
        let response = Self::check_status(request.send().await?, "Storage upload").await?;
        let metadata: ObjectMetadata = response.json().await?;

        Ok(StoredObject {
            path: BackendPath::new(&metadata.name),
            size: blob.bytes.len(),
            content_type: metadata.content_type.unwrap_or(content_type),
        })
    }

    async fn download_url(&self, path: &BackendPath) -> BackendResult<String> {
        let url = self.object_url(path);
        tracing::debug!("Resolving download URL for {}", path);
        let request = self.storage_auth(self.client.get(&url)).await;
        let response = Self::check_status(request.send().await?, "Storage metadata").await?;
        let metadata: ObjectMetadata = response.json().await?;

        let token = metadata
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').map(str::trim).find(|t| !t.is_empty()))
            .ok_or_else(|| BackendError::Rejected(format!("No download token for {}", metadata.name)))?;

        Ok(format!("{}?alt=media&token={}", url, token))
    }
}
