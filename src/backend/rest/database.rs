use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::Deserialize;
use serde_json::Value;

use super::RestBackend;
use crate::backend::{BackendPath, BackendResult, DatabaseBackend};

#[derive(Debug, Deserialize)]
struct PushResponse {
    name: String,
}

impl RestBackend {
    fn database_url(&self, path: &BackendPath) -> String {
        let encoded: Vec<String> = path
            .segments()
            .iter()
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!("{}/{}.json", self.config.database_url.trim_end_matches('/'), encoded.join("/"))
    }

    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.id_token().await {
            Some(token) => request.query(&[("auth", token)]),
            None => request,
        }
    }
}

#[async_trait]
impl DatabaseBackend for RestBackend {
    async fn push(&self, path: &BackendPath, value: Value) -> BackendResult<String> {
        let url = self.database_url(path);
        tracing::debug!("POST {}", url);
        let request = self.authorized(self.client.post(&url).json(&value)).await;
        let response = Self::check_status(request.send().await?, "Database push").await?;
        let pushed: PushResponse = response.json().await?;
        Ok(pushed.name)
    }

    async fn once(&self, path: &BackendPath) -> BackendResult<Value> {
        let url = self.database_url(path);
        tracing::debug!("GET {}", url);
        let request = self.authorized(self.client.get(&url)).await;
        let response = Self::check_status(request.send().await?, "Database read").await?;
        Ok(response.json().await?)
    }

    async fn update(&self, path: &BackendPath, fields: Value) -> BackendResult<()> {
        let url = self.database_url(path);
        tracing::debug!("PATCH {}", url);
        let request = self.authorized(self.client.patch(&url).json(&fields)).await;
        Self::check_status(request.send().await?, "Database update").await?;
        Ok(())
    }
}
