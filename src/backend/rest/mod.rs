//! Backend implementation over the hosted service's REST APIs.
//!
//! | Service | Endpoint |
//! |---------|----------|
//! | Auth | `{identity_url}/v1/accounts:signUp`, `accounts:signInWithPassword` |
//! | Database | `{database_url}/<path>.json` (POST push, GET once, PATCH update) |
//! | Storage | `{storage_url}/v0/b/<bucket>/o` (media upload, metadata lookup) |
//!
//! The id token of the current session is attached to database (`?auth=`) and
//! storage (`Authorization: Firebase <token>`) requests.

mod auth;
mod database;
mod storage;

use reqwest::{Client, Response};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{BackendError, BackendResult};
use crate::config::BackendConfig;
use crate::models::Identity;

#[derive(Debug, Clone)]
pub(crate) struct Session {
    pub identity: Identity,
    pub id_token: String,
    #[allow(dead_code)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RestBackend {
    client: Client,
    config: BackendConfig,
    session: Arc<RwLock<Option<Session>>>,
}

impl RestBackend {
    pub fn new(config: &BackendConfig) -> Self {
        let client = Client::builder()
            .user_agent("uofthub-rs/0.1")
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("HTTP client setup failed ({}); falling back to defaults without timeout", e);
                Client::new()
            });

        if config.api_key.is_empty() {
            tracing::warn!("No API key configured (UOFTHUB_API_KEY); sign-up and sign-in will be rejected");
        }

        Self { client, config: config.clone(), session: Arc::new(RwLock::new(None)) }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    async fn id_token(&self) -> Option<String> {
        self.session.read().await.as_ref().map(|s| s.id_token.clone())
    }

    /// Turn a non-success response into a [`BackendError::Http`], logging the body.
    async fn check_status(response: Response, context: &str) -> BackendResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::error!("{} failed - Status: {}, Body: {}", context, status, body);
        Err(BackendError::Http { status: status.as_u16(), body })
    }
}
