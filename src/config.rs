use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::store::StoragePathPolicy;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Rest,
    Memory,
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "rest" => Ok(BackendKind::Rest),
            "memory" => Ok(BackendKind::Memory),
            other => Err(anyhow!("Unknown backend kind: {}", other)),
        }
    }
}

/// Connection parameters of the hosted project. Fixed for the lifetime of the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub api_key: String,
    pub project_id: String,
    pub auth_domain: String,
    pub database_url: String,
    pub storage_bucket: String,
    pub identity_url: String,
    pub storage_url: String,
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Rest,
            api_key: String::new(),
            project_id: "uofthub".to_string(),
            auth_domain: "uofthub.firebaseapp.com".to_string(),
            database_url: "https://uofthub.firebaseio.com".to_string(),
            storage_bucket: "uofthub.appspot.com".to_string(),
            identity_url: "https://identitytoolkit.googleapis.com".to_string(),
            storage_url: "https://firebasestorage.googleapis.com".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub storage_paths: StoragePathPolicy,
    pub featured_count: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { storage_paths: StoragePathPolicy::ByFilename, featured_count: 5 }
    }
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = BackendConfig::default();
        let var = |key: &str, default: String| lookup(key).unwrap_or(default);

        let kind = match lookup("UOFTHUB_BACKEND") {
            Some(value) => value.parse()?,
            None => defaults.kind,
        };
        let storage_paths = match lookup("UOFTHUB_STORAGE_PATHS") {
            Some(value) => value.parse()?,
            None => StoragePathPolicy::ByFilename,
        };

        let config = Self {
            backend: BackendConfig {
                kind,
                api_key: var("UOFTHUB_API_KEY", defaults.api_key),
                project_id: var("UOFTHUB_PROJECT_ID", defaults.project_id),
                auth_domain: var("UOFTHUB_AUTH_DOMAIN", defaults.auth_domain),
                database_url: var("UOFTHUB_DATABASE_URL", defaults.database_url),
                storage_bucket: var("UOFTHUB_STORAGE_BUCKET", defaults.storage_bucket),
                identity_url: var("UOFTHUB_IDENTITY_URL", defaults.identity_url),
                storage_url: var("UOFTHUB_STORAGE_URL", defaults.storage_url),
                request_timeout_secs: lookup("UOFTHUB_REQUEST_TIMEOUT_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.request_timeout_secs),
            },
            store: StoreConfig {
                storage_paths,
                featured_count: lookup("UOFTHUB_FEATURED_COUNT")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
            },
        };

        Ok(config)
    }
}
