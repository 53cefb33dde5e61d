//! Application bootstrap: one-time wiring of configuration, backend and store.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::backend::{Backend, MemoryBackend, RestBackend};
use crate::config::{AppConfig, BackendConfig, BackendKind};
use crate::store::Store;

/// Everything the UI layer needs, created once per process.
#[derive(Debug, Clone)]
pub struct App {
    pub config: Arc<AppConfig>,
    pub store: Store,
}

impl App {
    /// Connect to the configured backend, build the store and restore any existing session.
    ///
    /// The REST backend keeps its session in memory only, so a fresh process
    /// always starts signed out there. Restoration only takes effect when the
    /// backend handed to [`App::with_backend`] already holds a session.
    pub async fn bootstrap(config: AppConfig) -> Result<Self> {
        let backend = connect(&config.backend);
        let app = Self::with_backend(config, backend);

        match app.store.restore_session().await {
            Some(user) => info!("Session restored for user {}", user.id),
            None => info!("No existing session"),
        }

        Ok(app)
    }

    pub fn with_backend(config: AppConfig, backend: Backend) -> Self {
        let store = Store::new(backend, config.store.clone());
        Self { config: Arc::new(config), store }
    }
}

/// Build the backend selected by the configuration.
pub fn connect(config: &BackendConfig) -> Backend {
    match config.kind {
        BackendKind::Rest => {
            info!(
                "Connecting to project {} (database {}, bucket {})",
                config.project_id, config.database_url, config.storage_bucket
            );
            Backend::from_shared(Arc::new(RestBackend::new(config)))
        }
        BackendKind::Memory => {
            info!("Using in-memory backend");
            Backend::from_shared(Arc::new(MemoryBackend::new()))
        }
    }
}
