//! Seams between the store and the hosted backend.
//!
//! The store only depends on the three traits below; [`RestBackend`] talks to the
//! hosted service over HTTP and [`MemoryBackend`] keeps everything in process.

pub mod errors;
pub mod memory;
pub mod rest;

pub use errors::*;
pub use memory::{MemoryBackend, Operation};
pub use rest::RestBackend;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::models::{FileBlob, Identity};

/// Slash-separated location in the database or in object storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BackendPath {
    segments: Vec<String>,
}

impl BackendPath {
    /// Parse a path, ignoring empty segments (`"/a//b/"` is `a/b`).
    pub fn new(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn root() -> Self {
        Self { segments: Vec::new() }
    }

    pub fn child(&self, segment: &str) -> Self {
        let mut path = self.clone();
        path.segments
            .extend(segment.split('/').filter(|s| !s.is_empty()).map(str::to_string));
        path
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for BackendPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

/// A stored binary object.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub path: BackendPath,
    pub size: usize,
    pub content_type: String,
}

#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn create_user(&self, email: &str, password: &str) -> BackendResult<Identity>;
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<Identity>;
    async fn sign_out(&self) -> BackendResult<()>;
    /// Identity of an existing session, if the backend still holds one.
    async fn current_identity(&self) -> Option<Identity>;
}

#[async_trait]
pub trait DatabaseBackend: Send + Sync {
    /// Append `value` as a new child of `path` under a generated key and return the key.
    async fn push(&self, path: &BackendPath, value: Value) -> BackendResult<String>;
    /// One-time snapshot of the subtree at `path` (`Value::Null` when absent).
    async fn once(&self, path: &BackendPath) -> BackendResult<Value>;
    /// Merge `fields` into the object at `path`.
    async fn update(&self, path: &BackendPath, fields: Value) -> BackendResult<()>;
}

#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn put(&self, path: &BackendPath, blob: &FileBlob) -> BackendResult<StoredObject>;
    async fn download_url(&self, path: &BackendPath) -> BackendResult<String>;
}

/// The three backend services the store talks to.
#[derive(Clone)]
pub struct Backend {
    pub auth: Arc<dyn AuthBackend>,
    pub database: Arc<dyn DatabaseBackend>,
    pub storage: Arc<dyn StorageBackend>,
}

impl Backend {
    pub fn new(
        auth: Arc<dyn AuthBackend>,
        database: Arc<dyn DatabaseBackend>,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        Self { auth, database, storage }
    }

    /// Use one implementation for all three services.
    pub fn from_shared<B>(backend: Arc<B>) -> Self
    where
        B: AuthBackend + DatabaseBackend + StorageBackend + 'static,
    {
        Self {
            auth: backend.clone(),
            database: backend.clone(),
            storage: backend,
        }
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_normalization() {
        let path = BackendPath::new("/csc209//files/");
        assert_eq!(path.segments(), &["csc209".to_string(), "files".to_string()]);
        assert_eq!(path.to_string(), "csc209/files");
        assert_eq!(path.child("-k1").to_string(), "csc209/files/-k1");
        assert_eq!(BackendPath::root().child("a/b").to_string(), "a/b");
        assert!(BackendPath::new("").is_root());
    }
}
