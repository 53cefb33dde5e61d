use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

use super::{AuthBackend, BackendError, BackendPath, BackendResult, DatabaseBackend, StorageBackend, StoredObject};
use crate::models::{FileBlob, Identity};

/// Backend call kinds, used for failure injection and call recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateUser,
    SignIn,
    SignOut,
    Push,
    Once,
    Update,
    Put,
    DownloadUrl,
}

#[derive(Debug, Clone)]
struct MemoryAccount {
    uid: String,
    password: String,
}

#[derive(Debug, Default)]
struct MemoryState {
    tree: Map<String, Value>,
    objects: BTreeMap<BackendPath, FileBlob>,
    accounts: HashMap<String, MemoryAccount>,
    session: Option<Identity>,
    failures: HashMap<Operation, VecDeque<BackendError>>,
    push_keys: VecDeque<String>,
    key_counter: u64,
    uid_counter: u64,
    calls: Vec<Operation>,
}

impl MemoryState {
    /// Record the call and hand back an injected failure, if one is queued.
    fn enter(&mut self, operation: Operation) -> BackendResult<()> {
        self.calls.push(operation);
        match self.failures.get_mut(&operation).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn next_push_key(&mut self) -> String {
        if let Some(key) = self.push_keys.pop_front() {
            return key;
        }
        self.key_counter += 1;
        // Zero padded so lexicographic order matches creation order
        format!("-M{:012}", self.key_counter)
    }

    fn value_at(&self, path: &BackendPath) -> Option<&Value> {
        let mut segments = path.segments().iter();
        let first = match segments.next() {
            Some(first) => first,
            None => return None,
        };
        let mut current = self.tree.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Object at `path`, creating (or replacing non-object values with) empty objects on the way.
    fn object_at_mut(&mut self, path: &BackendPath) -> &mut Map<String, Value> {
        let mut current = &mut self.tree;
        for segment in path.segments() {
            let entry = current
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = match entry {
                Value::Object(map) => map,
                _ => unreachable!("entry was just made an object"),
            };
        }
        current
    }
}

/// In-process backend with ordered push keys, failure injection and read gates.
///
/// Used by the test suite and for offline runs (`UOFTHUB_BACKEND=memory`).
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
    read_gates: Arc<Mutex<HashMap<BackendPath, Arc<Notify>>>>,
}

/// Holds `once` reads of one path until released.
#[derive(Debug)]
pub struct ReadGate {
    path: BackendPath,
    notify: Arc<Notify>,
    gates: Arc<Mutex<HashMap<BackendPath, Arc<Notify>>>>,
}

impl ReadGate {
    pub async fn release(self) {
        self.gates.lock().await.remove(&self.path);
        self.notify.notify_one();
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the subtree at `path` with `value`.
    pub async fn seed(&self, path: &str, value: Value) {
        let path = BackendPath::new(path);
        let mut state = self.state.lock().await;
        let Some((last, parent)) = path.segments().split_last() else {
            if let Value::Object(map) = value {
                state.tree = map;
            }
            return;
        };
        let parent = BackendPath::new(&parent.join("/"));
        state.object_at_mut(&parent).insert(last.clone(), value);
    }

    pub async fn value_at(&self, path: &str) -> Value {
        let state = self.state.lock().await;
        state.value_at(&BackendPath::new(path)).cloned().unwrap_or(Value::Null)
    }

    pub async fn object(&self, path: &str) -> Option<FileBlob> {
        self.state.lock().await.objects.get(&BackendPath::new(path)).cloned()
    }

    pub async fn object_count(&self) -> usize {
        self.state.lock().await.objects.len()
    }

    pub async fn register_account(&self, email: &str, password: &str) -> Identity {
        let mut state = self.state.lock().await;
        state.uid_counter += 1;
        let uid = format!("uid-{}", state.uid_counter);
        state.accounts.insert(
            email.to_string(),
            MemoryAccount { uid: uid.clone(), password: password.to_string() },
        );
        Identity { uid, email: Some(email.to_string()) }
    }

    /// Pretend a previous session is still active.
    pub async fn set_session(&self, identity: Option<Identity>) {
        self.state.lock().await.session = identity;
    }

    /// Make the next call of `operation` fail with `error`. Queued failures are consumed in order.
    pub async fn fail_next(&self, operation: Operation, error: BackendError) {
        self.state
            .lock()
            .await
            .failures
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// Keys to hand out for the next pushes, before falling back to generated ones.
    pub async fn queue_push_keys<I, S>(&self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.state.lock().await;
        state.push_keys.extend(keys.into_iter().map(Into::into));
    }

    /// Every backend call made so far, in order.
    pub async fn calls(&self) -> Vec<Operation> {
        self.state.lock().await.calls.clone()
    }

    /// Block `once` reads of `path` until the returned gate is released.
    pub async fn hold_reads(&self, path: &str) -> ReadGate {
        let path = BackendPath::new(path);
        let notify = Arc::new(Notify::new());
        self.read_gates.lock().await.insert(path.clone(), notify.clone());
        ReadGate { path, notify, gates: self.read_gates.clone() }
    }

    async fn wait_for_gate(&self, path: &BackendPath) {
        let gate = self.read_gates.lock().await.get(path).cloned();
        if let Some(notify) = gate {
            tracing::debug!("Read of {} held by gate", path);
            notify.notified().await;
        }
    }
}

#[async_trait]
impl AuthBackend for MemoryBackend {
    async fn create_user(&self, email: &str, password: &str) -> BackendResult<Identity> {
        let mut state = self.state.lock().await;
        state.enter(Operation::CreateUser)?;
        if state.accounts.contains_key(email) {
            return Err(BackendError::from_identity_message("EMAIL_EXISTS"));
        }
        state.uid_counter += 1;
        let uid = format!("uid-{}", state.uid_counter);
        state.accounts.insert(
            email.to_string(),
            MemoryAccount { uid: uid.clone(), password: password.to_string() },
        );
        let identity = Identity { uid, email: Some(email.to_string()) };
        state.session = Some(identity.clone());
        Ok(identity)
    }

    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<Identity> {
        let mut state = self.state.lock().await;
        state.enter(Operation::SignIn)?;
        let account = state
            .accounts
            .get(email)
            .cloned()
            .ok_or_else(|| BackendError::from_identity_message("EMAIL_NOT_FOUND"))?;
        if account.password != password {
            return Err(BackendError::from_identity_message("INVALID_PASSWORD"));
        }
        let identity = Identity { uid: account.uid, email: Some(email.to_string()) };
        state.session = Some(identity.clone());
        Ok(identity)
    }

    async fn sign_out(&self) -> BackendResult<()> {
        let mut state = self.state.lock().await;
        state.enter(Operation::SignOut)?;
        state.session = None;
        Ok(())
    }

    async fn current_identity(&self) -> Option<Identity> {
        self.state.lock().await.session.clone()
    }
}

#[async_trait]
impl DatabaseBackend for MemoryBackend {
    async fn push(&self, path: &BackendPath, value: Value) -> BackendResult<String> {
        let mut state = self.state.lock().await;
        state.enter(Operation::Push)?;
        let key = state.next_push_key();
        state.object_at_mut(path).insert(key.clone(), value);
        Ok(key)
    }

    async fn once(&self, path: &BackendPath) -> BackendResult<Value> {
        self.state.lock().await.enter(Operation::Once)?;
        self.wait_for_gate(path).await;
        let state = self.state.lock().await;
        Ok(state.value_at(path).cloned().unwrap_or(Value::Null))
    }

    async fn update(&self, path: &BackendPath, fields: Value) -> BackendResult<()> {
        let mut state = self.state.lock().await;
        state.enter(Operation::Update)?;
        let Value::Object(fields) = fields else {
            return Err(BackendError::Rejected("update expects an object of fields".to_string()));
        };
        let target = state.object_at_mut(path);
        for (field, value) in fields {
            target.insert(field, value);
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn put(&self, path: &BackendPath, blob: &FileBlob) -> BackendResult<StoredObject> {
        let mut state = self.state.lock().await;
        state.enter(Operation::Put)?;
        let content_type = blob.resolved_content_type();
        let stored = FileBlob {
            name: blob.name.clone(),
            content_type: Some(content_type.clone()),
            bytes: blob.bytes.clone(),
        };
        state.objects.insert(path.clone(), stored);
        Ok(StoredObject { path: path.clone(), size: blob.bytes.len(), content_type })
    }

    async fn download_url(&self, path: &BackendPath) -> BackendResult<String> {
        let mut state = self.state.lock().await;
        state.enter(Operation::DownloadUrl)?;
        if !state.objects.contains_key(path) {
            return Err(BackendError::Rejected(format!("storage/object-not-found: {}", path)));
        }
        Ok(format!("memory://{}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_push_keys_sort_in_creation_order() {
        let backend = MemoryBackend::new();
        let path = BackendPath::new("c1/files");
        let first = backend.push(&path, json!({"n": 1})).await.unwrap();
        let second = backend.push(&path, json!({"n": 2})).await.unwrap();
        assert!(first < second);

        let snapshot = backend.once(&path).await.unwrap();
        let keys: Vec<&String> = snapshot.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec![&first, &second]);
    }

    #[tokio::test]
    async fn test_once_on_missing_path_is_null() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.once(&BackendPath::new("nope/files")).await.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let backend = MemoryBackend::new();
        backend.seed("c1/files/k1", json!({"filename": "a.pdf"})).await;
        backend
            .update(&BackendPath::new("c1/files/k1"), json!({"imageUrl": "memory://x"}))
            .await
            .unwrap();
        assert_eq!(
            backend.value_at("c1/files/k1").await,
            json!({"filename": "a.pdf", "imageUrl": "memory://x"})
        );
    }

    #[tokio::test]
    async fn test_injected_failure_is_consumed_once() {
        let backend = MemoryBackend::new();
        backend.fail_next(Operation::Push, BackendError::Network("offline".to_string())).await;
        let path = BackendPath::new("c1/rating");
        assert!(backend.push(&path, json!({})).await.is_err());
        assert!(backend.push(&path, json!({})).await.is_ok());
        assert_eq!(backend.calls().await, vec![Operation::Push, Operation::Push]);
    }

    #[tokio::test]
    async fn test_accounts_and_sessions() {
        let backend = MemoryBackend::new();
        let created = backend.create_user("a@b.ca", "secret1").await.unwrap();
        assert_eq!(backend.current_identity().await, Some(created.clone()));

        let duplicate = backend.create_user("a@b.ca", "secret1").await.unwrap_err();
        assert_eq!(duplicate.code(), Some("auth/email-already-in-use"));

        backend.sign_out().await.unwrap();
        assert!(backend.current_identity().await.is_none());

        let wrong = backend.sign_in("a@b.ca", "nope").await.unwrap_err();
        assert_eq!(wrong.code(), Some("auth/wrong-password"));
        let signed_in = backend.sign_in("a@b.ca", "secret1").await.unwrap();
        assert_eq!(signed_in.uid, created.uid);
    }

    #[tokio::test]
    async fn test_storage_put_and_url() {
        let backend = MemoryBackend::new();
        let path = BackendPath::new("fileUploads/c1/a.png");
        assert!(backend.download_url(&path).await.is_err());

        let stored = backend.put(&path, &FileBlob::new("a.png", vec![1, 2])).await.unwrap();
        assert_eq!(stored.size, 2);
        assert_eq!(stored.content_type, "image/png");
        assert_eq!(backend.download_url(&path).await.unwrap(), "memory://fileUploads/c1/a.png");
    }

    #[tokio::test]
    async fn test_read_gate_holds_until_released() {
        let backend = MemoryBackend::new();
        backend.seed("c1/files", json!({"k": {"filename": "a"}})).await;
        let gate = backend.hold_reads("c1/files").await;

        let reader = {
            let backend = backend.clone();
            tokio::spawn(async move { backend.once(&BackendPath::new("c1/files")).await })
        };
        tokio::task::yield_now().await;
        assert!(!reader.is_finished());

        gate.release().await;
        let value = reader.await.unwrap().unwrap();
        assert_eq!(value["k"]["filename"], "a");
    }
}
