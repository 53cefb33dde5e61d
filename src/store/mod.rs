//! The application store.
//!
//! [`Store`] is a cheap-to-clone context object owning the client-side state,
//! the backend handles and the in-flight operation tracker. UI code holds one
//! and calls:
//!
//! - **actions** (`load_file_uploads`, `create_file_upload`, `sign_user_in`, ...)
//!   which talk to the backend and then commit mutations,
//! - **getters** (`loaded_file_uploads`, `featured_file_uploads`, `user`, ...)
//!   which read projections of the current state.
//!
//! Mutations are applied one at a time under the state lock. Concurrent actions
//! are not serialised against each other; overlapping loads resolve
//! last-writer-wins.

mod actions;
mod getters;
pub mod in_flight;
pub mod saga;
pub mod state;

pub use actions::{StoragePathPolicy, FILES_COLLECTION, RATINGS_COLLECTION};
pub use in_flight::{InFlightTracker, OperationInfo, OperationStatus};
pub use saga::{ActionError, ActionKind, PartialWritePolicy, Step};
pub use state::{Mutation, StoreState};

use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::backend::Backend;
use crate::config::StoreConfig;

/// How long finished operations stay queryable through [`Store::tracker`].
const FINISHED_RETENTION_HOURS: i64 = 1;

#[derive(Clone, Debug)]
pub struct Store {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    state: RwLock<StoreState>,
    backend: Backend,
    tracker: InFlightTracker,
    config: StoreConfig,
    revision: watch::Sender<u64>,
}

impl Store {
    pub fn new(backend: Backend, config: StoreConfig) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(StoreState::default()),
                backend,
                tracker: InFlightTracker::new(),
                config,
                revision,
            }),
        }
    }

    pub fn backend(&self) -> &Backend {
        &self.inner.backend
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub fn tracker(&self) -> &InFlightTracker {
        &self.inner.tracker
    }

    /// Receiver that observes a new revision after every committed mutation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    pub async fn commit(&self, mutation: Mutation) {
        let mut state = self.inner.state.write().await;
        self.apply_locked(&mut state, mutation);
    }

    /// Copy of the whole state.
    pub async fn snapshot(&self) -> StoreState {
        self.inner.state.read().await.clone()
    }

    fn apply_locked(&self, state: &mut StoreState, mutation: Mutation) {
        debug!("commit {}", mutation.name());
        state.apply(mutation);
        self.inner.revision.send_modify(|revision| *revision += 1);
    }

    /// Register an action with the tracker and raise the loading flag if it drives it.
    async fn begin(&self, kind: ActionKind, scope: Option<&str>) -> Uuid {
        let mut state = self.inner.state.write().await;
        self.inner.tracker.cleanup_finished(FINISHED_RETENTION_HOURS).await;
        let operation = self.inner.tracker.start(kind, scope.map(str::to_string)).await;
        if kind.tracks_loading() {
            self.apply_locked(&mut state, Mutation::SetLoading(true));
        }
        operation.id
    }

    /// Mark an action finished and recompute the loading flag from what is still running.
    async fn finish(&self, id: Uuid, kind: ActionKind, outcome: Result<(), &ActionError>) {
        let mut state = self.inner.state.write().await;
        match outcome {
            Ok(()) => self.inner.tracker.complete(id).await,
            Err(err) => self.inner.tracker.fail(id, err.to_string()).await,
        }
        if kind.tracks_loading() {
            let loading = self.inner.tracker.is_loading().await;
            self.apply_locked(&mut state, Mutation::SetLoading(loading));
        }
    }
}
