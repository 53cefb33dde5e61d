use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::saga::ActionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationInfo {
    pub id: Uuid,
    pub kind: ActionKind,
    /// Collection scope or classname the action works on
    pub scope: Option<String>,
    pub status: OperationStatus,
    pub error_message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl OperationInfo {
    pub fn new(kind: ActionKind, scope: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kind,
            scope,
            status: OperationStatus::Running,
            error_message: None,
            started_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == OperationStatus::Running
    }

    pub fn complete(&mut self) {
        self.status = OperationStatus::Completed;
        self.completed_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }

    pub fn set_error(&mut self, error_message: String) {
        self.error_message = Some(error_message);
        self.status = OperationStatus::Failed;
        self.completed_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }
}

/// Set of store actions keyed by operation id.
///
/// The loading flag is derived from this set rather than toggled by each
/// action, so overlapping actions cannot clear it for each other.
#[derive(Debug, Clone, Default)]
pub struct InFlightTracker {
    operations: Arc<RwLock<HashMap<Uuid, OperationInfo>>>,
}

impl InFlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn start(&self, kind: ActionKind, scope: Option<String>) -> OperationInfo {
        let operation = OperationInfo::new(kind, scope);
        let mut map = self.operations.write().await;
        map.insert(operation.id, operation.clone());
        operation
    }

    pub async fn complete(&self, id: Uuid) {
        let mut map = self.operations.write().await;
        if let Some(operation) = map.get_mut(&id) {
            operation.complete();
        }
    }

    pub async fn fail(&self, id: Uuid, error_message: String) {
        let mut map = self.operations.write().await;
        if let Some(operation) = map.get_mut(&id) {
            operation.set_error(error_message);
        }
    }

    pub async fn get(&self, id: Uuid) -> Option<OperationInfo> {
        let map = self.operations.read().await;
        map.get(&id).cloned()
    }

    pub async fn active(&self) -> Vec<OperationInfo> {
        let map = self.operations.read().await;
        let mut active: Vec<OperationInfo> = map.values().filter(|op| op.is_running()).cloned().collect();
        active.sort_by_key(|op| op.started_at);
        active
    }

    /// True while any loading-kind action is still running.
    pub async fn is_loading(&self) -> bool {
        let map = self.operations.read().await;
        map.values().any(|op| op.is_running() && op.kind.tracks_loading())
    }

    pub async fn is_running(&self, kind: ActionKind) -> bool {
        let map = self.operations.read().await;
        map.values().any(|op| op.is_running() && op.kind == kind)
    }

    /// Drop finished operations older than `hours`; running ones are always kept.
    pub async fn cleanup_finished(&self, hours: i64) {
        let cutoff = if hours == 0 {
            // Small buffer so just-finished operations survive
            Utc::now() - chrono::Duration::seconds(5)
        } else {
            Utc::now() - chrono::Duration::hours(hours)
        };
        let mut map = self.operations.write().await;
        map.retain(|_, op| match op.status {
            OperationStatus::Running => true,
            OperationStatus::Completed | OperationStatus::Failed => {
                op.completed_at.is_none_or(|completed| completed > cutoff)
            }
        });
    }

    pub async fn len(&self) -> usize {
        self.operations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.operations.read().await.is_empty()
    }
}
