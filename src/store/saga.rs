//! Step bookkeeping for multi-step actions.
//!
//! Every action runs its backend calls as a fixed, fail-fast sequence of
//! [`Step`]s. The first failing step ends the action; steps that already wrote
//! to the backend are handled according to [`PartialWritePolicy`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

use crate::backend::{BackendError, BackendResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    LoadFileUploads,
    LoadRatings,
    CreateFileUpload,
    AddRating,
    SignUp,
    SignIn,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::LoadFileUploads => "load_file_uploads",
            ActionKind::LoadRatings => "load_ratings",
            ActionKind::CreateFileUpload => "create_file_upload",
            ActionKind::AddRating => "add_rating",
            ActionKind::SignUp => "sign_user_up",
            ActionKind::SignIn => "sign_user_in",
        }
    }

    /// Whether the action drives the store's loading flag.
    pub fn tracks_loading(&self) -> bool {
        matches!(
            self,
            ActionKind::LoadFileUploads | ActionKind::LoadRatings | ActionKind::SignUp | ActionKind::SignIn
        )
    }

    /// Whether failures are surfaced through the store's error field.
    ///
    /// Only authentication failures are; data actions just log.
    pub fn surfaces_errors(&self) -> bool {
        matches!(self, ActionKind::SignUp | ActionKind::SignIn)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Validate,
    Authenticate,
    ReadSnapshot,
    DecodeSnapshot,
    PushRecord,
    UploadBinary,
    ResolveUrl,
    PatchRecord,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Validate => "validate",
            Step::Authenticate => "authenticate",
            Step::ReadSnapshot => "read_snapshot",
            Step::DecodeSnapshot => "decode_snapshot",
            Step::PushRecord => "push_record",
            Step::UploadBinary => "upload_binary",
            Step::ResolveUrl => "resolve_url",
            Step::PatchRecord => "patch_record",
        }
    }

    /// Whether completing this step leaves data behind on the backend.
    pub fn writes_remotely(&self) -> bool {
        matches!(self, Step::PushRecord | Step::UploadBinary | Step::PatchRecord)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens to remote writes of earlier steps when a later step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartialWritePolicy {
    /// Nothing is rolled back; earlier writes stay on the backend as they are.
    #[default]
    LeaveOrphaned,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{action} failed at {step}: {source}")]
pub struct ActionError {
    pub action: ActionKind,
    pub step: Step,
    #[source]
    pub source: BackendError,
}

impl ActionError {
    pub fn new(action: ActionKind, step: Step, source: BackendError) -> Self {
        Self { action, step, source }
    }

    pub fn backend_error(&self) -> &BackendError {
        &self.source
    }
}

/// Runs the steps of one action and remembers which ones completed.
#[derive(Debug)]
pub(crate) struct StepLog {
    action: ActionKind,
    policy: PartialWritePolicy,
    completed: Vec<Step>,
}

impl StepLog {
    pub fn new(action: ActionKind) -> Self {
        Self { action, policy: PartialWritePolicy::default(), completed: Vec::new() }
    }

    /// Record the outcome of `step`, turning a failure into an [`ActionError`].
    pub fn run<T>(&mut self, step: Step, result: BackendResult<T>) -> Result<T, ActionError> {
        match result {
            Ok(value) => {
                self.completed.push(step);
                Ok(value)
            }
            Err(source) => {
                let err = ActionError::new(self.action, step, source);
                self.abandon(&err);
                Err(err)
            }
        }
    }

    pub fn completed(&self) -> &[Step] {
        &self.completed
    }

    fn abandon(&self, err: &ActionError) {
        error!("{}", err);
        let orphaned: Vec<&str> = self
            .completed()
            .iter()
            .filter(|step| step.writes_remotely())
            .map(Step::as_str)
            .collect();
        if orphaned.is_empty() {
            return;
        }
        match self.policy {
            PartialWritePolicy::LeaveOrphaned => warn!(
                "{} left remote writes from [{}] in place after failing at {}",
                self.action,
                orphaned.join(", "),
                err.step
            ),
        }
    }
}
