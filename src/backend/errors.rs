use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by any backend call.
///
/// Kept `Clone` so the most recent failure can live in store state.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BackendError {
    #[error("{message} ({code})")]
    Auth { code: String, message: String },
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Failed to decode backend response: {0}")]
    Decode(String),
    #[error("Request rejected: {0}")]
    Rejected(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

impl BackendError {
    pub fn auth(code: &str, message: impl Into<String>) -> Self {
        Self::Auth { code: code.to_string(), message: message.into() }
    }

    /// Auth error code (`auth/...`), if this is an auth failure.
    pub fn code(&self) -> Option<&str> {
        match self {
            BackendError::Auth { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Map an Identity Toolkit error message (`EMAIL_EXISTS`, `WEAK_PASSWORD : ...`)
    /// to the auth error codes surfaced to the UI.
    pub fn from_identity_message(message: &str) -> Self {
        let token = message.split([' ', ':']).next().unwrap_or_default();
        let (code, text) = match token {
            "EMAIL_EXISTS" => ("auth/email-already-in-use", "The email address is already in use by another account."),
            "EMAIL_NOT_FOUND" => ("auth/user-not-found", "There is no user record corresponding to this identifier."),
            "INVALID_PASSWORD" => ("auth/wrong-password", "The password is invalid."),
            "INVALID_LOGIN_CREDENTIALS" => ("auth/invalid-credential", "The supplied credentials are invalid."),
            "INVALID_EMAIL" => ("auth/invalid-email", "The email address is badly formatted."),
            "WEAK_PASSWORD" => ("auth/weak-password", "Password should be at least 6 characters."),
            "USER_DISABLED" => ("auth/user-disabled", "The user account has been disabled."),
            "TOO_MANY_ATTEMPTS_TRY_LATER" => ("auth/too-many-requests", "Too many unsuccessful attempts. Try again later."),
            "OPERATION_NOT_ALLOWED" => ("auth/operation-not-allowed", "Password sign-in is disabled for this project."),
            _ => ("auth/internal-error", message),
        };
        Self::auth(code, text)
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            BackendError::Http { status: status.as_u16(), body: err.to_string() }
        } else {
            BackendError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Decode(err.to_string())
    }
}
