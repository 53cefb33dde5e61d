use tracing::{info, warn};
use validator::{Validate, ValidationErrors};

use crate::backend::{BackendError, BackendResult};
use crate::models::{Credentials, Identity, User};
use crate::store::saga::{ActionError, ActionKind, Step, StepLog};
use crate::store::{Mutation, Store};

/// Express a credential validation failure with the code the backend would have used.
fn validation_error(errors: &ValidationErrors) -> BackendError {
    if errors.field_errors().contains_key("email") {
        BackendError::from_identity_message("INVALID_EMAIL")
    } else {
        BackendError::from_identity_message("WEAK_PASSWORD")
    }
}

impl Store {
    /// Create an account and make it the current user.
    ///
    /// Failures land in the store's error field and clear the loading flag.
    pub async fn sign_user_up(&self, credentials: Credentials) -> Result<User, ActionError> {
        self.authenticate(ActionKind::SignUp, credentials).await
    }

    pub async fn sign_user_in(&self, credentials: Credentials) -> Result<User, ActionError> {
        self.authenticate(ActionKind::SignIn, credentials).await
    }

    /// Adopt an identity the backend already authenticated. No network call.
    pub async fn auto_sign_in(&self, identity: &Identity) -> User {
        let user = User::from(identity);
        self.commit(Mutation::SetUser(Some(user.clone()))).await;
        user
    }

    /// Dispatch [`Store::auto_sign_in`] if the backend still holds a session.
    pub async fn restore_session(&self) -> Option<User> {
        let identity = self.backend().auth.current_identity().await?;
        info!("Restoring session for {}", identity.uid);
        Some(self.auto_sign_in(&identity).await)
    }

    /// Clear the current user right away, then end the backend session.
    ///
    /// A sign-out failure is only logged. The backend call finishes before this
    /// returns so it cannot drop a session created by a later sign-in.
    pub async fn logout(&self) {
        self.commit(Mutation::SetUser(None)).await;
        if let Err(e) = self.backend().auth.sign_out().await {
            warn!("Backend sign-out failed: {}", e);
        }
    }

    pub async fn clear_error(&self) {
        self.commit(Mutation::ClearError).await;
    }

    async fn authenticate(&self, kind: ActionKind, credentials: Credentials) -> Result<User, ActionError> {
        let id = self.begin(kind, None).await;
        self.commit(Mutation::ClearError).await;

        match self.call_auth(kind, &credentials).await {
            Ok(identity) => {
                self.finish(id, kind, Ok(())).await;
                let user = User::from(&identity);
                self.commit(Mutation::SetUser(Some(user.clone()))).await;
                info!("{} succeeded for {}", kind, user.id);
                Ok(user)
            }
            Err(err) => {
                self.finish(id, kind, Err(&err)).await;
                if kind.surfaces_errors() {
                    self.commit(Mutation::SetError(err.backend_error().clone())).await;
                }
                Err(err)
            }
        }
    }

    async fn call_auth(&self, kind: ActionKind, credentials: &Credentials) -> Result<Identity, ActionError> {
        let mut steps = StepLog::new(kind);
        let validated: BackendResult<()> = credentials.validate().map_err(|e| validation_error(&e));
        steps.run(Step::Validate, validated)?;

        let auth = &self.backend().auth;
        let result = match kind {
            ActionKind::SignUp => auth.create_user(&credentials.email, &credentials.password).await,
            _ => auth.sign_in(&credentials.email, &credentials.password).await,
        };
        steps.run(Step::Authenticate, result)
    }
}
