use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{RestBackend, Session};
use crate::backend::{AuthBackend, BackendError, BackendResult};
use crate::models::Identity;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    email: Option<String>,
    id_token: String,
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdentityErrorBody {
    error: IdentityError,
}

#[derive(Debug, Deserialize)]
struct IdentityError {
    message: String,
}

impl RestBackend {
    async fn password_call(&self, method: &str, email: &str, password: &str) -> BackendResult<Identity> {
        let url = format!(
            "{}/v1/accounts:{}?key={}",
            self.config.identity_url.trim_end_matches('/'),
            method,
            self.config.api_key
        );

        tracing::debug!("Calling identity endpoint accounts:{}", method);
        let response = self
            .client
            .post(&url)
            .json(&PasswordRequest { email, password, return_secure_token: true })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Identity errors carry a machine readable message; anything else is surfaced raw
            return Err(match serde_json::from_str::<IdentityErrorBody>(&body) {
                Ok(parsed) => BackendError::from_identity_message(&parsed.error.message),
                Err(_) => BackendError::Http { status: status.as_u16(), body },
            });
        }

        let payload: PasswordResponse = response.json().await?;
        let identity = Identity { uid: payload.local_id, email: payload.email };
        *self.session.write().await = Some(Session {
            identity: identity.clone(),
            id_token: payload.id_token,
            refresh_token: payload.refresh_token,
        });
        Ok(identity)
    }
}

#[async_trait]
impl AuthBackend for RestBackend {
    async fn create_user(&self, email: &str, password: &str) -> BackendResult<Identity> {
        self.password_call("signUp", email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<Identity> {
        self.password_call("signInWithPassword", email, password).await
    }

    async fn sign_out(&self) -> BackendResult<()> {
        // Id tokens are stateless; dropping the session is the whole sign-out
        *self.session.write().await = None;
        Ok(())
    }

    async fn current_identity(&self) -> Option<Identity> {
        self.session.read().await.as_ref().map(|s| s.identity.clone())
    }
}
