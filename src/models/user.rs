use serde::{Deserialize, Serialize};
use validator::Validate;

/// The signed-in user held by the store.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    /// Placeholder, always empty for now
    pub registered_file_uploads: Vec<String>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), registered_file_uploads: Vec::new() }
    }
}

impl From<&Identity> for User {
    fn from(identity: &Identity) -> Self {
        Self::new(identity.uid.clone())
    }
}

/// An authenticated identity as reported by the auth backend.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct Credentials {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_from_identity_has_no_uploads() {
        let identity = Identity { uid: "abc".to_string(), email: Some("a@b.ca".to_string()) };
        let user = User::from(&identity);
        assert_eq!(user.id, "abc");
        assert!(user.registered_file_uploads.is_empty());
    }

    #[test]
    fn test_credentials_validation() {
        assert!(Credentials::new("student@mail.utoronto.ca", "secret1").validate().is_ok());
        assert!(Credentials::new("not-an-email", "secret1").validate().is_err());
        assert!(Credentials::new("student@mail.utoronto.ca", "123").validate().is_err());
    }
}
