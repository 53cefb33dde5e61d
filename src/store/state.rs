use serde::{Deserialize, Serialize};

use crate::backend::BackendError;
use crate::models::{FileUpload, Rating, User};

/// Client-side state held by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreState {
    pub loaded_file_uploads: Vec<FileUpload>,
    pub loaded_ratings: Vec<Rating>,
    pub user: Option<User>,
    pub loading: bool,
    pub error: Option<BackendError>,
}

/// Synchronous state transitions. Applying one never fails and touches only its own field.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    SetLoadedFileUploads(Vec<FileUpload>),
    SetLoadedRatings(Vec<Rating>),
    CreateFileUpload(FileUpload),
    AddRating(Rating),
    SetUser(Option<User>),
    SetLoading(bool),
    SetError(BackendError),
    ClearError,
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::SetLoadedFileUploads(_) => "set_loaded_file_uploads",
            Mutation::SetLoadedRatings(_) => "set_loaded_ratings",
            Mutation::CreateFileUpload(_) => "create_file_upload",
            Mutation::AddRating(_) => "add_rating",
            Mutation::SetUser(_) => "set_user",
            Mutation::SetLoading(_) => "set_loading",
            Mutation::SetError(_) => "set_error",
            Mutation::ClearError => "clear_error",
        }
    }
}

impl StoreState {
    pub fn apply(&mut self, mutation: Mutation) {
        match mutation {
            Mutation::SetLoadedFileUploads(uploads) => self.loaded_file_uploads = uploads,
            Mutation::SetLoadedRatings(ratings) => self.loaded_ratings = ratings,
            Mutation::CreateFileUpload(upload) => self.loaded_file_uploads.push(upload),
            Mutation::AddRating(rating) => self.loaded_ratings.push(rating),
            Mutation::SetUser(user) => self.user = user,
            Mutation::SetLoading(loading) => self.loading = loading,
            Mutation::SetError(error) => self.error = Some(error),
            Mutation::ClearError => self.error = None,
        }
    }

    /// Consuming form of [`StoreState::apply`].
    pub fn with(mut self, mutation: Mutation) -> Self {
        self.apply(mutation);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(id: &str) -> FileUpload {
        FileUpload {
            id: id.to_string(),
            upload_type: "notes".to_string(),
            description: String::new(),
            image_url: None,
            date: "2020-01-01T00:00:00.000Z".to_string(),
            filename: format!("{}.pdf", id),
            classname: "c1".to_string(),
        }
    }

    fn rating(id: &str) -> Rating {
        Rating {
            id: id.to_string(),
            rate: 4.0,
            comment: "ok".to_string(),
            time: "2020-01-01T00:00:00.000Z".to_string(),
            user: "u1".to_string(),
            classname: "c1".to_string(),
        }
    }

    fn populated() -> StoreState {
        StoreState {
            loaded_file_uploads: vec![upload("a")],
            loaded_ratings: vec![rating("r")],
            user: Some(User::new("u1")),
            loading: true,
            error: Some(BackendError::Network("down".to_string())),
        }
    }

    #[test]
    fn test_each_mutation_only_touches_its_field() {
        let before = populated();

        let after = before.clone().with(Mutation::SetLoadedFileUploads(vec![upload("b")]));
        assert_eq!(after.loaded_file_uploads, vec![upload("b")]);
        assert_eq!(StoreState { loaded_file_uploads: before.loaded_file_uploads.clone(), ..after }, before);

        let after = before.clone().with(Mutation::SetLoadedRatings(vec![]));
        assert!(after.loaded_ratings.is_empty());
        assert_eq!(StoreState { loaded_ratings: before.loaded_ratings.clone(), ..after }, before);

        let after = before.clone().with(Mutation::CreateFileUpload(upload("b")));
        assert_eq!(after.loaded_file_uploads, vec![upload("a"), upload("b")]);
        assert_eq!(StoreState { loaded_file_uploads: before.loaded_file_uploads.clone(), ..after }, before);

        let after = before.clone().with(Mutation::AddRating(rating("s")));
        assert_eq!(after.loaded_ratings.len(), 2);
        assert_eq!(StoreState { loaded_ratings: before.loaded_ratings.clone(), ..after }, before);

        let after = before.clone().with(Mutation::SetUser(None));
        assert!(after.user.is_none());
        assert_eq!(StoreState { user: before.user.clone(), ..after }, before);

        let after = before.clone().with(Mutation::SetLoading(false));
        assert!(!after.loading);
        assert_eq!(StoreState { loading: true, ..after }, before);

        let after = before.clone().with(Mutation::SetError(BackendError::Decode("x".to_string())));
        assert_eq!(after.error, Some(BackendError::Decode("x".to_string())));
        assert_eq!(StoreState { error: before.error.clone(), ..after }, before);

        let after = before.clone().with(Mutation::ClearError);
        assert!(after.error.is_none());
        assert_eq!(StoreState { error: before.error.clone(), ..after }, before);
    }

    #[test]
    fn test_set_error_overwrites_previous() {
        let state = StoreState::default()
            .with(Mutation::SetError(BackendError::Network("first".to_string())))
            .with(Mutation::SetError(BackendError::Network("second".to_string())));
        assert_eq!(state.error, Some(BackendError::Network("second".to_string())));
    }
}
