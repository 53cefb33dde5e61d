use super::{Store, StoreState};
use crate::backend::BackendError;
use crate::models::{FileUpload, Rating, User};

impl StoreState {
    /// The first `count` uploads, in list order.
    pub fn featured_file_uploads(&self, count: usize) -> &[FileUpload] {
        let end = count.min(self.loaded_file_uploads.len());
        &self.loaded_file_uploads[..end]
    }

    pub fn loaded_file_upload(&self, id: &str) -> Option<&FileUpload> {
        self.loaded_file_uploads.iter().find(|upload| upload.id == id)
    }
}

impl Store {
    pub async fn loaded_file_uploads(&self) -> Vec<FileUpload> {
        self.inner.state.read().await.loaded_file_uploads.clone()
    }

    pub async fn featured_file_uploads(&self) -> Vec<FileUpload> {
        let state = self.inner.state.read().await;
        state.featured_file_uploads(self.inner.config.featured_count).to_vec()
    }

    pub async fn loaded_file_upload(&self, id: &str) -> Option<FileUpload> {
        self.inner.state.read().await.loaded_file_upload(id).cloned()
    }

    pub async fn loaded_ratings(&self) -> Vec<Rating> {
        self.inner.state.read().await.loaded_ratings.clone()
    }

    pub async fn user(&self) -> Option<User> {
        self.inner.state.read().await.user.clone()
    }

    pub async fn loading(&self) -> bool {
        self.inner.state.read().await.loading
    }

    pub async fn error(&self) -> Option<BackendError> {
        self.inner.state.read().await.error.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(ids: &[&str]) -> StoreState {
        StoreState {
            loaded_file_uploads: ids
                .iter()
                .map(|id| FileUpload {
                    id: id.to_string(),
                    upload_type: "notes".to_string(),
                    description: String::new(),
                    image_url: None,
                    date: String::new(),
                    filename: String::new(),
                    classname: String::new(),
                })
                .collect(),
            ..StoreState::default()
        }
    }

    fn ids(uploads: &[FileUpload]) -> Vec<&str> {
        uploads.iter().map(|u| u.id.as_str()).collect()
    }

    #[test]
    fn test_featured_takes_first_five_in_order() {
        let state = state_with(&["a", "b", "c", "d", "e", "f", "g"]);
        assert_eq!(ids(state.featured_file_uploads(5)), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_featured_with_fewer_entries() {
        assert_eq!(ids(state_with(&["a", "b"]).featured_file_uploads(5)), vec!["a", "b"]);
        assert!(state_with(&[]).featured_file_uploads(5).is_empty());
    }

    #[test]
    fn test_lookup_by_id() {
        let state = state_with(&["a", "b"]);
        assert_eq!(state.loaded_file_upload("b").map(|u| u.id.as_str()), Some("b"));
        assert!(state.loaded_file_upload("zzz").is_none());
    }
}
