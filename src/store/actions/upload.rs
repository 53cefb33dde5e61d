use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use tracing::info;

use super::FILES_COLLECTION;
use crate::backend::{BackendError, BackendPath};
use crate::models::{FileBlob, FileUpload, NewFileUpload};
use crate::store::saga::{ActionError, ActionKind, Step, StepLog};
use crate::store::{Mutation, Store};

const STORAGE_ROOT: &str = "fileUploads";

/// How the storage location of an uploaded binary is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StoragePathPolicy {
    /// `fileUploads/<classname>/<filename>`. Two uploads with the same filename
    /// in one class share the object; the later upload overwrites the earlier.
    #[default]
    #[serde(rename = "filename")]
    ByFilename,
    /// `fileUploads/<classname>/<record key><ext>`, unique per record.
    #[serde(rename = "record-id")]
    ByRecordId,
}

impl StoragePathPolicy {
    pub fn object_path(&self, classname: &str, record_key: &str, image: &FileBlob) -> BackendPath {
        let folder = BackendPath::new(STORAGE_ROOT).child(classname);
        match self {
            StoragePathPolicy::ByFilename => folder.child(&image.name),
            StoragePathPolicy::ByRecordId => {
                folder.child(&format!("{}{}", record_key, image.extension().unwrap_or_default()))
            }
        }
    }
}

impl FromStr for StoragePathPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "filename" => Ok(StoragePathPolicy::ByFilename),
            "record-id" | "record_id" => Ok(StoragePathPolicy::ByRecordId),
            other => Err(anyhow!("Unknown storage path policy: {}", other)),
        }
    }
}

impl Store {
    /// Create an upload: push the record, store the binary, resolve its URL,
    /// patch the URL onto the record, then append the result locally.
    ///
    /// Nothing is committed locally unless all four steps succeed. Remote writes
    /// made before a failing step are left in place.
    pub async fn create_file_upload(&self, upload: NewFileUpload) -> Result<FileUpload, ActionError> {
        let kind = ActionKind::CreateFileUpload;
        let id = self.begin(kind, Some(&upload.classname)).await;

        match self.run_upload_steps(&upload).await {
            Ok(created) => {
                self.commit(Mutation::CreateFileUpload(created.clone())).await;
                self.finish(id, kind, Ok(())).await;
                info!("Created file upload {} ({}) in {}", created.id, created.filename, created.classname);
                Ok(created)
            }
            Err(err) => {
                self.finish(id, kind, Err(&err)).await;
                Err(err)
            }
        }
    }

    async fn run_upload_steps(&self, upload: &NewFileUpload) -> Result<FileUpload, ActionError> {
        let kind = ActionKind::CreateFileUpload;
        let backend = self.backend();
        let collection = BackendPath::new(&upload.classname).child(FILES_COLLECTION);
        let record = upload.to_record();
        let body = serde_json::to_value(&record)
            .map_err(|e| ActionError::new(kind, Step::PushRecord, BackendError::from(e)))?;

        let mut steps = StepLog::new(kind);

        let key = steps.run(Step::PushRecord, backend.database.push(&collection, body).await)?;

        let object_path = self
            .config()
            .storage_paths
            .object_path(&upload.classname, &key, &upload.image);
        let stored = steps.run(Step::UploadBinary, backend.storage.put(&object_path, &upload.image).await)?;

        let image_url = steps.run(Step::ResolveUrl, backend.storage.download_url(&stored.path).await)?;

        steps.run(
            Step::PatchRecord,
            backend
                .database
                .update(&collection.child(&key), json!({ "imageUrl": image_url }))
                .await,
        )?;

        Ok(record.into_upload(key, Some(image_url)))
    }
}
