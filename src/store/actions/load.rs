use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use super::{FILES_COLLECTION, RATINGS_COLLECTION};
use crate::backend::{BackendError, BackendPath};
use crate::models::{FileUpload, Rating};
use crate::store::saga::{ActionError, ActionKind, Step, StepLog};
use crate::store::{Mutation, Store};

/// Turn a `key -> record` snapshot into records, in the order the backend returned them.
///
/// The key becomes the record's `id`. A `null` snapshot (empty collection) yields
/// no records. Collections keyed by small integers come back as arrays; the index
/// is used as the key and `null` holes are dropped. Children that are not objects,
/// or whose fields do not fit the record type, are skipped.
pub(crate) fn records_from_snapshot<T: DeserializeOwned>(snapshot: Value) -> Result<Vec<T>, BackendError> {
    let entries: Vec<(String, Value)> = match snapshot {
        Value::Null => return Ok(Vec::new()),
        Value::Object(entries) => entries.into_iter().collect(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter(|(_, value)| !value.is_null())
            .map(|(index, value)| (index.to_string(), value))
            .collect(),
        other => {
            return Err(BackendError::Decode(format!("expected an object of records, got {}", other)));
        }
    };

    let mut records = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let Value::Object(mut fields) = value else {
            warn!("Skipping non-object record {}", key);
            continue;
        };
        fields.insert("id".to_string(), Value::String(key.clone()));
        match serde_json::from_value(Value::Object(fields)) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping malformed record {}: {}", key, e),
        }
    }
    Ok(records)
}

impl Store {
    /// Replace the local upload list with a snapshot of `<scope>/files`.
    ///
    /// On failure the list is left as it was and the error field is not touched.
    pub async fn load_file_uploads(&self, scope: &str) -> Result<usize, ActionError> {
        let kind = ActionKind::LoadFileUploads;
        let id = self.begin(kind, Some(scope)).await;

        match self.fetch_collection::<FileUpload>(kind, scope, FILES_COLLECTION).await {
            Ok(uploads) => {
                let count = uploads.len();
                self.commit(Mutation::SetLoadedFileUploads(uploads)).await;
                self.finish(id, kind, Ok(())).await;
                info!("Loaded {} file uploads for {}", count, scope);
                Ok(count)
            }
            Err(err) => {
                self.finish(id, kind, Err(&err)).await;
                Err(err)
            }
        }
    }

    /// Replace the local rating list with a snapshot of `<scope>/rating`.
    pub async fn load_ratings(&self, scope: &str) -> Result<usize, ActionError> {
        let kind = ActionKind::LoadRatings;
        let id = self.begin(kind, Some(scope)).await;

        match self.fetch_collection::<Rating>(kind, scope, RATINGS_COLLECTION).await {
            Ok(ratings) => {
                let count = ratings.len();
                self.commit(Mutation::SetLoadedRatings(ratings)).await;
                self.finish(id, kind, Ok(())).await;
                info!("Loaded {} ratings for {}", count, scope);
                Ok(count)
            }
            Err(err) => {
                self.finish(id, kind, Err(&err)).await;
                Err(err)
            }
        }
    }

    async fn fetch_collection<T: DeserializeOwned>(
        &self,
        kind: ActionKind,
        scope: &str,
        collection: &str,
    ) -> Result<Vec<T>, ActionError> {
        let path = BackendPath::new(scope).child(collection);
        let mut steps = StepLog::new(kind);

        let snapshot = steps.run(Step::ReadSnapshot, self.backend().database.once(&path).await)?;
        steps.run(Step::DecodeSnapshot, records_from_snapshot(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshot_keys_become_ids() {
        let uploads: Vec<FileUpload> = records_from_snapshot(json!({
            "-k1": {"type": "notes", "filename": "a.pdf", "date": "2020-01-01T00:00:00.000Z"},
            "-k2": {"type": "exam", "filename": "b.pdf", "imageUrl": "https://x/b.pdf"}
        }))
        .unwrap();

        assert_eq!(uploads.len(), 2);
        assert_eq!(uploads[0].id, "-k1");
        assert_eq!(uploads[0].image_url, None);
        assert_eq!(uploads[1].id, "-k2");
        assert_eq!(uploads[1].image_url.as_deref(), Some("https://x/b.pdf"));
    }

    #[test]
    fn test_null_snapshot_is_empty() {
        let ratings: Vec<Rating> = records_from_snapshot(Value::Null).unwrap();
        assert!(ratings.is_empty());
    }

    #[test]
    fn test_non_object_children_are_skipped() {
        let ratings: Vec<Rating> =
            records_from_snapshot(json!({"bad": 3, "-r1": {"rate": 5, "user": "u1"}})).unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].id, "-r1");
        assert_eq!(ratings[0].rate, 5.0);
    }

    #[test]
    fn test_mistyped_record_is_skipped() {
        let ratings: Vec<Rating> =
            records_from_snapshot(json!({"-r1": {"rate": 5}, "-r2": {"rate": "4"}})).unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].id, "-r1");
    }

    #[test]
    fn test_array_snapshot_uses_index_as_id() {
        let uploads: Vec<FileUpload> = records_from_snapshot(json!([
            null,
            {"type": "notes", "filename": "a.pdf"},
            null,
            {"type": "exam", "filename": "b.pdf"}
        ]))
        .unwrap();
        let ids: Vec<&str> = uploads.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(uploads[1].filename, "b.pdf");
    }

    #[test]
    fn test_scalar_snapshot_is_a_decode_error() {
        let result: Result<Vec<Rating>, _> = records_from_snapshot(json!("oops"));
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }
}
