use chrono::{TimeZone, Utc};
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::backend::{Backend, MemoryBackend};
use crate::config::StoreConfig;
use crate::models::{FileBlob, NewFileUpload, NewRating};
use crate::store::Store;

/// A store wired to a fresh in-memory backend, with a handle on the backend for assertions.
pub fn memory_store() -> (Store, Arc<MemoryBackend>) {
    memory_store_with(StoreConfig::default())
}

pub fn memory_store_with(config: StoreConfig) -> (Store, Arc<MemoryBackend>) {
    let memory = Arc::new(MemoryBackend::new());
    let store = Store::new(Backend::from_shared(memory.clone()), config);
    (store, memory)
}

pub fn new_upload(classname: &str, filename: &str) -> NewFileUpload {
    NewFileUpload {
        upload_type: "notes".to_string(),
        description: format!("{} for {}", filename, classname),
        date: Utc.with_ymd_and_hms(2020, 2, 14, 10, 30, 0).unwrap(),
        classname: classname.to_string(),
        image: FileBlob::new(filename, filename.as_bytes().to_vec()),
    }
}

pub fn new_rating(classname: &str, user: &str, rate: f64) -> NewRating {
    NewRating {
        rate,
        user: user.to_string(),
        comment: format!("{} rated {}", user, rate),
        time: Utc.with_ymd_and_hms(2020, 2, 14, 11, 0, 0).unwrap(),
        classname: classname.to_string(),
    }
}

/// Snapshot body with `count` upload records keyed `<prefix>-00`, `<prefix>-01`, ...
pub fn upload_records(prefix: &str, count: usize) -> Value {
    let mut records = Map::new();
    for i in 0..count {
        records.insert(
            format!("{}-{:02}", prefix, i),
            json!({
                "type": "notes",
                "description": format!("{} upload {}", prefix, i),
                "imageUrl": format!("memory://fileUploads/{}/{}.pdf", prefix, i),
                "date": "2020-02-14T10:30:00.000Z",
                "filename": format!("{}.pdf", i),
                "classname": prefix,
            }),
        );
    }
    Value::Object(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_records_are_keyed_in_order() {
        let records = upload_records("c1", 3);
        let keys: Vec<&String> = records.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["c1-00", "c1-01", "c1-02"]);
    }
}
