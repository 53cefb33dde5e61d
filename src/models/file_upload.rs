use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::iso_timestamp;

/// An uploaded file as mirrored into local state.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileUpload {
    /// Backend-assigned record key
    pub id: String,
    #[serde(rename = "type", default)]
    pub upload_type: String,
    #[serde(default)]
    pub description: String,
    /// Public download URL, only present once the binary upload completed
    #[serde(default)]
    pub image_url: Option<String>,
    /// ISO-8601 timestamp
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub classname: String,
}

/// Record body written to `<classname>/files` before the binary is stored.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FileUploadRecord {
    #[serde(rename = "type")]
    pub upload_type: String,
    pub date: String,
    pub filename: String,
    pub description: String,
    pub classname: String,
}

impl FileUploadRecord {
    pub fn into_upload(self, id: String, image_url: Option<String>) -> FileUpload {
        FileUpload {
            id,
            upload_type: self.upload_type,
            description: self.description,
            image_url,
            date: self.date,
            filename: self.filename,
            classname: self.classname,
        }
    }
}

/// Binary payload attached to a new upload.
#[derive(Debug, Clone, PartialEq)]
pub struct FileBlob {
    /// Original filename as picked by the user
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FileBlob {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), content_type: None, bytes }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Explicit content type, or one guessed from the filename.
    pub fn resolved_content_type(&self) -> String {
        self.content_type.clone().unwrap_or_else(|| {
            mime_guess::from_path(&self.name)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        })
    }

    /// Extension of the original filename, including the dot.
    pub fn extension(&self) -> Option<&str> {
        self.name.rfind('.').map(|idx| &self.name[idx..])
    }
}

/// Input of the create-upload action.
#[derive(Debug, Clone)]
pub struct NewFileUpload {
    pub upload_type: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub classname: String,
    pub image: FileBlob,
}

impl NewFileUpload {
    pub fn to_record(&self) -> FileUploadRecord {
        FileUploadRecord {
            upload_type: self.upload_type.clone(),
            date: iso_timestamp(&self.date),
            filename: self.image.name.clone(),
            description: self.description.clone(),
            classname: self.classname.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_record_serializes_type_field() {
        let upload = NewFileUpload {
            upload_type: "notes".to_string(),
            description: "week 3".to_string(),
            date: Utc.with_ymd_and_hms(2020, 3, 1, 12, 0, 0).unwrap(),
            classname: "csc209".to_string(),
            image: FileBlob::new("lecture3.pdf", vec![1, 2, 3]),
        };

        let value = serde_json::to_value(upload.to_record()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "notes",
                "date": "2020-03-01T12:00:00.000Z",
                "filename": "lecture3.pdf",
                "description": "week 3",
                "classname": "csc209"
            })
        );
    }

    #[test]
    fn test_upload_deserializes_partial_record() {
        let upload: FileUpload = serde_json::from_value(json!({
            "id": "-k1",
            "type": "exam",
            "imageUrl": "https://cdn/x.png",
            "filename": "x.png"
        }))
        .unwrap();

        assert_eq!(upload.upload_type, "exam");
        assert_eq!(upload.image_url.as_deref(), Some("https://cdn/x.png"));
        assert!(upload.description.is_empty());
        assert!(upload.classname.is_empty());
    }

    #[test]
    fn test_blob_content_type_is_guessed_from_name() {
        assert_eq!(FileBlob::new("scan.png", vec![]).resolved_content_type(), "image/png");
        assert_eq!(FileBlob::new("noext", vec![]).resolved_content_type(), "application/octet-stream");
        assert_eq!(
            FileBlob::new("scan.png", vec![]).with_content_type("image/webp").resolved_content_type(),
            "image/webp"
        );
    }

    #[test]
    fn test_blob_extension() {
        assert_eq!(FileBlob::new("a.tar.gz", vec![]).extension(), Some(".gz"));
        assert_eq!(FileBlob::new("README", vec![]).extension(), None);
    }
}
