use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content type assumed when the backend does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A bucket as reported by `ListBuckets`.
///
/// Field names follow the storage service's wire casing so the JSON handed to
/// agents looks like the service's own listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BucketSummary {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<DateTime<Utc>>,
}

impl BucketSummary {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), creation_date: None }
    }
}

/// One entry of a `ListObjects` page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectSummary {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(rename = "ETag", default, skip_serializing_if = "Option::is_none")]
    pub e_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
}

/// Whole object body plus its declared content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObject {
    pub bytes: Bytes,
    pub content_type: String,
}

impl RawObject {
    pub fn new(bytes: Bytes, content_type: Option<String>) -> Self {
        let content_type = content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
        Self { bytes, content_type }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
