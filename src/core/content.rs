//! Turns classified bytes into the payload handed back to callers.

use async_trait::async_trait;
use bytes::Bytes;

use crate::core::classify::ContentKind;
use crate::core::error::ExtractError;
use crate::domain::RawObject;

/// Text returned in place of a PDF the extractor could not read.
pub const PDF_EXTRACTION_PLACEHOLDER: &str = "Error: Could not extract text from PDF file.";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Bytes → text for documents that need parsing (PDF).
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, bytes: Bytes) -> Result<String, ExtractError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectData {
    Text(String),
    Binary(Bytes),
}

/// Materialized object. Text and PDF objects carry text, everything else
/// carries the untouched bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectPayload {
    pub data: ObjectData,
    pub content_type: String,
}

impl ObjectPayload {
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            ObjectData::Text(s) => Some(s),
            ObjectData::Binary(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match &self.data {
            ObjectData::Binary(b) => Some(b),
            ObjectData::Text(_) => None,
        }
    }
}

/// Lossy UTF-8 decode, dropping a leading byte-order mark.
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Never fails: PDF extraction errors degrade to [`PDF_EXTRACTION_PLACEHOLDER`].
pub async fn materialize(kind: ContentKind, raw: RawObject, extractor: &dyn TextExtractor) -> ObjectPayload {
    let RawObject { bytes, content_type } = raw;
    let data = match kind {
        ContentKind::Text => ObjectData::Text(decode_text(&bytes)),
        ContentKind::Pdf => match extractor.extract_text(bytes).await {
            Ok(text) => ObjectData::Text(text),
            Err(e) => {
                tracing::warn!(error = %e, "Error converting PDF to text");
                ObjectData::Text(PDF_EXTRACTION_PLACEHOLDER.to_string())
            }
        },
        ContentKind::Binary => ObjectData::Binary(bytes),
    };
    ObjectPayload { data, content_type }
}
