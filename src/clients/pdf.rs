use async_trait::async_trait;
use bytes::Bytes;

use crate::core::content::TextExtractor;
use crate::core::error::ExtractError;

/// Extracts text from an in-memory PDF with `pdf-extract`.
///
/// Parsing is CPU-bound and the parser may panic on hostile input, so it runs
/// on the blocking pool; a panic surfaces as [`ExtractError::Aborted`].
#[derive(Debug, Clone, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn extract_blocking(bytes: &[u8]) -> Result<String, ExtractError> {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Parse(e.to_string()))
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract_text(&self, bytes: Bytes) -> Result<String, ExtractError> {
        let len = bytes.len();
        let out = tokio::task::spawn_blocking(move || Self::extract_blocking(&bytes))
            .await
            .map_err(|e| ExtractError::Aborted(e.to_string()))?;
        tracing::debug!(len, ok = out.is_ok(), "pdf text extraction finished");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classify::ContentKind;
    use crate::core::content::{materialize, PDF_EXTRACTION_PLACEHOLDER};
    use crate::domain::RawObject;

    #[tokio::test]
    async fn garbage_is_an_extraction_error() {
        let res = PdfTextExtractor.extract_text(Bytes::from_static(b"definitely not a pdf")).await;
        assert!(res.is_err());
    }

    #[tokio::test]
    async fn garbage_pdf_materializes_to_placeholder() {
        let raw = RawObject::new(Bytes::from_static(b"\x00\x01\x02 nope"), Some("application/pdf".into()));
        let out = materialize(ContentKind::Pdf, raw, &PdfTextExtractor).await;
        assert_eq!(out.as_text(), Some(PDF_EXTRACTION_PLACEHOLDER));
    }
}
