//! Decides how fetched bytes should be interpreted.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Pdf,
    Binary,
}

const TEXT_CONTENT_TYPES: &[&str] = &["application/json", "application/xml", "application/javascript"];

const TEXT_EXTENSIONS: &[&str] = &[
    ".txt", ".json", ".xml", ".html", ".htm", ".css", ".js", ".ts", ".md", ".csv", ".yml", ".yaml", ".log",
    ".sh", ".bash", ".py", ".rb", ".java", ".c", ".cpp", ".h", ".cs", ".php",
];

const PDF_CONTENT_TYPE: &str = "application/pdf";
const PDF_EXTENSION: &str = ".pdf";

fn is_text_content_type(ct: &str) -> bool {
    ct.starts_with("text/") || TEXT_CONTENT_TYPES.contains(&ct)
}

/// Classify an object. Text checks run to completion before PDF checks, so a
/// declared `text/*` type beats a `.pdf` key.
///
/// Content types compare case-insensitively but otherwise exactly: a value
/// carrying parameters such as `; charset=utf-8` only matches the `text/` prefix.
pub fn classify(key: &str, content_type: &str) -> ContentKind {
    let ct = content_type.to_ascii_lowercase();
    let key = key.to_lowercase();

    if is_text_content_type(&ct) {
        ContentKind::Text
    } else if TEXT_EXTENSIONS.iter().any(|ext| key.ends_with(ext)) {
        ContentKind::Text
    } else if ct == PDF_CONTENT_TYPE {
        ContentKind::Pdf
    } else if key.ends_with(PDF_EXTENSION) {
        ContentKind::Pdf
    } else {
        ContentKind::Binary
    }
}
