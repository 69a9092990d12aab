use thiserror::Error;

/// Failure reported by a storage backend, carrying the backend's own message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        BackendError(message.into())
    }
}

/// Errors that reach the tool boundary and are rendered as error results.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum S3Error {
    /// Rejected by the access policy; the backend was never contacted.
    #[error("Bucket {0} is not in the allowed buckets list")]
    BucketNotAllowed(String),
    #[error("{0}")]
    Remote(String),
    #[error("Unexpected response body type: {0}")]
    UnsupportedBodyType(String),
    #[error("Empty response body")]
    EmptyBody,
}

impl From<BackendError> for S3Error {
    fn from(e: BackendError) -> Self {
        S3Error::Remote(e.0)
    }
}

/// PDF extraction failure. Never leaves the materializer.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{0}")]
    Parse(String),
    #[error("extraction task aborted: {0}")]
    Aborted(String),
}
