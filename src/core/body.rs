//! Normalizes the shapes a response body can arrive in into one buffer.

use bytes::{Bytes, BytesMut};
use futures::stream::BoxStream;
use futures::TryStreamExt;

use crate::core::error::{BackendError, S3Error};

pub type ChunkStream = BoxStream<'static, Result<Bytes, BackendError>>;

/// Response body as surfaced by a backend.
pub enum ObjectBody {
    /// The whole body is already in memory.
    Buffered(Bytes),
    /// Chunks delivered as they arrive; the stream ends after the last chunk.
    Chunked(ChunkStream),
    /// The backend handed back something that is neither of the above.
    Unrecognized(String),
}

impl std::fmt::Debug for ObjectBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectBody::Buffered(b) => f.debug_tuple("Buffered").field(&b.len()).finish(),
            ObjectBody::Chunked(_) => f.write_str("Chunked(..)"),
            ObjectBody::Unrecognized(kind) => f.debug_tuple("Unrecognized").field(kind).finish(),
        }
    }
}

impl From<Bytes> for ObjectBody {
    fn from(b: Bytes) -> Self {
        ObjectBody::Buffered(b)
    }
}

impl ObjectBody {
    pub fn chunked<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = Bytes>,
        I::IntoIter: Send + 'static,
    {
        let stream = futures::stream::iter(chunks.into_iter().map(Ok::<Bytes, BackendError>));
        ObjectBody::Chunked(Box::pin(stream))
    }
}

/// Read the whole body. Empty results are an error: a present-but-empty
/// object is never reported as a successful read.
pub async fn read_body(body: ObjectBody) -> Result<Bytes, S3Error> {
    let bytes = match body {
        ObjectBody::Buffered(bytes) => bytes,
        ObjectBody::Chunked(stream) => collect_chunks(stream).await?,
        ObjectBody::Unrecognized(kind) => return Err(S3Error::UnsupportedBodyType(kind)),
    };
    if bytes.is_empty() {
        return Err(S3Error::EmptyBody);
    }
    Ok(bytes)
}

async fn collect_chunks(stream: ChunkStream) -> Result<Bytes, S3Error> {
    let buf = stream
        .try_fold(BytesMut::new(), |mut acc, chunk| async move {
            acc.extend_from_slice(&chunk);
            Ok(acc)
        })
        .await?;
    tracing::trace!(len = buf.len(), "collected chunked body");
    Ok(buf.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn chunks_concatenate_in_order() {
        let body = ObjectBody::chunked(vec![Bytes::from_static(b"AB"), Bytes::from_static(b"CD")]);
        let out = read_body(body).await.unwrap();
        assert_eq!(&out[..], b"ABCD");
        assert_eq!(out.len(), 4);
    }

    #[tokio::test]
    async fn buffered_and_chunked_agree() {
        let buffered = read_body(ObjectBody::Buffered(Bytes::from_static(b"ABCD"))).await.unwrap();
        let chunked = read_body(ObjectBody::chunked(vec![
            Bytes::from_static(b"A"),
            Bytes::new(),
            Bytes::from_static(b"BCD"),
        ]))
        .await
        .unwrap();
        assert_eq!(buffered, chunked);
    }

    #[tokio::test]
    async fn empty_bodies_are_rejected() {
        let err = read_body(ObjectBody::Buffered(Bytes::new())).await.unwrap_err();
        assert_eq!(err, S3Error::EmptyBody);
        let err = read_body(ObjectBody::chunked(Vec::<Bytes>::new())).await.unwrap_err();
        assert_eq!(err, S3Error::EmptyBody);
        let err = read_body(ObjectBody::chunked(vec![Bytes::new(), Bytes::new()])).await.unwrap_err();
        assert_eq!(err, S3Error::EmptyBody);
    }

    #[tokio::test]
    async fn unrecognized_body_is_unsupported() {
        let err = read_body(ObjectBody::Unrecognized("missing".into())).await.unwrap_err();
        assert!(matches!(err, S3Error::UnsupportedBodyType(k) if k == "missing"));
    }

    #[tokio::test]
    async fn stream_error_surfaces_as_remote_error() {
        let stream = futures::stream::iter(vec![
            Ok(Bytes::from_static(b"AB")),
            Err(BackendError::new("connection reset")),
        ]);
        let err = read_body(ObjectBody::Chunked(Box::pin(stream))).await.unwrap_err();
        assert_eq!(err, S3Error::Remote("connection reset".into()));
    }
}
