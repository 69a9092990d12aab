use async_trait::async_trait;

use crate::core::body::ObjectBody;
use crate::core::error::BackendError;
use crate::domain::{BucketSummary, ObjectSummary};

/// `GetObject` response: declared content type plus the body in whatever
/// shape the backend produced it.
#[derive(Debug)]
pub struct GetObjectOutput {
    pub content_type: Option<String>,
    pub body: ObjectBody,
}

/// Storage backend abstraction so the resource can run against S3 or a fake.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn list_buckets(&self) -> Result<Vec<BucketSummary>, BackendError>;

    /// One bounded page; no continuation.
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        max_keys: i32,
    ) -> Result<Vec<ObjectSummary>, BackendError>;

    async fn get_object(&self, bucket: &str, key: &str) -> Result<GetObjectOutput, BackendError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use bytes::Bytes;

    use super::*;

    /// How `get_object` should hand back a stored body.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum BodyShape {
        Buffered,
        Chunked(usize),
    }

    /// In-memory store that counts every call it receives.
    #[derive(Default)]
    pub struct MemoryStore {
        pub buckets: Vec<BucketSummary>,
        pub objects: HashMap<(String, String), (Option<String>, Bytes)>,
        pub listing: Vec<ObjectSummary>,
        pub fail_with: Option<String>,
        pub shape: Option<BodyShape>,
        pub calls: AtomicUsize,
        pub last_list_args: Mutex<Option<(String, String, i32)>>,
    }

    impl MemoryStore {
        pub fn with_object(mut self, bucket: &str, key: &str, content_type: Option<&str>, data: &[u8]) -> Self {
            self.objects.insert(
                (bucket.to_string(), key.to_string()),
                (content_type.map(str::to_string), Bytes::copy_from_slice(data)),
            );
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn touch(&self) -> Result<(), BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.fail_with {
                Some(msg) => Err(BackendError::new(msg.clone())),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl ObjectStore for MemoryStore {
        async fn list_buckets(&self) -> Result<Vec<BucketSummary>, BackendError> {
            self.touch()?;
            Ok(self.buckets.clone())
        }

        async fn list_objects(
            &self,
            bucket: &str,
            prefix: &str,
            max_keys: i32,
        ) -> Result<Vec<ObjectSummary>, BackendError> {
            self.touch()?;
            *self.last_list_args.lock().unwrap() = Some((bucket.to_string(), prefix.to_string(), max_keys));
            Ok(self.listing.clone())
        }

        async fn get_object(&self, bucket: &str, key: &str) -> Result<GetObjectOutput, BackendError> {
            self.touch()?;
            let (content_type, data) = self
                .objects
                .get(&(bucket.to_string(), key.to_string()))
                .cloned()
                .ok_or_else(|| BackendError::new("The specified key does not exist."))?;
            let body = match self.shape.unwrap_or(BodyShape::Buffered) {
                BodyShape::Buffered => ObjectBody::Buffered(data),
                BodyShape::Chunked(size) => {
                    let chunks: Vec<Bytes> = data.chunks(size.max(1)).map(Bytes::copy_from_slice).collect();
                    ObjectBody::chunked(chunks)
                }
            };
            Ok(GetObjectOutput { content_type, body })
        }
    }
}
