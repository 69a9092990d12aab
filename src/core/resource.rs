//! Policy-checked access to buckets and objects.

use std::sync::Arc;

use crate::core::backend::ObjectStore;
use crate::core::body::read_body;
use crate::core::classify::classify;
use crate::core::content::{materialize, ObjectPayload, TextExtractor};
use crate::core::error::S3Error;
use crate::core::policy::AccessPolicy;
use crate::domain::{BucketSummary, ObjectSummary, RawObject};
use crate::infra::logging::record_outcome;

/// Page size used when a caller does not bound an object listing.
pub const DEFAULT_MAX_KEYS: i32 = 1000;

/// Entry point for the three exposed operations. Holds only read-only state,
/// so one instance is shared by every in-flight request.
#[derive(Clone)]
pub struct S3Resource {
    store: Arc<dyn ObjectStore>,
    policy: Arc<AccessPolicy>,
    extractor: Arc<dyn TextExtractor>,
}

impl S3Resource {
    pub fn new(store: Arc<dyn ObjectStore>, policy: AccessPolicy, extractor: Arc<dyn TextExtractor>) -> Self {
        Self { store, policy: Arc::new(policy), extractor }
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    fn ensure_allowed(&self, bucket: &str) -> Result<(), S3Error> {
        if self.policy.is_allowed(bucket) {
            Ok(())
        } else {
            Err(S3Error::BucketNotAllowed(bucket.to_string()))
        }
    }

    pub async fn list_buckets(&self) -> Result<Vec<BucketSummary>, S3Error> {
        let res = self.store.list_buckets().await.map_err(S3Error::from);
        record_outcome("list_buckets", &res);
        let buckets = res.inspect_err(|e| tracing::error!(error = %e, "Error listing buckets"))?;
        let discovered = buckets.len();
        let out = self
            .policy
            .list_allowed_buckets(buckets, self.policy.max_buckets(), |b| b.name.as_str());
        tracing::debug!(discovered, returned = out.len(), "listed buckets");
        Ok(out)
    }

    pub async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        max_keys: i32,
    ) -> Result<Vec<ObjectSummary>, S3Error> {
        let res = self.list_objects_inner(bucket, prefix, max_keys).await;
        record_outcome("list_objects", &res);
        res.inspect_err(|e| tracing::error!(bucket, error = %e, "Error listing objects"))
    }

    async fn list_objects_inner(
        &self,
        bucket: &str,
        prefix: &str,
        max_keys: i32,
    ) -> Result<Vec<ObjectSummary>, S3Error> {
        self.ensure_allowed(bucket)?;
        Ok(self.store.list_objects(bucket, prefix, max_keys).await?)
    }

    /// Retrieve the whole object as a [`RawObject`]. Access is checked before
    /// the backend is contacted.
    pub async fn fetch(&self, bucket: &str, key: &str) -> Result<RawObject, S3Error> {
        self.ensure_allowed(bucket)?;
        let out = self.store.get_object(bucket, key).await?;
        let bytes = read_body(out.body).await?;
        Ok(RawObject::new(bytes, out.content_type))
    }

    pub async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectPayload, S3Error> {
        let res = self.fetch(bucket, key).await;
        record_outcome("get_object", &res);
        let raw = res.inspect_err(|e| tracing::error!(bucket, key, error = %e, "Error getting object"))?;
        let kind = classify(key, &raw.content_type);
        tracing::debug!(bucket, key, ?kind, len = raw.len(), content_type = %raw.content_type, "fetched object");
        Ok(materialize(kind, raw, self.extractor.as_ref()).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::testing::{BodyShape, MemoryStore};
    use crate::core::content::{ObjectData, PDF_EXTRACTION_PLACEHOLDER};
    use crate::core::error::ExtractError;
    use async_trait::async_trait;
    use bytes::Bytes;

    struct Failing;

    #[async_trait]
    impl TextExtractor for Failing {
        async fn extract_text(&self, _bytes: Bytes) -> Result<String, ExtractError> {
            Err(ExtractError::Parse("no xref".into()))
        }
    }

    fn resource(store: MemoryStore, policy: AccessPolicy) -> (S3Resource, Arc<MemoryStore>) {
        let store = Arc::new(store);
        let res = S3Resource::new(store.clone(), policy, Arc::new(Failing));
        (res, store)
    }

    #[tokio::test]
    async fn disallowed_bucket_never_reaches_backend() {
        let store = MemoryStore::default().with_object("private", "a.txt", Some("text/plain"), b"hi");
        let (res, store) = resource(store, AccessPolicy::new(vec!["public".into()], 5));

        let err = res.get_object("private", "a.txt").await.unwrap_err();
        assert_eq!(err, S3Error::BucketNotAllowed("private".into()));
        let err = res.list_objects("private", "", DEFAULT_MAX_KEYS).await.unwrap_err();
        assert_eq!(err, S3Error::BucketNotAllowed("private".into()));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn text_object_is_decoded() {
        let store = MemoryStore::default().with_object("b", "notes/readme", Some("text/plain"), b"hello");
        let (res, _) = resource(store, AccessPolicy::default());
        let out = res.get_object("b", "notes/readme").await.unwrap();
        assert_eq!(out.as_text(), Some("hello"));
        assert_eq!(out.content_type, "text/plain");
    }

    #[tokio::test]
    async fn missing_content_type_defaults_to_octet_stream() {
        let store = MemoryStore::default().with_object("b", "blob.bin", None, &[1, 2, 3]);
        let (res, _) = resource(store, AccessPolicy::default());
        let out = res.get_object("b", "blob.bin").await.unwrap();
        assert_eq!(out.content_type, "application/octet-stream");
        assert_eq!(out.data, ObjectData::Binary(Bytes::from_static(&[1, 2, 3])));
    }

    #[tokio::test]
    async fn chunked_and_buffered_fetches_match() {
        let data = b"0123456789abcdef".repeat(10);
        let buffered = MemoryStore::default().with_object("b", "k.bin", None, &data);
        let chunked = MemoryStore {
            shape: Some(BodyShape::Chunked(7)),
            ..MemoryStore::default().with_object("b", "k.bin", None, &data)
        };
        let (a, _) = resource(buffered, AccessPolicy::default());
        let (b, _) = resource(chunked, AccessPolicy::default());
        let a = a.fetch("b", "k.bin").await.unwrap();
        let b = b.fetch("b", "k.bin").await.unwrap();
        assert_eq!(a.bytes, b.bytes);
        assert_eq!(a.len(), data.len());
    }

    #[tokio::test]
    async fn repeated_fetches_are_identical_and_independent() {
        let store = MemoryStore::default().with_object("b", "k.bin", None, b"stable");
        let (res, store) = resource(store, AccessPolicy::default());
        let first = res.fetch("b", "k.bin").await.unwrap();
        let second = res.fetch("b", "k.bin").await.unwrap();
        assert_eq!(first.bytes, second.bytes);
        assert_eq!(store.calls(), 2);
    }

    #[tokio::test]
    async fn empty_object_fails_regardless_of_content_type() {
        for ct in [Some("text/plain"), Some("application/pdf"), None] {
            let store = MemoryStore::default().with_object("b", "empty", ct, b"");
            let (res, _) = resource(store, AccessPolicy::default());
            assert_eq!(res.get_object("b", "empty").await.unwrap_err(), S3Error::EmptyBody);
        }
    }

    #[tokio::test]
    async fn pdf_failure_is_absorbed() {
        let store = MemoryStore::default().with_object("b", "doc.pdf", None, b"garbage");
        let (res, _) = resource(store, AccessPolicy::default());
        let out = res.get_object("b", "doc.pdf").await.unwrap();
        assert_eq!(out.as_text(), Some(PDF_EXTRACTION_PLACEHOLDER));
    }

    #[tokio::test]
    async fn backend_failure_propagates_message() {
        let store = MemoryStore { fail_with: Some("Access Denied".into()), ..MemoryStore::default() };
        let (res, _) = resource(store, AccessPolicy::default());
        assert_eq!(res.get_object("b", "k").await.unwrap_err(), S3Error::Remote("Access Denied".into()));
        assert_eq!(res.list_buckets().await.unwrap_err(), S3Error::Remote("Access Denied".into()));
    }

    #[tokio::test]
    async fn list_buckets_truncates_open_listing() {
        let store = MemoryStore {
            buckets: (1..=10).map(|i| BucketSummary::named(format!("bucket-{i}"))).collect(),
            ..MemoryStore::default()
        };
        let (res, _) = resource(store, AccessPolicy::new(Vec::new(), 5));
        let names: Vec<String> = res.list_buckets().await.unwrap().into_iter().map(|b| b.name).collect();
        assert_eq!(names, (1..=5).map(|i| format!("bucket-{i}")).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn list_buckets_filters_by_allow_list() {
        let store = MemoryStore {
            buckets: ["a", "b", "c", "d"].into_iter().map(BucketSummary::named).collect(),
            ..MemoryStore::default()
        };
        let (res, _) = resource(store, AccessPolicy::new(vec!["d".into(), "b".into(), "zz".into()], 5));
        let names: Vec<String> = res.list_buckets().await.unwrap().into_iter().map(|b| b.name).collect();
        assert_eq!(names, vec!["b", "d"]);
    }

    #[tokio::test]
    async fn list_objects_passes_arguments_through() {
        let store = MemoryStore {
            listing: vec![ObjectSummary {
                key: "logs/1.log".into(),
                size: Some(10),
                last_modified: None,
                e_tag: None,
                storage_class: None,
            }],
            ..MemoryStore::default()
        };
        let (res, store) = resource(store, AccessPolicy::new(vec!["logs".into()], 5));
        let out = res.list_objects("logs", "logs/", 25).await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(
            store.last_list_args.lock().unwrap().clone(),
            Some(("logs".to_string(), "logs/".to_string(), 25))
        );
    }
}
