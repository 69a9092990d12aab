use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::{ByteStream, DateTime as AwsDateTime};
use aws_sdk_s3::Client;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::core::backend::{GetObjectOutput, ObjectStore};
use crate::core::body::ObjectBody;
use crate::core::error::BackendError;
use crate::domain::{BucketSummary, ObjectSummary};
use crate::infra::config::S3Settings;

/// [`ObjectStore`] backed by `aws-sdk-s3`. Works against AWS and S3-compatible
/// services (MinIO, R2) through the endpoint and path-style settings.
#[derive(Clone, Debug)]
pub struct S3Backend {
    client: Client,
}

impl S3Backend {
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Static credentials skip the default provider chain entirely; otherwise
    /// the chain (env, profile, IMDS, ...) is resolved once here.
    pub async fn from_settings(settings: &S3Settings) -> Self {
        let region = Region::new(settings.region.clone());
        let mut builder = match &settings.credentials {
            Some(creds) => aws_sdk_s3::Config::builder()
                .behavior_version(BehaviorVersion::latest())
                .region(region)
                .credentials_provider(Credentials::new(
                    creds.access_key_id.clone(),
                    creds.secret_access_key.clone(),
                    creds.session_token.clone(),
                    None,
                    "s3-mcp-gateway",
                )),
            None => {
                let sdk_config = aws_config::defaults(BehaviorVersion::latest()).region(region).load().await;
                aws_sdk_s3::config::Builder::from(&sdk_config)
            }
        };
        builder = builder.force_path_style(settings.force_path_style);
        if let Some(endpoint) = &settings.endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        tracing::debug!(
            region = %settings.region,
            endpoint = ?settings.endpoint,
            force_path_style = settings.force_path_style,
            static_credentials = settings.credentials.is_some(),
            "s3 client configured"
        );
        Self::from_client(Client::from_conf(builder.build()))
    }
}

fn backend_error<E>(e: E) -> BackendError
where
    E: std::error::Error,
{
    BackendError::new(DisplayErrorContext(&e).to_string())
}

fn to_chrono(ts: &AwsDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())
}

/// Bodies the SDK already holds in memory are handed over whole; network
/// responses are drained chunk by chunk.
fn object_body(body: ByteStream) -> ObjectBody {
    match body.bytes() {
        Some(buf) => ObjectBody::Buffered(Bytes::copy_from_slice(buf)),
        None => chunked(body),
    }
}

fn chunked(body: ByteStream) -> ObjectBody {
    let stream = futures::stream::try_unfold(body, |mut body| async move {
        match body.try_next().await {
            Ok(Some(chunk)) => Ok(Some((chunk, body))),
            Ok(None) => Ok(None),
            Err(e) => Err(BackendError::new(e.to_string())),
        }
    });
    ObjectBody::Chunked(Box::pin(stream))
}

#[async_trait]
impl ObjectStore for S3Backend {
    async fn list_buckets(&self) -> Result<Vec<BucketSummary>, BackendError> {
        let out = self.client.list_buckets().send().await.map_err(backend_error)?;
        Ok(out
            .buckets()
            .iter()
            .filter_map(|b| {
                let name = b.name()?;
                Some(BucketSummary {
                    name: name.to_string(),
                    creation_date: b.creation_date().and_then(to_chrono),
                })
            })
            .collect())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        max_keys: i32,
    ) -> Result<Vec<ObjectSummary>, BackendError> {
        let out = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .max_keys(max_keys)
            .send()
            .await
            .map_err(backend_error)?;
        Ok(out
            .contents()
            .iter()
            .map(|o| ObjectSummary {
                key: o.key().unwrap_or_default().to_string(),
                size: o.size(),
                last_modified: o.last_modified().and_then(to_chrono),
                e_tag: o.e_tag().map(str::to_string),
                storage_class: o.storage_class().map(|c| c.as_str().to_string()),
            })
            .collect())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<GetObjectOutput, BackendError> {
        let out = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(backend_error)?;
        Ok(GetObjectOutput {
            content_type: out.content_type().map(str::to_string),
            body: object_body(out.body),
        })
    }
}
