use std::future::Future;

use base64::Engine as _;
use rmcp::handler::server::tool::{Parameters, ToolRouter};
use rmcp::model::{CallToolResult, Content, Implementation, JsonObject, ServerCapabilities, ServerInfo};
use rmcp::ErrorData as McpError;
use serde::Serialize;

use crate::core::content::{ObjectData, ObjectPayload};
use crate::core::resource::{S3Resource, DEFAULT_MAX_KEYS};
use crate::infra::runtime::mcp_transport::ServerHandler;

/// Number of base64 characters shown for binary objects.
pub const BASE64_PREVIEW_LEN: usize = 100;

pub const SERVER_NAME: &str = "s3-mcp-server";

/// MCP handler exposing the bucket/object operations of an [`S3Resource`].
#[derive(Clone)]
pub struct S3Svc {
    resource: S3Resource,
}

impl S3Svc {
    pub fn new(resource: S3Resource) -> Self {
        Self { resource }
    }
}

impl ServerHandler for S3Svc {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some("Read-only access to S3 buckets: list buckets, list objects, fetch objects.".into()),
            ..Default::default()
        }
    }
}

fn required_str<'a>(args: &'a JsonObject, field: &str) -> Result<&'a str, McpError> {
    args.get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| McpError::invalid_params(format!("missing required field: {field}"), None))
}

fn optional_str<'a>(args: &'a JsonObject, field: &str) -> Result<Option<&'a str>, McpError> {
    match args.get(field) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => v
            .as_str()
            .map(Some)
            .ok_or_else(|| McpError::invalid_params(format!("field {field} must be a string"), None)),
    }
}

fn optional_i32(args: &JsonObject, field: &str) -> Result<Option<i32>, McpError> {
    match args.get(field) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => v
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| McpError::invalid_params(format!("field {field} must be an integer"), None)),
    }
}

fn text_result(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text)])
}

fn error_result(message: String) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message)])
}

fn json_result<T: Serialize>(value: &T) -> CallToolResult {
    match serde_json::to_string_pretty(value) {
        Ok(s) => text_result(s),
        Err(e) => error_result(format!("Error: could not serialize result: {e}")),
    }
}

/// Text objects come back verbatim; binary objects as a short base64 preview.
pub fn render_payload(payload: &ObjectPayload) -> String {
    match &payload.data {
        ObjectData::Text(text) => text.clone(),
        ObjectData::Binary(bytes) => {
            let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
            let preview: String = encoded.chars().take(BASE64_PREVIEW_LEN).collect();
            format!("Binary content ({}): base64 data is {}...", payload.content_type, preview)
        }
    }
}

#[rmcp::tool_router]
impl S3Svc {
    #[rmcp::tool(name = "list-buckets", description = "List available S3 buckets")]
    async fn list_buckets(&self) -> Result<CallToolResult, McpError> {
        tracing::debug!("list-buckets invoked");
        Ok(match self.resource.list_buckets().await {
            Ok(buckets) => json_result(&buckets),
            Err(e) => error_result(format!("Error listing buckets: {e}")),
        })
    }

    #[rmcp::tool(
        name = "list-objects",
        description = "List objects in an S3 bucket. Arguments: bucket (string), prefix (optional string), maxKeys (optional integer, default 1000)"
    )]
    async fn list_objects(&self, params: Parameters<JsonObject>) -> Result<CallToolResult, McpError> {
        let args = &params.0;
        let bucket = required_str(args, "bucket")?;
        let prefix = optional_str(args, "prefix")?.unwrap_or_default();
        let max_keys = optional_i32(args, "maxKeys")?.unwrap_or(DEFAULT_MAX_KEYS);
        tracing::debug!(bucket, prefix, max_keys, "list-objects invoked");

        Ok(match self.resource.list_objects(bucket, prefix, max_keys).await {
            Ok(objects) => json_result(&objects),
            Err(e) => error_result(format!("Error listing objects in bucket {bucket}: {e}")),
        })
    }

    #[rmcp::tool(
        name = "get-object",
        description = "Retrieve an object from an S3 bucket. Arguments: bucket (string), key (string)"
    )]
    async fn get_object(&self, params: Parameters<JsonObject>) -> Result<CallToolResult, McpError> {
        let args = &params.0;
        let bucket = required_str(args, "bucket")?;
        let key = required_str(args, "key")?;
        tracing::debug!(bucket, key, "get-object invoked");

        Ok(match self.resource.get_object(bucket, key).await {
            Ok(payload) => text_result(render_payload(&payload)),
            Err(e) => error_result(format!("Error getting object {key} from bucket {bucket}: {e}")),
        })
    }
}

pub type S3Router = ToolRouter<S3Svc>;

impl S3Svc {
    pub fn router() -> S3Router {
        // Wrapper to expose the macro-generated private tool_router
        Self::tool_router()
    }
}
