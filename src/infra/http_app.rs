use axum::{
    routing::{any_service, get},
    Router,
};
use std::sync::Arc;

use crate::core::resource::S3Resource;
use crate::infra::runtime::mcp_transport::{make_streamable_http_service, LocalSessionManager};
use crate::tools::s3_router::S3Svc;

/// `/healthz` + streamable MCP at `/mcp`, every session sharing one resource.
pub fn build_app(resource: S3Resource) -> Router {
    let session_mgr = Arc::new(LocalSessionManager::default());
    let factory = move || (S3Svc::new(resource.clone()), S3Svc::router());
    let mcp_service = make_streamable_http_service(factory, session_mgr);

    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route_service("/mcp", any_service(mcp_service))
}
