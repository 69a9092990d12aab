use std::net::SocketAddr;
use std::sync::Arc;

use crate::clients::pdf::PdfTextExtractor;
use crate::clients::s3::S3Backend;
use crate::core::resource::S3Resource;
use crate::infra::config::{Config, Mode};
use crate::tools::s3_router::S3Svc;

/// Wire the S3 backend, access policy and PDF extractor from configuration.
pub async fn build_resource(cfg: &Config) -> S3Resource {
    let backend = S3Backend::from_settings(&cfg.s3).await;
    S3Resource::new(Arc::new(backend), cfg.s3.access_policy(), Arc::new(PdfTextExtractor))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Shutting down server...");
    }
}

pub async fn run_server(cfg: Config) -> anyhow::Result<()> {
    cfg.validate()?;
    tracing::info!(
        mode = %cfg.mode,
        port = cfg.port,
        region = %cfg.s3.region,
        allowed_buckets = cfg.s3.buckets.len(),
        max_buckets = cfg.s3.max_buckets,
        "BOOT s3-mcp-gateway"
    );

    let resource = build_resource(&cfg).await;

    match cfg.mode {
        Mode::Stdio => {
            let factory = move || (S3Svc::new(resource), S3Svc::router());
            crate::infra::runtime::mcp_transport::serve_stdio(factory)
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
        }
        Mode::Http => {
            let app = crate::infra::http_app::build_app(resource);
            let addr: SocketAddr = ([0, 0, 0, 0], cfg.port).into();
            let listener = tokio::net::TcpListener::bind(addr).await?;
            tracing::info!(%addr, "S3 MCP server listening on streamable HTTP at /mcp");
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
    }
    Ok(())
}
