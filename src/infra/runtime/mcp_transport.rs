//! Generic MCP transport helpers (stdio + streamable HTTP) decoupled from tool logic.

use std::sync::Arc;

use rmcp::handler::server::router::Router;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::serve_server;
use rmcp::transport::streamable_http_server::tower::{StreamableHttpServerConfig, StreamableHttpService};
use tokio::io::{AsyncRead, AsyncWrite};

pub use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
pub use rmcp::ServerHandler;

/// Take the process stdout for protocol frames and point fd 1 at stderr.
///
/// Dependencies such as the PDF parser emit `println!` diagnostics; after this
/// call those land on stderr while MCP messages go through the returned file.
#[cfg(unix)]
pub fn claim_stdout() -> std::io::Result<tokio::fs::File> {
    use std::io::Write;
    use std::os::fd::FromRawFd;

    std::io::stdout().flush()?;
    // SAFETY: dup has no memory-safety preconditions; the result is checked.
    let saved = unsafe { libc::dup(libc::STDOUT_FILENO) };
    if saved < 0 {
        return Err(std::io::Error::last_os_error());
    }
    // SAFETY: `saved` is a fresh descriptor owned by nobody else.
    let protocol_out = unsafe { std::fs::File::from_raw_fd(saved) };
    // SAFETY: both descriptors are open for the life of the process.
    if unsafe { libc::dup2(libc::STDERR_FILENO, libc::STDOUT_FILENO) } < 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(tokio::fs::File::from_std(protocol_out))
}

#[cfg(not(unix))]
pub fn claim_stdout() -> std::io::Result<tokio::io::Stdout> {
    Ok(tokio::io::stdout())
}

/// Serve one MCP session over stdin/stdout until the peer hangs up or Ctrl-C.
pub async fn serve_stdio<H>(
    factory: impl FnOnce() -> (H, ToolRouter<H>),
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    H: ServerHandler,
{
    let stdout = claim_stdout()?;
    serve_io(factory, tokio::io::stdin(), stdout).await
}

/// Serve one MCP session over an arbitrary reader/writer pair.
pub async fn serve_io<H, R, W>(
    factory: impl FnOnce() -> (H, ToolRouter<H>),
    reader: R,
    writer: W,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    H: ServerHandler,
    R: AsyncRead + Send + Unpin + 'static,
    W: AsyncWrite + Send + Unpin + 'static,
{
    let (handler, tools) = factory();
    let service = Router::new(handler).with_tools(tools);
    let running = serve_server(service, (reader, writer)).await?;
    tracing::info!("S3 MCP session started");

    let ct = running.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutting down server...");
            ct.cancel();
        }
    });

    let reason = running.waiting().await?;
    tracing::info!(?reason, "stdio session ended");
    Ok(())
}

pub fn make_streamable_http_service<H>(
    factory: impl Fn() -> (H, ToolRouter<H>) + Send + Sync + Clone + 'static,
    session_mgr: Arc<LocalSessionManager>,
) -> StreamableHttpService<Router<H>, LocalSessionManager>
where
    H: ServerHandler,
{
    let cfg = StreamableHttpServerConfig::default();
    tracing::debug!(stateful_mode = %cfg.stateful_mode, keep_alive = ?cfg.sse_keep_alive, "StreamableHttpServerConfig");
    let service_factory = move || {
        let (handler, tools) = factory();
        let service = Router::new(handler).with_tools(tools);
        Ok(service)
    };
    StreamableHttpService::new(service_factory, session_mgr, cfg)
}
