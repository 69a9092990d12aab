use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    s3_mcp_gateway::infra::logging::init();
    s3_mcp_gateway::cli::run().await
}
