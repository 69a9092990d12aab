use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::infra::config::{Config, Mode};

#[derive(Parser, Debug)]
#[command(name = "s3-mcp-gateway")]
#[command(about = "S3 Model Context Protocol server")]
#[command(
    long_about = "Exposes S3 bucket listing, object listing and object retrieval as MCP tools.\n\n\
Environment variables:\n  \
AWS_REGION             AWS region where your S3 buckets are located\n  \
S3_BUCKETS             Comma-separated list of allowed S3 bucket names\n  \
S3_MAX_BUCKETS         Maximum number of buckets to return in listing\n  \
AWS_ENDPOINT           Alternate S3-compatible endpoint (e.g. MinIO)\n  \
AWS_S3_FORCE_PATH_STYLE  'true' to use path-style addressing\n  \
AWS_ACCESS_KEY_ID      AWS access key (if using explicit credentials)\n  \
AWS_SECRET_ACCESS_KEY  AWS secret key (if using explicit credentials)\n  \
S3_MCP_CONFIG          Optional TOML configuration file"
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the MCP server (default)
    Serve {
        /// Transport to serve on; overrides MODE
        #[arg(long, value_enum)]
        mode: Option<Mode>,
        /// HTTP port; overrides PORT
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the resolved configuration (secrets redacted) and validate it
    Config,
    /// Health check a running HTTP server
    Health {
        /// Service URL to check
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    run_commands(cli.command.unwrap_or(Commands::Serve { mode: None, port: None })).await
}

pub async fn run_commands(command: Commands) -> ExitCode {
    match command {
        Commands::Serve { mode, port } => match serve(mode, port).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = %e, "Error starting server");
                eprintln!("Error starting server: {e:#}");
                ExitCode::FAILURE
            }
        },
        Commands::Config => match show_config() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("❌ Configuration validation failed: {e:#}");
                ExitCode::FAILURE
            }
        },
        Commands::Health { url } => match health_check(&url).await {
            Ok(()) => {
                println!("✅ Service is healthy");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Health check failed: {e:#}");
                ExitCode::FAILURE
            }
        },
    }
}

async fn serve(mode: Option<Mode>, port: Option<u16>) -> anyhow::Result<()> {
    let mut cfg = Config::load()?;
    if let Some(mode) = mode {
        cfg.mode = mode;
    }
    if let Some(port) = port {
        cfg.port = port;
    }
    crate::infra::boot::run_server(cfg).await
}

fn show_config() -> anyhow::Result<()> {
    let cfg = Config::load()?;
    println!("{}", serde_json::to_string_pretty(&cfg.redacted())?);
    cfg.validate()?;
    println!("✅ Configuration is valid");
    Ok(())
}

async fn health_check(url: &str) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/healthz", url.trim_end_matches('/')))
        .timeout(std::time::Duration::from_millis(500))
        .send()
        .await?;

    if response.status().is_success() {
        Ok(())
    } else {
        anyhow::bail!("HTTP {}", response.status())
    }
}
