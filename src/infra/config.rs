//! Process configuration, resolved once at startup.
//!
//! Sources, later wins: built-in defaults, an optional TOML file named by
//! `S3_MCP_CONFIG`, then environment variables.

use std::fmt;

use anyhow::Context;
use serde::Deserialize;
use serde_json::json;

use crate::core::policy::{AccessPolicy, DEFAULT_MAX_BUCKETS};

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_PORT: u16 = 8080;
pub const CONFIG_PATH_ENV: &str = "S3_MCP_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// MCP over stdin/stdout.
    #[default]
    Stdio,
    /// Streamable HTTP at `/mcp`.
    Http,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Stdio => f.write_str("stdio"),
            Mode::Http => f.write_str("http"),
        }
    }
}

impl Mode {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Some(Mode::Stdio),
            "http" | "server" => Some(Mode::Http),
            _ => None,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub session_token: Option<String>,
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Settings {
    pub region: String,
    /// Allow-list; empty means every bucket is reachable.
    pub buckets: Vec<String>,
    pub max_buckets: usize,
    pub endpoint: Option<String>,
    pub force_path_style: bool,
    pub credentials: Option<StaticCredentials>,
}

impl Default for S3Settings {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            buckets: Vec::new(),
            max_buckets: DEFAULT_MAX_BUCKETS,
            endpoint: None,
            force_path_style: false,
            credentials: None,
        }
    }
}

impl S3Settings {
    pub fn access_policy(&self) -> AccessPolicy {
        AccessPolicy::new(self.buckets.clone(), self.max_buckets)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub mode: Mode,
    pub port: u16,
    pub s3: S3Settings,
}

impl Default for Config {
    fn default() -> Self {
        Self { mode: Mode::default(), port: DEFAULT_PORT, s3: S3Settings::default() }
    }
}

/// Shape of the optional TOML file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub mode: Option<Mode>,
    pub port: Option<u16>,
    #[serde(default)]
    pub s3: FileS3,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileS3 {
    pub region: Option<String>,
    pub buckets: Option<Vec<String>>,
    pub max_buckets: Option<usize>,
    pub endpoint: Option<String>,
    pub force_path_style: Option<bool>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
}

impl FileConfig {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("invalid configuration file")
    }
}

/// Split a comma-separated allow-list, dropping blank entries.
pub fn parse_bucket_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl Config {
    /// Defaults overlaid with the process environment. No file is read.
    pub fn from_env() -> Self {
        let mut cfg = Config::default();
        cfg.apply_env(|k| std::env::var(k).ok());
        cfg
    }

    /// Defaults, then the file named by `S3_MCP_CONFIG` (if any), then env.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = Config::default();
        if let Some(path) = non_empty(std::env::var(CONFIG_PATH_ENV).ok()) {
            let text = std::fs::read_to_string(&path).with_context(|| format!("reading config file {path}"))?;
            cfg.apply_file(FileConfig::from_toml_str(&text)?);
            tracing::debug!(path = %path, "loaded configuration file");
        }
        cfg.apply_env(|k| std::env::var(k).ok());
        Ok(cfg)
    }

    pub fn apply_file(&mut self, file: FileConfig) {
        if let Some(mode) = file.mode {
            self.mode = mode;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        let s3 = file.s3;
        if let Some(region) = non_empty(s3.region) {
            self.s3.region = region;
        }
        if let Some(buckets) = s3.buckets {
            self.s3.buckets = buckets.into_iter().filter_map(|b| non_empty(Some(b))).collect();
        }
        if let Some(max) = s3.max_buckets {
            self.s3.max_buckets = max;
        }
        if let Some(endpoint) = non_empty(s3.endpoint) {
            self.s3.endpoint = Some(endpoint);
        }
        if let Some(path_style) = s3.force_path_style {
            self.s3.force_path_style = path_style;
        }
        if let (Some(id), Some(secret)) = (non_empty(s3.access_key_id), non_empty(s3.secret_access_key)) {
            self.s3.credentials = Some(StaticCredentials {
                access_key_id: id,
                secret_access_key: secret,
                session_token: non_empty(s3.session_token),
            });
        }
    }

    /// Overlay environment variables read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |k: &str| non_empty(lookup(k));

        if let Some(raw) = get("MODE") {
            match Mode::parse(&raw) {
                Some(mode) => self.mode = mode,
                None => tracing::warn!(value = %raw, "ignoring unknown MODE"),
            }
        }
        if let Some(raw) = get("PORT") {
            match raw.parse::<u16>() {
                Ok(port) => self.port = port,
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid PORT"),
            }
        }
        if let Some(region) = get("AWS_REGION") {
            self.s3.region = region;
        }
        if let Some(raw) = lookup("S3_BUCKETS") {
            self.s3.buckets = parse_bucket_list(&raw);
        }
        if let Some(raw) = get("S3_MAX_BUCKETS") {
            match raw.parse::<usize>() {
                Ok(max) => self.s3.max_buckets = max,
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid S3_MAX_BUCKETS"),
            }
        }
        if let Some(endpoint) = get("AWS_ENDPOINT") {
            self.s3.endpoint = Some(endpoint);
        }
        if let Some(raw) = get("AWS_S3_FORCE_PATH_STYLE") {
            self.s3.force_path_style = raw == "true";
        }
        if let (Some(id), Some(secret)) = (get("AWS_ACCESS_KEY_ID"), get("AWS_SECRET_ACCESS_KEY")) {
            self.s3.credentials = Some(StaticCredentials {
                access_key_id: id,
                secret_access_key: secret,
                session_token: get("AWS_SESSION_TOKEN"),
            });
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.s3.region.trim().is_empty() {
            anyhow::bail!("AWS_REGION cannot be empty");
        }
        if self.mode == Mode::Http && self.port == 0 {
            anyhow::bail!("PORT cannot be 0");
        }
        if let Some(endpoint) = &self.s3.endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                anyhow::bail!("AWS_ENDPOINT must be an http(s) URL, got {endpoint}");
            }
        }
        Ok(())
    }

    /// Configuration as JSON with secrets left out.
    pub fn redacted(&self) -> serde_json::Value {
        json!({
            "mode": self.mode.to_string(),
            "port": self.port,
            "s3": {
                "region": self.s3.region,
                "buckets": self.s3.buckets,
                "maxBuckets": self.s3.max_buckets,
                "endpoint": self.s3.endpoint,
                "forcePathStyle": self.s3.force_path_style,
                "credentials": if self.s3.credentials.is_some() { "static" } else { "default-chain" },
            }
        })
    }
}
