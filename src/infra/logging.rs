pub fn init() {
    // Initialize tracing subscriber once, honoring RUST_LOG if set.
    // Logs go to stderr: in stdio mode stdout carries the MCP frames.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Count an operation outcome through the `metrics` facade (no-op until a
/// recorder is installed) and mirror it as a debug event.
pub fn record_outcome<T, E>(operation: &'static str, res: &Result<T, E>) {
    let outcome = if res.is_ok() { "ok" } else { "error" };
    metrics::counter!("s3_mcp_operations_total", "operation" => operation, "outcome" => outcome).increment(1);
    tracing::debug!(operation, outcome, "operation finished");
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_is_idempotent() {
        super::init();
        super::init();
    }

    #[test]
    fn record_outcome_without_recorder_is_noop() {
        super::record_outcome::<(), ()>("get_object", &Ok(()));
        super::record_outcome::<(), &str>("get_object", &Err("boom"));
    }
}
