use tracing_subscriber::EnvFilter;

pub fn init() {
    // Initialize tracing subscriber once, honoring RUST_LOG if set.
    // Logs go to stderr: stdout carries protocol frames in stdio mode.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Record one upstream call through the `metrics` facade and mirror it as a log line.
pub fn record_upstream(op: &'static str, elapsed_ms: f64, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    metrics::counter!("wiki_upstream_requests_total", "op" => op, "outcome" => outcome).increment(1);
    metrics::histogram!("wiki_upstream_latency_ms", "op" => op).record(elapsed_ms);
    tracing::debug!(op = op, outcome = outcome, elapsed_ms = elapsed_ms, "metric");
}
