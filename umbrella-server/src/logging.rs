use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Verbosity comes from `RUST_LOG`, `info` otherwise.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}
