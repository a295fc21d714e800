use tracing_subscriber::{filter::LevelFilter, EnvFilter};

/// Install the global subscriber. Filter from `RUST_LOG`, `info` by default.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn init() {
    let log_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter)
        .with_writer(std::io::stderr)
        .init();
}
