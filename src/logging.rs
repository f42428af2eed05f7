use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `TALLY_LOG=debug`.
pub const LOG_ENV: &str = "TALLY_LOG";

/// Install the stderr subscriber. Defaults to `warn` so dropped records and
/// failed writes are visible without drowning command output.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
