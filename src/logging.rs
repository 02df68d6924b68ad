use tracing_subscriber::{EnvFilter, fmt};

/// Error returned when the global subscriber cannot be installed
pub type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over the configured `level`, e.g.
/// `RUST_LOG=mark_consolidator=debug`. Logs go to stderr so the summary on
/// stdout stays machine-readable.
pub fn init(level: &str, json: bool) -> Result<(), InitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
}

/// Verbose subscriber for tests; safe to call repeatedly
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
