use tracing_subscriber::{EnvFilter, fmt};

/// Initialize logging to stderr so stdout carries only announcements.
///
/// The filter comes from `RUST_LOG` and falls back to `info`.
///
/// ```
/// mei::init_logging();
/// ```
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
