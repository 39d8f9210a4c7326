use tracing_subscriber::EnvFilter;

/// Install the global JSON subscriber, writing to stderr.
///
/// Quiet mode only lets warnings and errors through; otherwise `RUST_LOG`
/// decides, defaulting to `info`. Safe to call more than once.
pub fn init_logging(quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
