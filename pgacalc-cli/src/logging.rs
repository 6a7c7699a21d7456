use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset: `-v` gives info, `-vv` and up
/// debug, otherwise the configured level.
fn default_directive(verbose: u8, configured: &str) -> String {
    match verbose {
        0 => configured.to_string(),
        1 => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Install the global subscriber. Everything goes to stderr; stdout carries
/// only the result.
pub fn init(verbose: u8, configured: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, configured)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
