// Logging/tracing setup for the CLI.

/// Initialize tracing to stderr, honoring RUST_LOG and defaulting to info.
///
/// Status lines go to stdout; diagnostics stay on stderr so output can be
/// piped.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
