//! Tracing setup for the CLI.
//!
//! All diagnostics, including captured command output, go to stderr so stdout
//! carries only command results (the archive path for `pack`).

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG` env var. Defaults to `info` if unset, which shows stage
/// progress, command output, and skip warnings.
///
/// # Example
/// ```bash
/// RUST_LOG=zmpack=debug zmpack pack
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
