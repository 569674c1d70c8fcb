//! Development-time tracing for debugging the updater.
//!
//! Diagnostics go to stderr via `RUST_LOG`; the run report on stdout is the
//! product output and is unaffected by the filter.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset.
///
/// Skipped blocks and rejected commands are logged at `warn`, so they stay
/// visible on stderr without turning on dependency noise.
const DEFAULT_FILTER: &str = "siteup=warn";

/// Initialize tracing for development logging.
///
/// Reads `RUST_LOG` env var, falling back to [`DEFAULT_FILTER`].
/// Output: stderr, compact format, no timestamps (runs are one-shot and the
/// report on stdout is what matters).
///
/// # Example
/// ```bash
/// RUST_LOG=siteup=debug cargo run -- run
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .compact(),
        )
        .init();
}
