//! Logging initialization.
//!
//! Library code logs through `tracing` macros: one line per folder, a warning
//! per skipped file, per-file detail at debug level. The binary installs a
//! `tracing-subscriber` formatter on stderr so stdout carries only the summary.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the logging subsystem.
///
/// `verbose` selects DEBUG instead of INFO. The `RUST_LOG` environment
/// variable overrides both.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
