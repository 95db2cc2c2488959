//! Logging setup for `deck`.
//!
//! Diagnostics always go to stderr so stdout stays clean for `--json`.
//! `DECK_LOG` takes a full `EnvFilter` directive and overrides the
//! verbosity flags; `DECK_LOG_FORMAT=json` switches to JSON lines.

use std::env;
use std::io;

use anyhow::{Result, anyhow};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Filter directive for the given verbosity flags.
#[must_use]
pub fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.
///
/// `log_format` falls back to `DECK_LOG_FORMAT`, then to compact text.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(verbose: u8, quiet: bool, log_format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_env("DECK_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    let format = log_format
        .map(str::to_string)
        .or_else(|| env::var("DECK_LOG_FORMAT").ok())
        .unwrap_or_else(|| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
            .try_init(),
        _ => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(io::stderr),
            )
            .try_init(),
    };
    result.map_err(|e| anyhow!("{e}"))
}

/// Route logs through the test harness. Safe to call from every test.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(0, false), "warn");
        assert_eq!(default_directive(1, false), "info");
        assert_eq!(default_directive(2, false), "debug");
        assert_eq!(default_directive(7, false), "trace");
        assert_eq!(default_directive(3, true), "error");
    }

    #[test]
    fn test_init_test_logging_is_idempotent() {
        init_test_logging();
        init_test_logging();
        tracing::debug!("still fine");
    }
}
