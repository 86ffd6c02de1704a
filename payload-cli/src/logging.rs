//! Logging setup for the `payload` binary
//!
//! Diagnostics go to stderr so stdout carries only the payload.
//!
//! - 0 (no `-v`): warn (reshape fallbacks are reported)
//! - 1 (`-v`): info
//! - 2 (`-vv`): debug (dropped keys per step)
//! - 3+ : trace
//!
//! `RUST_LOG` takes precedence when set.

use std::error::Error;
use std::io::{self, IsTerminal};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Map a `-v` count to a level
pub fn level_for_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "payload_core={level},payload={level}",
            level = level.as_str().to_lowercase()
        ))
    })
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(verbosity: u8) -> Result<(), Box<dyn Error + Send + Sync>> {
    let filter = build_env_filter(level_for_verbosity(verbosity));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_for_verbosity(0), Level::WARN);
        assert_eq!(level_for_verbosity(1), Level::INFO);
        assert_eq!(level_for_verbosity(2), Level::DEBUG);
        assert_eq!(level_for_verbosity(9), Level::TRACE);
    }

    #[test]
    fn second_init_reports_error() {
        init_logging(0).ok();
        assert!(init_logging(1).is_err());
    }
}
