//! # skywatch-logging
//!
//! Structured logging with `tracing`.
//!
//! All transport diagnostics in this workspace go through `tracing` macros;
//! this crate owns subscriber initialization so binaries and tests configure
//! it in one place. The filter comes from `SKYWATCH_LOG` (standard
//! `EnvFilter` syntax), falling back to the level passed to [`init`].

#![deny(unsafe_code)]

pub mod types;

pub use types::LogLevel;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
pub const LOG_FILTER_ENV: &str = "SKYWATCH_LOG";

/// Initialize the global tracing subscriber.
///
/// `default_level` applies when `SKYWATCH_LOG` is unset. Safe to call more
/// than once; only the first call installs a subscriber.
pub fn init(default_level: LogLevel) {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    // try_init so tests that each call init() don't panic on the second one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
