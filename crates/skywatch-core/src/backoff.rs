//! Reconnect configuration and backoff calculation.
//!
//! Provides the sync-only math for the reconnect policy. The actual
//! scheduling lives in `skywatch-realtime` (which has access to tokio);
//! this module contains the portable building blocks:
//!
//! - [`ReconnectConfig`]: reconnect parameters (attempt ceiling, base delay)
//! - [`backoff_delay_ms`]: exponential backoff delay

use serde::{Deserialize, Serialize};

/// Default maximum consecutive reconnect attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Default base delay in milliseconds.
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;
/// Default maximum delay in milliseconds.
pub const DEFAULT_MAX_DELAY_MS: u64 = 60_000;

/// Configuration for the per-domain reconnect policy.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconnectConfig {
    /// Maximum consecutive failed attempts before going silent (default: 5).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base delay for exponential backoff in ms (default: 1000).
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Cap on the computed delay in ms (default: 60000).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}
fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY_MS
}
fn default_max_delay_ms() -> u64 {
    DEFAULT_MAX_DELAY_MS
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
        }
    }
}

/// Calculate the exponential backoff delay for a reconnect attempt.
///
/// Formula: `min(max_delay, base_delay × 2^(attempt − 1))`.
///
/// `attempt` is 1-based (the first reconnect attempt is 1). With the default
/// base delay this yields 1000, 2000, 4000, 8000, 16000 ms for attempts 1–5.
/// The schedule is deliberately jitter-free; consumers that need spread can
/// add their own on top.
#[must_use]
pub fn backoff_delay_ms(attempt: u32, base_delay_ms: u64, max_delay_ms: u64) -> u64 {
    let exponent = attempt.saturating_sub(1).min(31);
    let exponential = base_delay_ms.saturating_mul(1u64 << exponent);
    exponential.min(max_delay_ms)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = ReconnectConfig::default();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.base_delay_ms, 1000);
        assert_eq!(config.max_delay_ms, 60_000);
    }

    #[test]
    fn config_serde_defaults() {
        let config: ReconnectConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.base_delay_ms, 1000);
    }

    #[test]
    fn config_serde_roundtrip() {
        let config = ReconnectConfig {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: ReconnectConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.max_attempts, 3);
        assert_eq!(back.base_delay_ms, 500);
    }

    #[test]
    fn delays_double_per_attempt() {
        assert_eq!(backoff_delay_ms(1, 1000, 60_000), 1000);
        assert_eq!(backoff_delay_ms(2, 1000, 60_000), 2000);
        assert_eq!(backoff_delay_ms(3, 1000, 60_000), 4000);
        assert_eq!(backoff_delay_ms(4, 1000, 60_000), 8000);
        assert_eq!(backoff_delay_ms(5, 1000, 60_000), 16_000);
    }

    #[test]
    fn delay_caps_at_max() {
        assert_eq!(backoff_delay_ms(10, 1000, 60_000), 60_000);
    }

    #[test]
    fn attempt_zero_treated_as_first() {
        assert_eq!(backoff_delay_ms(0, 1000, 60_000), 1000);
    }

    #[test]
    fn high_attempt_does_not_overflow() {
        let delay = backoff_delay_ms(u32::MAX, 1000, u64::MAX);
        assert!(delay > 0);
    }
}
