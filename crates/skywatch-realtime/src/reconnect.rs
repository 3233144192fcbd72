//! Per-domain reconnect policy.
//!
//! Pure state machine over the backoff math in `skywatch-core`; the
//! connection layer owns one of these per channel domain and does the actual
//! sleeping. A failure on the location channel never touches the chat
//! channel's counter — the two domains hold independent policies.

use std::time::Duration;

use skywatch_core::backoff::{ReconnectConfig, backoff_delay_ms};

/// Tracks consecutive failures and produces the next reconnect delay.
#[derive(Clone, Debug)]
pub struct ReconnectPolicy {
    config: ReconnectConfig,
    attempts: u32,
}

impl ReconnectPolicy {
    /// New policy with zero recorded failures.
    #[must_use]
    pub fn new(config: ReconnectConfig) -> Self {
        Self {
            config,
            attempts: 0,
        }
    }

    /// Consecutive failed attempts so far.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Record a successful open: the failure streak is over.
    pub fn on_open(&mut self) {
        self.attempts = 0;
    }

    /// Reset for a fresh top-level connect call.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    /// Record an unexpected close and return the delay before the next
    /// attempt, or `None` once the attempt ceiling is reached — the channel
    /// goes silent until a fresh connect call resets the policy.
    pub fn next_attempt(&mut self) -> Option<Duration> {
        if self.attempts >= self.config.max_attempts {
            return None;
        }
        self.attempts += 1;
        Some(Duration::from_millis(backoff_delay_ms(
            self.attempts,
            self.config.base_delay_ms,
            self.config.max_delay_ms,
        )))
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(ReconnectConfig::default())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_doubles_and_stops() {
        let mut policy = ReconnectPolicy::default();
        let delays: Vec<_> = std::iter::from_fn(|| policy.next_attempt())
            .map(|d| d.as_millis())
            .collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 16_000]);
        // Ceiling reached: no 6th attempt, ever.
        assert_eq!(policy.next_attempt(), None);
        assert_eq!(policy.next_attempt(), None);
    }

    #[test]
    fn open_resets_the_streak() {
        let mut policy = ReconnectPolicy::default();
        let _ = policy.next_attempt();
        let _ = policy.next_attempt();
        assert_eq!(policy.attempts(), 2);

        policy.on_open();
        assert_eq!(policy.attempts(), 0);
        assert_eq!(policy.next_attempt().unwrap().as_millis(), 1000);
    }

    #[test]
    fn reset_allows_a_new_round() {
        let mut policy = ReconnectPolicy::default();
        while policy.next_attempt().is_some() {}
        assert_eq!(policy.next_attempt(), None);

        policy.reset();
        assert_eq!(policy.next_attempt().unwrap().as_millis(), 1000);
    }

    #[test]
    fn policies_are_independent_per_domain() {
        let mut location = ReconnectPolicy::default();
        let mut chat = ReconnectPolicy::default();

        let _ = location.next_attempt();
        let _ = location.next_attempt();
        let _ = location.next_attempt();

        // Chat's schedule is untouched by location's failures.
        assert_eq!(chat.attempts(), 0);
        assert_eq!(chat.next_attempt().unwrap().as_millis(), 1000);
        assert_eq!(location.next_attempt().unwrap().as_millis(), 8000);
    }

    #[test]
    fn custom_config_respected() {
        let mut policy = ReconnectPolicy::new(ReconnectConfig {
            max_attempts: 2,
            base_delay_ms: 50,
            max_delay_ms: 60_000,
        });
        assert_eq!(policy.next_attempt().unwrap().as_millis(), 50);
        assert_eq!(policy.next_attempt().unwrap().as_millis(), 100);
        assert_eq!(policy.next_attempt(), None);
    }
}
