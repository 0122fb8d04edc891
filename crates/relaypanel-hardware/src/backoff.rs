//! Exponential backoff for reconnect attempts.

use std::time::Duration;

/// Backoff limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffConfig {
    /// Delay after the first failed attempt.
    pub initial: Duration,

    /// Upper bound for any delay.
    pub max: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(30),
        }
    }
}

/// Doubling delay sequence, capped and never reset while failures continue.
///
/// With the defaults: 1s, 2s, 4s, 8s, 16s, 30s, 30s, ...
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    config: BackoffConfig,
    current: Duration,
    attempts: u32,
}

impl ReconnectBackoff {
    pub fn new(config: BackoffConfig) -> Self {
        Self {
            config,
            current: config.initial.min(config.max),
            attempts: 0,
        }
    }

    /// Delay to wait after the latest failure, advancing the sequence.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.config.max);
        self.attempts = self.attempts.saturating_add(1);
        delay
    }

    /// Number of delays handed out so far, i.e. failed attempts.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

impl Default for ReconnectBackoff {
    fn default() -> Self {
        Self::new(BackoffConfig::default())
    }
}
