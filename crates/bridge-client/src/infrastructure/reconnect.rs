//! Retry schedules for the realtime connection.
//!
//! The realtime supervisor asks its [`ReconnectPolicy`] how long to wait
//! before each retry.  A policy that returns `None` ends the retry loop and
//! leaves the client `Disconnected` until `start_connection` is called again.
//!
//! Attempts are numbered from 1 and reset after every connection that reached
//! the `Connected` state, so a long-lived connection that drops starts again
//! from the shortest delay.

use std::fmt;
use std::time::Duration;

/// Decides the delay before reconnect attempt `attempt` (1-based).
pub trait ReconnectPolicy: Send + Sync + fmt::Debug {
    /// Returns the delay before the attempt, or `None` to give up.
    fn next_delay(&self, attempt: u32) -> Option<Duration>;
}

/// Doubling delay capped at `max`, giving up after `max_attempts` retries.
///
/// With the defaults the delays are 1 s, 2 s, 4 s, 8 s, 16 s, then 30 s for
/// the remaining attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialBackoff {
    pub base: Duration,
    pub max: Duration,
    pub max_attempts: u32,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(1),
            max: Duration::from_secs(30),
            max_attempts: 10,
        }
    }
}

impl ReconnectPolicy for ExponentialBackoff {
    fn next_delay(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_attempts {
            return None;
        }
        // Cap the shift so the multiplication cannot overflow.
        let exponent = attempt.saturating_sub(1).min(16);
        let delay = self.base.saturating_mul(1u32 << exponent);
        Some(delay.min(self.max))
    }
}

/// Same delay before every attempt.  `max_attempts: None` retries forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay {
    pub delay: Duration,
    pub max_attempts: Option<u32>,
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(5),
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy for FixedDelay {
    fn next_delay(&self, attempt: u32) -> Option<Duration> {
        match self.max_attempts {
            Some(max) if attempt > max => None,
            _ if attempt == 0 => None,
            _ => Some(self.delay),
        }
    }
}
