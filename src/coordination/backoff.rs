//! Exponential backoff for failed scheduler cycles.

use std::time::Duration;

/// Initial backoff applied after the first failure
pub const BACKOFF_SEED: Duration = Duration::from_secs(2);

/// Backoff state: zero while healthy, doubled per consecutive failure
#[derive(Debug, Clone)]
pub struct Backoff {
    current: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(max: Duration) -> Self {
        Self {
            current: Duration::ZERO,
            max,
        }
    }

    /// Current backoff (zero when the last cycle succeeded)
    pub fn current(&self) -> Duration {
        self.current
    }

    pub fn is_active(&self) -> bool {
        !self.current.is_zero()
    }

    /// Reset after a successful cycle
    pub fn reset(&mut self) {
        self.current = Duration::ZERO;
    }

    /// Register a failed cycle and return the new backoff
    pub fn on_failure(&mut self) -> Duration {
        let next = if self.current.is_zero() {
            BACKOFF_SEED
        } else {
            self.current.saturating_mul(2)
        };
        self.current = next.min(self.max);
        self.current
    }

    /// Stretch the planned inter-cycle sleep to cover the active backoff
    pub fn extend(&self, sleep_for: Duration) -> Duration {
        if self.is_active() {
            sleep_for.max(self.current)
        } else {
            sleep_for
        }
    }
}
