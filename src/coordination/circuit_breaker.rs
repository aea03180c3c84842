//! Cycle Circuit Breaker
//!
//! Counts consecutive failed pipeline cycles. Once the count reaches the
//! threshold, the next cycle serves a fixed cooldown pause before touching
//! the event source, then starts counting again from zero.
//!
//! Successful cycles do not reset the counter; only a served cooldown does.

use std::time::Duration;
use tracing::{info, warn};

/// Configuration for the cycle circuit breaker
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Number of failed cycles that trips the breaker
    pub failure_threshold: u32,
    /// Pause served once tripped
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 8,
            cooldown: Duration::from_secs(60),
        }
    }
}

impl CircuitBreakerConfig {
    pub fn from_runtime(runtime: &crate::config::RuntimeConfig) -> Self {
        Self {
            failure_threshold: runtime.circuit_breaker_failures,
            cooldown: runtime.circuit_breaker_pause(),
        }
    }
}

/// Circuit breaker owned by the processing pipeline
#[derive(Debug)]
pub struct CycleCircuitBreaker {
    config: CircuitBreakerConfig,
    consecutive_failures: u32,
    total_trips: u64,
}

impl CycleCircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            consecutive_failures: 0,
            total_trips: 0,
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn is_tripped(&self) -> bool {
        self.consecutive_failures >= self.config.failure_threshold
    }

    /// Record a cycle that failed out of the pipeline
    pub fn record_failure(&mut self, reason: &str) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        warn!(
            failures = self.consecutive_failures,
            threshold = self.config.failure_threshold,
            "Cycle failure recorded: {}",
            reason
        );
    }

    /// Serve the cooldown if tripped. Returns true when a pause was served.
    pub async fn cooldown_if_tripped(&mut self) -> bool {
        if !self.is_tripped() {
            return false;
        }

        warn!(
            failures = self.consecutive_failures,
            pause_secs = self.config.cooldown.as_secs_f64(),
            "Circuit breaker active, pausing"
        );
        tokio::time::sleep(self.config.cooldown).await;

        self.consecutive_failures = 0;
        self.total_trips += 1;
        info!(stats = ?self.stats(), "Circuit breaker cooldown served");
        true
    }

    pub fn stats(&self) -> CircuitBreakerStats {
        CircuitBreakerStats {
            consecutive_failures: self.consecutive_failures,
            failure_threshold: self.config.failure_threshold,
            total_trips: self.total_trips,
        }
    }
}

/// Statistics for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerStats {
    pub consecutive_failures: u32,
    pub failure_threshold: u32,
    pub total_trips: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(threshold: u32) -> CycleCircuitBreaker {
        CycleCircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: threshold,
            cooldown: Duration::from_secs(60),
        })
    }

    #[test]
    fn test_initial_state() {
        let cb = CycleCircuitBreaker::new(CircuitBreakerConfig::default());
        assert!(!cb.is_tripped());
        assert_eq!(
            cb.stats(),
            CircuitBreakerStats {
                consecutive_failures: 0,
                failure_threshold: 8,
                total_trips: 0,
            }
        );
    }

    #[test]
    fn test_trips_at_threshold() {
        let mut cb = breaker(3);

        cb.record_failure("error 1");
        cb.record_failure("error 2");
        assert!(!cb.is_tripped());

        cb.record_failure("error 3");
        assert!(cb.is_tripped());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_pause_below_threshold() {
        let mut cb = breaker(3);
        cb.record_failure("error 1");

        let start = tokio::time::Instant::now();
        assert!(!cb.cooldown_if_tripped().await);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(cb.consecutive_failures(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_pauses_then_resets() {
        let mut cb = breaker(8);
        for i in 0..8 {
            cb.record_failure(&format!("error {i}"));
        }

        let start = tokio::time::Instant::now();
        assert!(cb.cooldown_if_tripped().await);
        assert!(start.elapsed() >= Duration::from_secs(60));

        assert_eq!(cb.consecutive_failures(), 0);
        assert!(!cb.is_tripped());
        assert_eq!(cb.stats().total_trips, 1);
    }
}
