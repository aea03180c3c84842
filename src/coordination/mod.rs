//! Coordination Layer for long-running operation
//!
//! This module provides the control-flow infrastructure around the pipeline:
//! - Fixed-interval scheduler with exponential backoff
//! - Circuit breaker pausing after consecutive failed cycles
//! - Cooperative shutdown signalling

pub mod backoff;
pub mod circuit_breaker;
pub mod scheduler;
pub mod shutdown;

pub use backoff::{Backoff, BACKOFF_SEED};
pub use circuit_breaker::{CircuitBreakerConfig, CircuitBreakerStats, CycleCircuitBreaker};
pub use scheduler::{CycleTask, Scheduler, SchedulerConfig};
pub use shutdown::{
    install_signal_handlers, shutdown_channel, CancelSignal, ShutdownHandle, ShutdownSignal,
};
