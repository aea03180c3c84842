//! Fixed-interval scheduler
//!
//! Runs one [`CycleTask`] step at a time:
//! - `start()` once, then `step()` every `interval` until cancelled
//! - failed steps are logged and back off exponentially (2s seed, capped)
//! - `stop()` always runs exactly once on the way out, including when
//!   `start()` or `step()` panics (the panic resumes after `stop()`)
//!
//! Cancellation is cooperative. An in-flight step completes; only the sleep
//! between steps is cut short.

use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info};

use super::backoff::Backoff;
use super::shutdown::CancelSignal;
use crate::config::RuntimeConfig;
use crate::error::{CopyTradeError, Result};

/// Unit of work driven by the scheduler.
///
/// Errors from `step` are transient: the scheduler swallows them and backs
/// off. Errors from `start` and `stop` are fatal and returned from
/// [`Scheduler::run`].
#[async_trait]
pub trait CycleTask: Send {
    async fn start(&mut self) -> Result<()>;

    async fn step(&mut self) -> Result<()>;

    async fn stop(&mut self) -> Result<()>;
}

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub interval: Duration,
    pub max_backoff: Duration,
}

impl From<&RuntimeConfig> for SchedulerConfig {
    fn from(runtime: &RuntimeConfig) -> Self {
        Self {
            interval: runtime.poll_interval(),
            max_backoff: runtime.max_backoff(),
        }
    }
}

pub struct Scheduler<T: CycleTask> {
    task: T,
    interval: Duration,
    backoff: Backoff,
}

impl<T: CycleTask> Scheduler<T> {
    pub fn new(task: T, config: SchedulerConfig) -> Self {
        Self {
            task,
            interval: config.interval,
            backoff: Backoff::new(config.max_backoff),
        }
    }

    pub fn task(&self) -> &T {
        &self.task
    }

    pub fn into_task(self) -> T {
        self.task
    }

    pub fn current_backoff(&self) -> Duration {
        self.backoff.current()
    }

    /// Run until `cancel` fires.
    ///
    /// `stop()` runs even when `start()` fails; the first fatal error wins.
    pub async fn run(&mut self, mut cancel: CancelSignal) -> Result<()> {
        let outcome = AssertUnwindSafe(async {
            self.task.start().await?;
            self.run_loop(&mut cancel).await;
            Ok::<(), CopyTradeError>(())
        })
        .catch_unwind()
        .await;

        self.finish(outcome).await
    }

    /// Run a single step between start and stop.
    pub async fn run_once(&mut self) -> Result<()> {
        let outcome = AssertUnwindSafe(async {
            self.task.start().await?;
            self.run_step().await
        })
        .catch_unwind()
        .await;

        self.finish(outcome).await
    }

    async fn finish(
        &mut self,
        outcome: std::result::Result<Result<()>, Box<dyn Any + Send>>,
    ) -> Result<()> {
        let stopped = self.task.stop().await;
        info!("Scheduler stopped.");

        match outcome {
            Ok(ran) => ran.and(stopped),
            Err(panic) => {
                error!("Task panicked; stop() completed, resuming panic");
                std::panic::resume_unwind(panic)
            }
        }
    }

    async fn run_loop(&mut self, cancel: &mut CancelSignal) {
        while !cancel.is_cancelled() {
            let cycle_start = Instant::now();
            let _ = self.run_step().await;

            let sleep_for = self
                .backoff
                .extend(self.interval.saturating_sub(cycle_start.elapsed()));
            debug!(sleep_ms = sleep_for.as_millis() as u64, "Cycle complete");

            tokio::select! {
                _ = tokio::time::sleep(sleep_for) => {}
                _ = cancel.cancelled() => {
                    debug!("Cancellation observed during inter-cycle sleep");
                }
            }
        }
    }

    async fn run_step(&mut self) -> Result<()> {
        match self.task.step().await {
            Ok(()) => {
                self.backoff.reset();
                Ok(())
            }
            Err(e) => {
                let backoff = self.backoff.on_failure();
                error!(
                    backoff_secs = backoff.as_secs_f64(),
                    "Task step failed: {}. Backing off for {:.1}s",
                    e,
                    backoff.as_secs_f64()
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordination::shutdown::{shutdown_channel, ShutdownHandle, ShutdownSignal};
    use crate::error::CopyTradeError;
    use std::collections::VecDeque;

    /// Step outcomes are scripted; the handle fires after the script runs out.
    struct ScriptedTask {
        outcomes: VecDeque<bool>,
        shutdown: ShutdownHandle,
        fail_start: bool,
        fail_stop: bool,
        panic_on_step: bool,
        starts: u32,
        steps: u32,
        stops: u32,
        step_times: Vec<Instant>,
    }

    impl ScriptedTask {
        fn new(outcomes: &[bool], shutdown: ShutdownHandle) -> Self {
            Self {
                outcomes: outcomes.iter().copied().collect(),
                shutdown,
                fail_start: false,
                fail_stop: false,
                panic_on_step: false,
                starts: 0,
                steps: 0,
                stops: 0,
                step_times: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl CycleTask for ScriptedTask {
        async fn start(&mut self) -> Result<()> {
            self.starts += 1;
            if self.fail_start {
                return Err(CopyTradeError::Session("login failed".to_string()));
            }
            Ok(())
        }

        async fn step(&mut self) -> Result<()> {
            self.steps += 1;
            self.step_times.push(Instant::now());
            if self.panic_on_step {
                panic!("step blew up");
            }
            let ok = self.outcomes.pop_front().unwrap_or(true);
            if self.outcomes.is_empty() {
                self.shutdown.request_shutdown(ShutdownSignal::Requested);
            }
            if ok {
                Ok(())
            } else {
                Err(CopyTradeError::Discovery("boom".to_string()))
            }
        }

        async fn stop(&mut self) -> Result<()> {
            self.stops += 1;
            if self.fail_stop {
                return Err(CopyTradeError::Session("close failed".to_string()));
            }
            Ok(())
        }
    }

    fn config() -> SchedulerConfig {
        SchedulerConfig {
            interval: Duration::from_secs(3),
            max_backoff: Duration::from_secs(60),
        }
    }

    fn gaps(times: &[Instant]) -> Vec<u64> {
        times
            .windows(2)
            .map(|w| (w[1] - w[0]).as_secs())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_back_off_then_reset() {
        let (handle, cancel) = shutdown_channel();
        // fail, fail, fail, ok, fail
        let task = ScriptedTask::new(&[false, false, false, true, false, true], handle);
        let mut scheduler = Scheduler::new(task, config());

        scheduler.run(cancel).await.unwrap();

        let task = scheduler.task();
        assert_eq!(task.starts, 1);
        assert_eq!(task.stops, 1);
        assert_eq!(task.steps, 6);
        // backoff 2 < interval 3, then 4, 8, reset -> interval 3, then 2 -> 3
        assert_eq!(gaps(&task.step_times), vec![3, 4, 8, 3, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_caps_at_max() {
        let (handle, cancel) = shutdown_channel();
        let task = ScriptedTask::new(&[false; 7], handle);
        let mut scheduler = Scheduler::new(
            task,
            SchedulerConfig {
                interval: Duration::from_secs(1),
                max_backoff: Duration::from_secs(10),
            },
        );

        scheduler.run(cancel).await.unwrap();
        assert_eq!(scheduler.current_backoff(), Duration::from_secs(10));
        assert_eq!(gaps(&scheduler.task().step_times), vec![2, 4, 8, 10, 10, 10]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_first_cycle_still_stops() {
        let (handle, cancel) = shutdown_channel();
        handle.request_shutdown(ShutdownSignal::Requested);
        let task = ScriptedTask::new(&[true], handle);
        let mut scheduler = Scheduler::new(task, config());

        scheduler.run(cancel).await.unwrap();

        let task = scheduler.into_task();
        assert_eq!(task.starts, 1);
        assert_eq!(task.steps, 0);
        assert_eq!(task.stops, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_cuts_sleep_short() {
        let (handle, cancel) = shutdown_channel();
        let task = ScriptedTask::new(&[true, true, true, true], handle.clone());
        let mut scheduler = Scheduler::new(
            task,
            SchedulerConfig {
                interval: Duration::from_secs(3600),
                max_backoff: Duration::from_secs(60),
            },
        );

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            handle.request_shutdown(ShutdownSignal::Interrupt);
        });

        let start = Instant::now();
        scheduler.run(cancel).await.unwrap();
        canceller.await.unwrap();

        assert_eq!(scheduler.task().steps, 1);
        assert!(start.elapsed() < Duration::from_secs(3600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_failure_is_fatal_and_stop_runs() {
        let (handle, cancel) = shutdown_channel();
        let mut task = ScriptedTask::new(&[true], handle);
        task.fail_start = true;
        let mut scheduler = Scheduler::new(task, config());

        let err = scheduler.run(cancel).await.unwrap_err();
        assert!(matches!(err, CopyTradeError::Session(_)));

        let task = scheduler.task();
        assert_eq!(task.steps, 0);
        assert_eq!(task.stops, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_failure_propagates() {
        let (handle, cancel) = shutdown_channel();
        let mut task = ScriptedTask::new(&[false], handle);
        task.fail_stop = true;
        let mut scheduler = Scheduler::new(task, config());

        let err = scheduler.run(cancel).await.unwrap_err();
        assert!(err.to_string().contains("close failed"));
        assert_eq!(scheduler.task().stops, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_step_panic_still_stops_then_resumes() {
        let (handle, cancel) = shutdown_channel();
        let mut task = ScriptedTask::new(&[true, true], handle);
        task.panic_on_step = true;
        let mut scheduler = Scheduler::new(task, config());

        let result = AssertUnwindSafe(scheduler.run(cancel)).catch_unwind().await;
        assert!(result.is_err());

        let task = scheduler.task();
        assert_eq!((task.starts, task.steps, task.stops), (1, 1, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_once_panic_still_stops() {
        let (handle, _cancel) = shutdown_channel();
        let mut task = ScriptedTask::new(&[true], handle);
        task.panic_on_step = true;
        let mut scheduler = Scheduler::new(task, config());

        let result = AssertUnwindSafe(scheduler.run_once()).catch_unwind().await;
        assert!(result.is_err());
        assert_eq!(scheduler.task().stops, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_once_reports_step_error() {
        let (handle, _cancel) = shutdown_channel();
        let task = ScriptedTask::new(&[false], handle);
        let mut scheduler = Scheduler::new(task, config());

        assert!(scheduler.run_once().await.is_err());
        let task = scheduler.task();
        assert_eq!((task.starts, task.steps, task.stops), (1, 1, 1));
    }
}
