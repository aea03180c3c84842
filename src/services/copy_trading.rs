//! Copy-trading task
//!
//! One `step()` is one polling cycle:
//! - serve the circuit-breaker cooldown if tripped
//! - fetch leader trades since the checkpoint
//! - skip keys already in the ledger
//! - evaluate risk, mark the key as seen, place the follower order
//! - record every outcome, apply exposure on fills
//! - persist state
//!
//! Any error inside the cycle counts against the circuit breaker and is
//! returned to the scheduler.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::adapters::{
    DemoEventSource, DemoOrderExecutor, EventSource, LoggingSession, MarketChecker,
    OrderExecutor, SessionManager, StaticMarketChecker,
};
use crate::config::AppConfig;
use crate::coordination::{CircuitBreakerConfig, CycleCircuitBreaker, CycleTask};
use crate::domain::{now_ts, ExecutionStatus, LeaderTrade};
use crate::error::Result;
use crate::persistence::{ResultRecorder, StateStore};
use crate::risk::RiskGate;

/// External collaborators the task drives
pub struct Collaborators {
    pub event_source: Box<dyn EventSource>,
    pub market_checker: Box<dyn MarketChecker>,
    pub executor: Box<dyn OrderExecutor>,
    pub session: Box<dyn SessionManager>,
}

impl Collaborators {
    /// Built-in collaborators: synthetic trades and fills in demo mode,
    /// empty discovery and unimplemented execution otherwise
    pub fn builtin(config: &AppConfig) -> Self {
        let demo = config.runtime.demo_mode;
        Self {
            event_source: Box::new(DemoEventSource::new(demo)),
            market_checker: Box::new(StaticMarketChecker::new(config.runtime.strict_market_checks)),
            executor: Box::new(DemoOrderExecutor::new(demo)),
            session: Box::new(LoggingSession::new(config.session.base_url.clone())),
        }
    }
}

/// Per-cycle counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub discovered: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub filled: usize,
    pub failed: usize,
}

pub struct CopyTradingTask {
    leaders: Vec<String>,
    event_source: Box<dyn EventSource>,
    executor: Box<dyn OrderExecutor>,
    session: Box<dyn SessionManager>,
    risk_gate: RiskGate,
    store: StateStore,
    recorder: ResultRecorder,
    breaker: CycleCircuitBreaker,
    clock: fn() -> f64,
    last_cycle: Option<CycleSummary>,
}

impl CopyTradingTask {
    /// Build the task, loading persisted state from the output directory
    pub fn new(config: &AppConfig, collaborators: Collaborators) -> Self {
        let Collaborators {
            event_source,
            market_checker,
            executor,
            session,
        } = collaborators;

        Self {
            leaders: config.leaders.wallets.clone(),
            event_source,
            executor,
            session,
            risk_gate: RiskGate::new(config.risk.clone(), config.copy_mode.clone(), market_checker),
            store: StateStore::from_config(config),
            recorder: ResultRecorder::from_config(&config.output),
            breaker: CycleCircuitBreaker::new(CircuitBreakerConfig::from_runtime(&config.runtime)),
            clock: now_ts,
            last_cycle: None,
        }
    }

    /// Replace the wall clock used to advance the checkpoint
    pub fn with_clock(mut self, clock: fn() -> f64) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn breaker(&self) -> &CycleCircuitBreaker {
        &self.breaker
    }

    pub fn last_cycle(&self) -> Option<CycleSummary> {
        self.last_cycle
    }

    async fn process_cycle(&mut self) -> Result<CycleSummary> {
        let since = self.store.checkpoint();
        let discovered = self
            .event_source
            .discover_since(since, &self.leaders)
            .await?;

        // Optimistic: the watermark moves to "now", not to the newest trade seen.
        self.store.advance_checkpoint((self.clock)());

        let mut summary = CycleSummary::default();
        for trade in discovered.into_iter().filter(|t| t.ts > since) {
            summary.discovered += 1;
            if self.store.is_duplicate(&trade) {
                debug!(event_id = %trade.event_id, "Skipping duplicate trade");
                summary.duplicates += 1;
                continue;
            }

            match self.process_trade(&trade).await? {
                ExecutionStatus::Skipped => summary.skipped += 1,
                ExecutionStatus::Filled => summary.filled += 1,
                ExecutionStatus::Failed => summary.failed += 1,
            }
        }

        if summary.filled > 0 {
            info!("Executed {} copy orders this cycle.", summary.filled);
        }

        self.store.persist();
        Ok(summary)
    }

    async fn process_trade(&mut self, trade: &LeaderTrade) -> Result<ExecutionStatus> {
        let decision = self.risk_gate.evaluate(trade, &self.store).await?;
        self.store.record_seen(trade);

        if !decision.allow {
            debug!(event_id = %trade.event_id, reason = %decision.reason, "Trade skipped");
            self.recorder
                .append(trade, &decision, ExecutionStatus::Skipped, None);
            return Ok(ExecutionStatus::Skipped);
        }

        let report = self.executor.execute(trade, &decision).await?;
        let status = if report.success {
            self.store
                .apply_exposure(&trade.market_id, decision.copy_size);
            ExecutionStatus::Filled
        } else {
            ExecutionStatus::Failed
        };

        info!(
            event_id = %trade.event_id,
            market_id = %trade.market_id,
            side = %trade.side,
            size = %decision.copy_size,
            limit = %decision.limit_price,
            %status,
            "Copy order processed"
        );
        self.recorder
            .append(trade, &decision, status, Some(&report.details));
        Ok(status)
    }
}

#[async_trait]
impl CycleTask for CopyTradingTask {
    async fn start(&mut self) -> Result<()> {
        info!(leaders = self.leaders.len(), "Starting CopyTradingTask...");
        self.session.open().await?;
        info!("Task started.");
        Ok(())
    }

    async fn step(&mut self) -> Result<()> {
        self.breaker.cooldown_if_tripped().await;

        match self.process_cycle().await {
            Ok(summary) => {
                self.last_cycle = Some(summary);
                Ok(())
            }
            Err(e) => {
                self.breaker.record_failure(&e.to_string());
                Err(e)
            }
        }
    }

    async fn stop(&mut self) -> Result<()> {
        info!("Stopping CopyTradingTask...");
        let closed = self.session.close().await;
        self.store.persist();
        info!(
            breaker = ?self.breaker.stats(),
            seen = self.store.seen_count(),
            "Task stopped."
        );
        closed
    }
}
