//! Collaborator interfaces consumed by the copy-trading pipeline

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::{ExecutionDecision, ExecutionDetails, LeaderTrade};
use crate::error::Result;

/// Source of leader trades (activity pages, APIs, ...)
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Trades observed for `leaders` since `checkpoint` (epoch seconds).
    /// May return trades the pipeline has already seen.
    async fn discover_since(&self, checkpoint: f64, leaders: &[String]) -> Result<Vec<LeaderTrade>>;
}

/// Result of a liquidity / spread check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketCheck {
    pub feasible: bool,
    pub reason: String,
}

impl MarketCheck {
    pub fn feasible() -> Self {
        Self {
            feasible: true,
            reason: "OK".to_string(),
        }
    }

    pub fn infeasible(reason: impl Into<String>) -> Self {
        Self {
            feasible: false,
            reason: reason.into(),
        }
    }
}

/// Market state check run by the risk gate.
///
/// An infeasible market is a normal `Ok` result; `Err` means the check
/// itself could not run and fails the cycle.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MarketChecker: Send + Sync {
    async fn check(&self, trade: &LeaderTrade) -> Result<MarketCheck>;
}

/// Outcome of one follower order attempt
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionReport {
    pub success: bool,
    pub details: ExecutionDetails,
}

/// Places follower orders
#[cfg_attr(test, automock)]
#[async_trait]
pub trait OrderExecutor: Send + Sync {
    async fn execute(
        &self,
        trade: &LeaderTrade,
        decision: &ExecutionDecision,
    ) -> Result<ExecutionReport>;
}

/// Login / session lifecycle around the scheduler run
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SessionManager: Send + Sync {
    async fn open(&self) -> Result<()>;

    async fn close(&self) -> Result<()>;
}
