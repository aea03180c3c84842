//! Risk Gate
//!
//! Decides whether a leader trade is copied and with which parameters.
//! Checks run in order and stop at the first rejection:
//! 1. market / category exposure caps
//! 2. market liquidity and spread (delegated to a [`MarketChecker`])
//! 3. follower size must be positive
//! 4. limit price from the slippage cap
//! 5. exit mode
//!
//! The gate only reads exposures; they change after a fill, in the pipeline.

pub mod sizing;

use rust_decimal::Decimal;
use tracing::debug;

use crate::adapters::MarketChecker;
use crate::config::{CopyModeConfig, RiskConfig};
use crate::domain::{ExecutionDecision, ExitMode, LeaderTrade};
use crate::error::Result;
use crate::persistence::StateStore;

pub use sizing::{copy_size, limit_price};

pub const EXPOSURE_LIMIT_REACHED: &str = "Exposure limit reached";
pub const ZERO_COPY_SIZE: &str = "Computed copy size is zero";

pub struct RiskGate {
    risk: RiskConfig,
    copy: CopyModeConfig,
    market_checker: Box<dyn MarketChecker>,
}

impl RiskGate {
    pub fn new(
        risk: RiskConfig,
        copy: CopyModeConfig,
        market_checker: Box<dyn MarketChecker>,
    ) -> Self {
        Self {
            risk,
            copy,
            market_checker,
        }
    }

    /// Evaluate a trade against current exposures
    pub async fn evaluate(
        &self,
        trade: &LeaderTrade,
        store: &StateStore,
    ) -> Result<ExecutionDecision> {
        if !self.within_exposure_limits(trade, store) {
            return Ok(ExecutionDecision::reject(EXPOSURE_LIMIT_REACHED));
        }

        let check = self.market_checker.check(trade).await?;
        if !check.feasible {
            debug!(event_id = %trade.event_id, reason = %check.reason, "Market check rejected trade");
            return Ok(ExecutionDecision::reject(check.reason));
        }

        let size = copy_size(trade, &self.copy);
        if size <= Decimal::ZERO {
            return Ok(ExecutionDecision::reject(ZERO_COPY_SIZE));
        }

        let limit = limit_price(trade, self.risk.max_slippage);

        Ok(ExecutionDecision::approve(size, limit, self.exit_mode()))
    }

    pub fn exit_mode(&self) -> ExitMode {
        if self.risk.mirror_exits {
            ExitMode::Mirror
        } else {
            ExitMode::Independent
        }
    }

    fn within_exposure_limits(&self, trade: &LeaderTrade, store: &StateStore) -> bool {
        let limits = &self.risk.exposure_limits;

        let market_exposure = store.market_exposure(&trade.market_id);
        if market_exposure >= limits.per_market {
            debug!(
                market_id = %trade.market_id,
                exposure = %market_exposure,
                cap = %limits.per_market,
                "Market exposure cap reached"
            );
            return false;
        }

        let category = store.category_for(&trade.market_id);
        let category_exposure = store.category_exposure(category);
        if category_exposure >= limits.per_category {
            debug!(
                category,
                exposure = %category_exposure,
                cap = %limits.per_category,
                "Category exposure cap reached"
            );
            return false;
        }

        true
    }
}
