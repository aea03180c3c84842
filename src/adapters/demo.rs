//! Built-in collaborators
//!
//! Real trade discovery and order placement live outside this crate. These
//! implementations keep the pipeline runnable end to end: in demo mode they
//! synthesize leader trades and simulated fills, otherwise discovery is
//! empty and every order attempt reports "not implemented".

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal_macros::dec;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::traits::{
    EventSource, ExecutionReport, MarketCheck, MarketChecker, OrderExecutor, SessionManager,
};
use crate::domain::{now_ts, ExecutionDecision, ExecutionDetails, LeaderTrade, Side};
use crate::error::Result;

/// Default chance that a demo poll produces a trade
pub const DEMO_TRADE_PROBABILITY: f64 = 0.15;

/// Emits an occasional synthetic BUY YES trade for a random leader
pub struct DemoEventSource {
    enabled: bool,
    probability: f64,
}

impl DemoEventSource {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            probability: DEMO_TRADE_PROBABILITY,
        }
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = probability.clamp(0.0, 1.0);
        self
    }
}

#[async_trait]
impl EventSource for DemoEventSource {
    async fn discover_since(&self, checkpoint: f64, leaders: &[String]) -> Result<Vec<LeaderTrade>> {
        debug!(leaders = leaders.len(), checkpoint, "Polling leaders");
        if !self.enabled {
            return Ok(Vec::new());
        }

        let mut rng = rand::thread_rng();
        if !rng.gen_bool(self.probability) {
            return Ok(Vec::new());
        }
        let Some(leader) = leaders.choose(&mut rng) else {
            return Ok(Vec::new());
        };

        let now = now_ts();
        Ok(vec![LeaderTrade {
            leader_wallet: leader.clone(),
            event_id: format!("demo:{}:{}", leader, now as i64),
            market_id: "demo-market-123".to_string(),
            market_title: "Demo Market".to_string(),
            side: Side::Buy,
            outcome: "YES".to_string(),
            price: dec!(0.52),
            size: dec!(10),
            ts: now,
        }])
    }
}

/// Market checker used until real depth/spread checks are wired.
///
/// Strict mode rejects everything so live runs cannot trade unchecked.
pub struct StaticMarketChecker {
    strict: bool,
}

impl StaticMarketChecker {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }
}

#[async_trait]
impl MarketChecker for StaticMarketChecker {
    async fn check(&self, _trade: &LeaderTrade) -> Result<MarketCheck> {
        if self.strict {
            return Ok(MarketCheck::infeasible(
                "Market checks not implemented (strict_market_checks enabled)",
            ));
        }
        Ok(MarketCheck::feasible())
    }
}

/// Simulated order placement
pub struct DemoOrderExecutor {
    simulate_fills: bool,
    latency: (Duration, Duration),
}

impl DemoOrderExecutor {
    pub fn new(simulate_fills: bool) -> Self {
        Self {
            simulate_fills,
            latency: (Duration::from_millis(200), Duration::from_millis(600)),
        }
    }

    pub fn with_latency(mut self, min: Duration, max: Duration) -> Self {
        self.latency = (min, max.max(min));
        self
    }
}

#[async_trait]
impl OrderExecutor for DemoOrderExecutor {
    async fn execute(
        &self,
        trade: &LeaderTrade,
        decision: &ExecutionDecision,
    ) -> Result<ExecutionReport> {
        let started = Instant::now();

        if !self.simulate_fills {
            return Ok(ExecutionReport {
                success: false,
                details: ExecutionDetails {
                    latency_ms: Some(elapsed_ms(started)),
                    order_id: None,
                    note: Some(
                        "Order placement not implemented. Enable demo_mode to test pipeline."
                            .to_string(),
                    ),
                },
            });
        }

        let (min, max) = self.latency;
        let delay = if max > min {
            rand::thread_rng().gen_range(min..=max)
        } else {
            min
        };
        tokio::time::sleep(delay).await;

        debug!(
            event_id = %trade.event_id,
            size = %decision.copy_size,
            limit = %decision.limit_price,
            "Simulated fill"
        );
        Ok(ExecutionReport {
            success: true,
            details: ExecutionDetails {
                latency_ms: Some(elapsed_ms(started)),
                order_id: Some(format!("demo-order:{}", trade.event_id)),
                note: None,
            },
        })
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    (started.elapsed().as_secs_f64() * 100_000.0).round() / 100.0
}

/// Session collaborator that only logs; real login flows plug in here
pub struct LoggingSession {
    base_url: String,
}

impl LoggingSession {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl SessionManager for LoggingSession {
    async fn open(&self) -> Result<()> {
        info!(base_url = %self.base_url, "Session opened");
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        info!("Session closed");
        Ok(())
    }
}
