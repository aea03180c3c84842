use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trade direction observed on a leader wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Normalized representation of a leader trade event.
///
/// Produced by an [`EventSource`](crate::adapters::EventSource) and never
/// mutated afterwards. `event_id` is the idempotency key: the pipeline acts
/// on each key at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderTrade {
    pub leader_wallet: String,
    pub event_id: String,
    pub market_id: String,
    pub market_title: String,
    pub side: Side,
    /// Outcome token traded, e.g. "YES" / "NO"
    pub outcome: String,
    /// Observed price, in (0, 1)
    pub price: Decimal,
    /// Observed size, non-negative
    pub size: Decimal,
    /// Observation time, epoch seconds
    pub ts: f64,
}

/// Wall-clock time in epoch seconds, millisecond resolution
pub fn now_ts() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}
