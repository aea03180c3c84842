use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How the follower position is closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExitMode {
    /// Exit when the leader exits
    #[default]
    Mirror,
    /// Exit managed independently of the leader
    Independent,
}

impl std::fmt::Display for ExitMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitMode::Mirror => write!(f, "MIRROR"),
            ExitMode::Independent => write!(f, "INDEPENDENT"),
        }
    }
}

/// Risk gate verdict for one leader trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionDecision {
    pub allow: bool,
    pub reason: String,
    pub copy_size: Decimal,
    pub limit_price: Decimal,
    pub mode: ExitMode,
}

impl ExecutionDecision {
    pub fn approve(copy_size: Decimal, limit_price: Decimal, mode: ExitMode) -> Self {
        Self {
            allow: true,
            reason: "OK".to_string(),
            copy_size,
            limit_price,
            mode,
        }
    }

    /// Rejections carry zero size and price.
    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            allow: false,
            reason: reason.into(),
            copy_size: Decimal::ZERO,
            limit_price: Decimal::ZERO,
            mode: ExitMode::default(),
        }
    }
}

/// Outcome recorded for a processed trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExecutionStatus {
    /// Denied by the risk gate
    Skipped,
    /// Follower order executed
    Filled,
    /// Follower order attempted but not executed
    Failed,
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStatus::Skipped => write!(f, "SKIPPED"),
            ExecutionStatus::Filled => write!(f, "FILLED"),
            ExecutionStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Free-form execution details reported by the order executor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionDetails {
    pub latency_ms: Option<f64>,
    pub order_id: Option<String>,
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reject_zeroes_size_and_price() {
        let decision = ExecutionDecision::reject("Exposure limit reached");
        assert!(!decision.allow);
        assert_eq!(decision.reason, "Exposure limit reached");
        assert_eq!(decision.copy_size, Decimal::ZERO);
        assert_eq!(decision.limit_price, Decimal::ZERO);
    }

    #[test]
    fn test_approve() {
        let decision = ExecutionDecision::approve(dec!(5), dec!(0.54), ExitMode::Independent);
        assert!(decision.allow);
        assert_eq!(decision.reason, "OK");
        assert_eq!(decision.mode, ExitMode::Independent);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&ExecutionStatus::Skipped).unwrap(),
            "\"SKIPPED\""
        );
        assert_eq!(serde_json::to_string(&ExitMode::Mirror).unwrap(), "\"MIRROR\"");
        assert_eq!(ExitMode::Independent.to_string(), "INDEPENDENT");
    }
}
