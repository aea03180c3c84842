//! Follower order sizing and limit pricing

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::{CopyModeConfig, SizingMode};
use crate::domain::{LeaderTrade, Side};

/// Floor for `leader_unit` in proportional sizing
pub const LEADER_UNIT_EPSILON: Decimal = dec!(0.000000001);
/// Highest limit price a BUY may use
pub const MAX_LIMIT_PRICE: Decimal = dec!(0.999);
/// Lowest limit price a SELL may use
pub const MIN_LIMIT_PRICE: Decimal = dec!(0.001);

/// Follower size for a leader trade, never negative
pub fn copy_size(trade: &LeaderTrade, copy: &CopyModeConfig) -> Decimal {
    match copy.mode {
        SizingMode::Fixed => copy.fixed_amount,
        SizingMode::Proportional => {
            let ratio = copy
                .follower_unit
                .checked_div(copy.leader_unit.max(LEADER_UNIT_EPSILON))
                .unwrap_or(Decimal::ZERO);
            trade
                .size
                .checked_mul(ratio)
                .unwrap_or(Decimal::ZERO)
                .max(Decimal::ZERO)
        }
    }
}

/// Limit price with the slippage cap applied around the leader price.
///
/// BUY: `min(0.999, price + cap)`; SELL: `max(0.001, price - cap)`.
pub fn limit_price(trade: &LeaderTrade, max_slippage: Decimal) -> Decimal {
    match trade.side {
        Side::Buy => (trade.price + max_slippage).min(MAX_LIMIT_PRICE),
        Side::Sell => (trade.price - max_slippage).max(MIN_LIMIT_PRICE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(side: Side, price: Decimal, size: Decimal) -> LeaderTrade {
        LeaderTrade {
            leader_wallet: "0xleader".to_string(),
            event_id: "e1".to_string(),
            market_id: "m".to_string(),
            market_title: "M".to_string(),
            side,
            outcome: "YES".to_string(),
            price,
            size,
            ts: 0.0,
        }
    }

    #[test]
    fn test_fixed_ignores_units() {
        let copy = CopyModeConfig {
            mode: SizingMode::Fixed,
            fixed_amount: dec!(5.0),
            leader_unit: dec!(3),
            follower_unit: dec!(7),
        };
        assert_eq!(copy_size(&trade(Side::Buy, dec!(0.5), dec!(10.0)), &copy), dec!(5.0));
    }

    #[test]
    fn test_proportional() {
        let copy = CopyModeConfig {
            mode: SizingMode::Proportional,
            leader_unit: dec!(1.0),
            follower_unit: dec!(0.1),
            ..Default::default()
        };
        assert_eq!(copy_size(&trade(Side::Buy, dec!(0.5), dec!(10.0)), &copy), dec!(1.0));
    }

    #[test]
    fn test_proportional_zero_leader_unit_uses_epsilon() {
        let copy = CopyModeConfig {
            mode: SizingMode::Proportional,
            leader_unit: Decimal::ZERO,
            follower_unit: dec!(0.000000001),
            ..Default::default()
        };
        assert_eq!(copy_size(&trade(Side::Buy, dec!(0.5), dec!(3)), &copy), dec!(3));
    }

    #[test]
    fn test_proportional_zero_size() {
        let copy = CopyModeConfig::default();
        assert_eq!(copy_size(&trade(Side::Buy, dec!(0.5), Decimal::ZERO), &copy), Decimal::ZERO);
    }

    #[test]
    fn test_buy_limit() {
        assert_eq!(limit_price(&trade(Side::Buy, dec!(0.52), dec!(1)), dec!(0.02)), dec!(0.54));
        assert_eq!(limit_price(&trade(Side::Buy, dec!(0.99), dec!(1)), dec!(0.02)), dec!(0.999));
    }

    #[test]
    fn test_sell_limit() {
        assert_eq!(limit_price(&trade(Side::Sell, dec!(0.52), dec!(1)), dec!(0.02)), dec!(0.50));
        assert_eq!(limit_price(&trade(Side::Sell, dec!(0.01), dec!(1)), dec!(0.02)), dec!(0.001));
    }
}
