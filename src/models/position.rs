use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::ContractKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LegAction {
    Buy,
    Sell,
}

impl LegAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LegAction::Buy => "BUY",
            LegAction::Sell => "SELL",
        }
    }
}

impl fmt::Display for LegAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One leg of a simulated position. Immutable once created; the ledger
/// only ever appends or removes whole records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyPosition {
    pub id: u64,
    pub key: ContractKey,
    pub entry_price: f64,
    pub entry_time: String,
    pub lot_size: i64,
    pub strategy: String,
    pub action: LegAction,
    pub user: String,
}

impl StrategyPosition {
    /// P&L against the given current price. Pure projection; lot size is
    /// the fixed per-unit multiplier.
    pub fn pnl(&self, current_ltp: f64) -> f64 {
        match self.action {
            LegAction::Buy => (current_ltp - self.entry_price) * self.lot_size as f64,
            LegAction::Sell => (self.entry_price - current_ltp) * self.lot_size as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OptionKind;

    fn leg(action: LegAction) -> StrategyPosition {
        StrategyPosition {
            id: 1,
            key: ContractKey::new("NIFTY", 25000, OptionKind::Call),
            entry_price: 100.0,
            entry_time: "2025-07-01T09:30:00Z".to_string(),
            lot_size: 75,
            strategy: "MANUAL".to_string(),
            action,
            user: "desk".to_string(),
        }
    }

    #[test]
    fn buy_leg_pnl() {
        let p = leg(LegAction::Buy);
        assert!((p.pnl(80.0) - (-1500.0)).abs() < 1e-9);
        assert!((p.pnl(120.0) - 1500.0).abs() < 1e-9);
    }

    #[test]
    fn sell_leg_pnl() {
        let p = leg(LegAction::Sell);
        assert!((p.pnl(80.0) - 1500.0).abs() < 1e-9);
        assert!((p.pnl(120.0) - (-1500.0)).abs() < 1e-9);
    }

    #[test]
    fn serde_round_trip() {
        let p = leg(LegAction::Sell);
        let json = serde_json::to_string(&p).unwrap();
        let back: StrategyPosition = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, p.id);
        assert_eq!(back.action, LegAction::Sell);
        assert_eq!(back.key, p.key);
    }
}
