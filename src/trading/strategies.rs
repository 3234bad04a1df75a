use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{LegAction, OptionChain, OptionKind};

use LegAction::{Buy, Sell};
use OptionKind::{Call, Put};

/// Named multi-leg strategies, resolved against the visible strike ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyKind {
    Straddle,
    Strangle,
    IronCondor,
    Butterfly,
    BullCall,
    BearPut,
    Calendar,
    Ratio,
}

/// (ladder offset from ATM, kind, action). Repeated entries are distinct
/// legs (butterfly body, ratio short side).
type LegSpec = (i64, OptionKind, LegAction);

const STRADDLE: &[LegSpec] = &[(0, Call, Buy), (0, Put, Buy)];
const STRANGLE: &[LegSpec] = &[(3, Call, Buy), (-3, Put, Buy)];
const IRON_CONDOR: &[LegSpec] = &[
    (2, Call, Sell),
    (-2, Put, Sell),
    (5, Call, Buy),
    (-5, Put, Buy),
];
const BUTTERFLY: &[LegSpec] = &[
    (-2, Call, Buy),
    (0, Call, Sell),
    (0, Call, Sell),
    (2, Call, Buy),
];
const BULL_CALL: &[LegSpec] = &[(-2, Call, Buy), (2, Call, Sell)];
const BEAR_PUT: &[LegSpec] = &[(2, Put, Buy), (-2, Put, Sell)];
// Same-expiry proxy for a calendar spread; the feed carries one expiry.
const CALENDAR: &[LegSpec] = &[(2, Call, Sell), (4, Call, Buy)];
const RATIO: &[LegSpec] = &[(0, Call, Buy), (3, Call, Sell), (3, Call, Sell)];

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Straddle => "STRADDLE",
            StrategyKind::Strangle => "STRANGLE",
            StrategyKind::IronCondor => "IRON_CONDOR",
            StrategyKind::Butterfly => "BUTTERFLY",
            StrategyKind::BullCall => "BULL_CALL",
            StrategyKind::BearPut => "BEAR_PUT",
            StrategyKind::Calendar => "CALENDAR",
            StrategyKind::Ratio => "RATIO",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<StrategyKind> {
        match s.to_ascii_uppercase().as_str() {
            "STRADDLE" => Some(StrategyKind::Straddle),
            "STRANGLE" => Some(StrategyKind::Strangle),
            "IRON_CONDOR" => Some(StrategyKind::IronCondor),
            "BUTTERFLY" => Some(StrategyKind::Butterfly),
            "BULL_CALL" => Some(StrategyKind::BullCall),
            "BEAR_PUT" => Some(StrategyKind::BearPut),
            "CALENDAR" => Some(StrategyKind::Calendar),
            "RATIO" => Some(StrategyKind::Ratio),
            _ => None,
        }
    }

    fn legs(&self) -> &'static [LegSpec] {
        match self {
            StrategyKind::Straddle => STRADDLE,
            StrategyKind::Strangle => STRANGLE,
            StrategyKind::IronCondor => IRON_CONDOR,
            StrategyKind::Butterfly => BUTTERFLY,
            StrategyKind::BullCall => BULL_CALL,
            StrategyKind::BearPut => BEAR_PUT,
            StrategyKind::Calendar => CALENDAR,
            StrategyKind::Ratio => RATIO,
        }
    }

    /// Resolve the leg table to concrete strikes on the chain's ladder.
    /// Offsets are relative to the ATM index and clamped to the ladder at
    /// both ends. Empty when the chain has no strikes.
    pub fn resolve(&self, chain: &OptionChain) -> Vec<(i64, OptionKind, LegAction)> {
        let ladder = chain.strikes();
        let atm = match chain.atm_index() {
            Some(i) => i as i64,
            None => return Vec::new(),
        };
        let last = ladder.len() as i64 - 1;

        self.legs()
            .iter()
            .map(|&(offset, kind, action)| {
                let idx = (atm + offset).clamp(0, last) as usize;
                (ladder[idx], kind, action)
            })
            .collect()
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
