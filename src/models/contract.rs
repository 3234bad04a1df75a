use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionKind {
    #[serde(rename = "CE")]
    Call,
    #[serde(rename = "PE")]
    Put,
}

impl OptionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKind::Call => "CE",
            OptionKind::Put => "PE",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<OptionKind> {
        match s {
            "CE" | "CALL" | "call" => Some(OptionKind::Call),
            "PE" | "PUT" | "put" => Some(OptionKind::Put),
            _ => None,
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifies one contract across cycles. NSE index strikes are integral
/// rupees, so the strike is stored as i64 and usable as a map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContractKey {
    pub index: String,
    pub strike: i64,
    pub kind: OptionKind,
}

impl ContractKey {
    pub fn new(index: &str, strike: i64, kind: OptionKind) -> Self {
        Self {
            index: index.to_string(),
            strike,
            kind,
        }
    }
}

impl fmt::Display for ContractKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.index, self.strike, self.kind)
    }
}

/// Current-cycle quote for one contract. Rebuilt from every snapshot;
/// never persisted. Fields the upstream omits default to zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Quote {
    pub ltp: f64,
    pub ltp_change: f64,
    pub bid: f64,
    pub ask: f64,
    pub volume: i64,
    pub oi: i64,
    pub oi_change: i64,
    pub oi_change_pct: f64,
    pub prev_oi: i64,
}

/// One normalized snapshot of the option chain: the visible strike ladder
/// and a quote per (strike, kind), plus the underlying spot. Quotes are
/// keyed in a `BTreeMap` so iteration order is the (index, strike, kind)
/// order, stable across snapshots.
#[derive(Debug, Clone, Default)]
pub struct OptionChain {
    pub index: String,
    pub spot: f64,
    pub expiry: String,
    pub fetched_at: Option<DateTime<Utc>>,
    strikes: Vec<i64>,
    quotes: BTreeMap<ContractKey, Quote>,
}

impl OptionChain {
    pub fn new(index: &str, spot: f64, expiry: &str, quotes: BTreeMap<ContractKey, Quote>) -> Self {
        let mut strikes: Vec<i64> = quotes.keys().map(|k| k.strike).collect();
        strikes.sort_unstable();
        strikes.dedup();

        // Spot missing upstream: fall back to the median of the ladder.
        let spot = if spot > 0.0 {
            spot
        } else if strikes.is_empty() {
            0.0
        } else {
            strikes[strikes.len() / 2] as f64
        };

        Self {
            index: index.to_string(),
            spot,
            expiry: expiry.to_string(),
            fetched_at: Some(Utc::now()),
            strikes,
            quotes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Sorted, deduplicated strike ladder.
    pub fn strikes(&self) -> &[i64] {
        &self.strikes
    }

    pub fn quote(&self, key: &ContractKey) -> Option<&Quote> {
        self.quotes.get(key)
    }

    /// Quotes in (strike, kind) key order.
    pub fn contracts(&self) -> impl Iterator<Item = (&ContractKey, &Quote)> {
        self.quotes.iter()
    }

    /// Strike closest to spot.
    pub fn atm_strike(&self) -> Option<i64> {
        self.strikes.iter().copied().min_by(|a, b| {
            let da = (*a as f64 - self.spot).abs();
            let db = (*b as f64 - self.spot).abs();
            da.total_cmp(&db)
        })
    }

    /// Index of the ATM strike within the sorted ladder.
    pub fn atm_index(&self) -> Option<usize> {
        let atm = self.atm_strike()?;
        self.strikes.iter().position(|&s| s == atm)
    }

    /// LTP for (strike, kind), or None when the leg is not quoted.
    pub fn ltp(&self, strike: i64, kind: OptionKind) -> Option<f64> {
        self.quotes
            .get(&ContractKey::new(&self.index, strike, kind))
            .map(|q| q.ltp)
    }

    /// Put-call ratio over total open interest; None when no call OI.
    pub fn pcr(&self) -> Option<f64> {
        let call_oi: i64 = self
            .quotes
            .iter()
            .filter(|(k, _)| k.kind == OptionKind::Call)
            .map(|(_, q)| q.oi)
            .sum();
        let put_oi: i64 = self
            .quotes
            .iter()
            .filter(|(k, _)| k.kind == OptionKind::Put)
            .map(|(_, q)| q.oi)
            .sum();
        if call_oi > 0 {
            Some(put_oi as f64 / call_oi as f64)
        } else {
            None
        }
    }
}
