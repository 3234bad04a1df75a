//! Shared fixtures for unit tests. Compiled only under `cfg(test)`.

use std::collections::BTreeMap;

use crate::config::Config;
use crate::models::{ContractKey, OptionChain, OptionKind, Quote};

/// A chain with both kinds quoted at every strike: ltp 100, tight spread,
/// equal volume and OI on both sides (so PCR is exactly 1).
pub fn make_chain(index: &str, spot: f64, strikes: &[i64]) -> OptionChain {
    let mut quotes = BTreeMap::new();
    for &strike in strikes {
        for kind in [OptionKind::Call, OptionKind::Put] {
            quotes.insert(
                ContractKey::new(index, strike, kind),
                Quote {
                    ltp: 100.0,
                    ltp_change: 0.5,
                    bid: 99.5,
                    ask: 100.5,
                    volume: 1000,
                    oi: 5000,
                    oi_change: 100,
                    oi_change_pct: 2.0,
                    prev_oi: 4900,
                },
            );
        }
    }
    OptionChain::new(index, spot, "25-09-2025", quotes)
}

/// A chain where each strike carries an explicit (CE ltp, PE ltp) pair.
pub fn make_chain_with_ltps(index: &str, spot: f64, rows: &[(i64, f64, f64)]) -> OptionChain {
    let mut quotes = BTreeMap::new();
    for &(strike, ce_ltp, pe_ltp) in rows {
        quotes.insert(
            ContractKey::new(index, strike, OptionKind::Call),
            Quote {
                ltp: ce_ltp,
                volume: 1000,
                oi: 5000,
                ..Quote::default()
            },
        );
        quotes.insert(
            ContractKey::new(index, strike, OptionKind::Put),
            Quote {
                ltp: pe_ltp,
                volume: 1000,
                oi: 5000,
                ..Quote::default()
            },
        );
    }
    OptionChain::new(index, spot, "25-09-2025", quotes)
}

/// Config for tests: deterministic values, no env reads, persistence off
/// (empty data_dir).
pub fn default_test_config() -> Config {
    Config {
        index_symbol: "NIFTY".to_string(),
        strike_count: 10,
        fyers_app_id: String::new(),
        fyers_access_token: String::new(),
        poll_interval_secs: 1,
        fetch_timeout_secs: 5,
        history_capacity: 600,
        delta_window_minutes: 1,
        days_to_expiry: 7.0,
        volatility: 0.20,
        risk_free_rate: 0.06,
        rank_limit: 5,
        moneyness_band: 100.0,
        lot_size: 75,
        default_user: "desk".to_string(),
        ce_entry_threshold: None,
        pe_entry_threshold: None,
        data_dir: String::new(),
        log_level: "INFO".to_string(),
    }
}
