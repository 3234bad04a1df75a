use std::collections::BTreeMap;

use options_desk::config::Config;
use options_desk::models::{ContractKey, OptionChain, OptionKind, Quote};

/// Build a chain from (strike, ce_ltp, pe_ltp, volume, oi) rows, quoting
/// both kinds at every strike.
pub fn make_chain(index: &str, spot: f64, rows: &[(i64, f64, f64, i64, i64)]) -> OptionChain {
    let mut quotes = BTreeMap::new();
    for &(strike, ce_ltp, pe_ltp, volume, oi) in rows {
        quotes.insert(
            ContractKey::new(index, strike, OptionKind::Call),
            Quote {
                ltp: ce_ltp,
                bid: ce_ltp - 0.5,
                ask: ce_ltp + 0.5,
                volume,
                oi,
                ..Quote::default()
            },
        );
        quotes.insert(
            ContractKey::new(index, strike, OptionKind::Put),
            Quote {
                ltp: pe_ltp,
                bid: pe_ltp - 0.5,
                ask: pe_ltp + 0.5,
                volume,
                oi,
                ..Quote::default()
            },
        );
    }
    OptionChain::new(index, spot, "25-09-2025", quotes)
}

pub fn test_config() -> Config {
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
