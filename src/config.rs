use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

pub type SharedConfig = Arc<RwLock<Config>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Broker
    pub index_symbol: String,
    pub strike_count: usize,
    pub fyers_app_id: String,
    pub fyers_access_token: String,

    // Ingestion cadence
    pub poll_interval_secs: u64,
    pub fetch_timeout_secs: u64,

    // Time-series history
    pub history_capacity: usize,
    // Lookback for the volume/OI delta table; one knob feeds both columns.
    pub delta_window_minutes: u32,

    // Pricing model
    pub days_to_expiry: f64,
    pub volatility: f64,
    pub risk_free_rate: f64,

    // Ranking
    pub rank_limit: usize,
    pub moneyness_band: f64,

    // Positions
    pub lot_size: i64,
    pub default_user: String,

    // ATM threshold signals (unset = disarmed)
    pub ce_entry_threshold: Option<f64>,
    pub pe_entry_threshold: Option<f64>,

    // Storage & logging
    pub data_dir: String,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let env = |key: &str, default: &str| -> String {
            std::env::var(key).unwrap_or_else(|_| default.to_string())
        };

        let opt_f64 = |key: &str| -> Option<f64> {
            std::env::var(key).ok().and_then(|s| s.parse().ok())
        };

        Config {
            index_symbol: env("INDEX_SYMBOL", "NSE:NIFTY50-INDEX"),
            strike_count: env("STRIKE_COUNT", "10").parse().unwrap_or(10),
            fyers_app_id: env("FYERS_APP_ID", ""),
            fyers_access_token: env("FYERS_ACCESS_TOKEN", ""),
            poll_interval_secs: env("POLL_INTERVAL_SECS", "1").parse().unwrap_or(1),
            fetch_timeout_secs: env("FETCH_TIMEOUT_SECS", "5").parse().unwrap_or(5),
            history_capacity: env("HISTORY_CAPACITY", "600").parse().unwrap_or(600),
            delta_window_minutes: env("DELTA_WINDOW_MINUTES", "1").parse().unwrap_or(1),
            days_to_expiry: env("DAYS_TO_EXPIRY", "7").parse().unwrap_or(7.0),
            volatility: env("VOLATILITY", "0.20").parse().unwrap_or(0.20),
            risk_free_rate: env("RISK_FREE_RATE", "0.06").parse().unwrap_or(0.06),
            rank_limit: env("RANK_LIMIT", "5").parse().unwrap_or(5),
            moneyness_band: env("MONEYNESS_BAND", "100").parse().unwrap_or(100.0),
            lot_size: env("LOT_SIZE", "75").parse().unwrap_or(75),
            default_user: env("DEFAULT_USER", "desk"),
            ce_entry_threshold: opt_f64("CE_ENTRY_THRESHOLD"),
            pe_entry_threshold: opt_f64("PE_ENTRY_THRESHOLD"),
            data_dir: env("DATA_DIR", "data"),
            log_level: env("LOG_LEVEL", "INFO"),
        }
    }

    pub fn shared(self) -> SharedConfig {
        Arc::new(RwLock::new(self))
    }
}
