use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::broker::{FeedError, OptionsBroker};
use crate::config::Config;
use crate::models::{ContractKey, OptionChain, OptionKind, Quote};

const BASE_URL: &str = "https://api-t1.fyers.in/data";
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Deserialize)]
struct ChainResponse {
    #[serde(default)]
    s: String,
    data: Option<ChainData>,
}

#[derive(Debug, Deserialize)]
struct ChainData {
    #[serde(rename = "optionsChain", default)]
    options_chain: Vec<RawContract>,
    #[serde(rename = "underlyingValue", default)]
    underlying_value: Option<f64>,
}

/// One row of the upstream chain. Everything the vendor may omit carries a
/// serde default so a sparse row degrades to zeros instead of failing the
/// whole snapshot.
#[derive(Debug, Deserialize)]
struct RawContract {
    #[serde(default)]
    strike_price: f64,
    #[serde(default)]
    option_type: String,
    #[serde(default)]
    ltp: f64,
    #[serde(default)]
    ltpch: f64,
    #[serde(default)]
    bid: f64,
    #[serde(default)]
    ask: f64,
    #[serde(default)]
    volume: i64,
    #[serde(default)]
    oi: i64,
    #[serde(default)]
    oich: i64,
    #[serde(default)]
    oichp: f64,
    #[serde(default)]
    prev_oi: i64,
    #[serde(rename = "expiryDate", default)]
    expiry_date: Option<String>,
}

pub struct FyersClient {
    client: Client,
    app_id: String,
    access_token: String,
    symbol: String,
    strike_count: usize,
    last_request: Option<Instant>,
}

impl FyersClient {
    pub fn new(cfg: &Config) -> Self {
        Self {
            client: Client::new(),
            app_id: cfg.fyers_app_id.clone(),
            access_token: cfg.fyers_access_token.clone(),
            symbol: cfg.index_symbol.clone(),
            strike_count: cfg.strike_count,
            last_request: None,
        }
    }

    async fn rate_limit(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < MIN_REQUEST_INTERVAL {
                tokio::time::sleep(MIN_REQUEST_INTERVAL - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }

    async fn fetch(&mut self) -> Result<OptionChain, FeedError> {
        self.rate_limit().await;

        let resp = self
            .client
            .get(format!("{}/options-chain-v3", BASE_URL))
            .query(&[
                ("symbol", self.symbol.as_str()),
                ("strikecount", &self.strike_count.to_string()),
            ])
            .header(
                "Authorization",
                format!("{}:{}", self.app_id, self.access_token),
            )
            .send()
            .await
            .map_err(|e| FeedError::Upstream(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FeedError::Upstream(format!("{status}: {body}")));
        }

        let parsed: ChainResponse = resp
            .json()
            .await
            .map_err(|e| FeedError::InvalidPayload(e.to_string()))?;

        let data = parsed.data.ok_or_else(|| {
            FeedError::InvalidPayload(format!("no data field (s={})", parsed.s))
        })?;

        Ok(normalize(&self.symbol, data))
    }
}

#[async_trait]
impl OptionsBroker for FyersClient {
    async fn fetch_option_chain(&mut self) -> Result<OptionChain, FeedError> {
        self.fetch().await
    }
}

/// Turn one raw upstream snapshot into the uniform chain: one Quote per
/// (strike, kind), the sorted ladder, the expiry from the first row that
/// carries one, and the spot (median-strike fallback inside OptionChain).
fn normalize(index: &str, data: ChainData) -> OptionChain {
    let mut quotes: BTreeMap<ContractKey, Quote> = BTreeMap::new();
    let mut expiry = "-".to_string();

    for raw in &data.options_chain {
        if let (Some(exp), true) = (&raw.expiry_date, expiry == "-") {
            if !exp.is_empty() {
                expiry = exp.clone();
            }
        }

        // The vendor interleaves an index row (no strike / no type); skip it
        let Some(kind) = OptionKind::from_str_loose(&raw.option_type) else {
            continue;
        };
        if raw.strike_price <= 0.0 {
            continue;
        }

        let key = ContractKey::new(index, raw.strike_price.round() as i64, kind);
        quotes.insert(
            key,
            Quote {
                ltp: raw.ltp,
                ltp_change: raw.ltpch,
                bid: raw.bid,
                ask: raw.ask,
                volume: raw.volume,
                oi: raw.oi,
                oi_change: raw.oich,
                oi_change_pct: raw.oichp,
                prev_oi: raw.prev_oi,
            },
        );
    }

    OptionChain::new(
        index,
        data.underlying_value.unwrap_or(0.0),
        &expiry,
        quotes,
    )
}
