use serde::Serialize;
use std::collections::HashMap;

use crate::config::Config;
use crate::core::history::QuoteHistory;
use crate::core::pricing::PricingParams;
use crate::core::ranking::{best_by_discount, best_by_gamma, RankedContract};
use crate::models::{ContractKey, OptionChain, OptionKind};
use crate::trading::ledger::PositionLedger;

/// One ranked opportunity as rendered for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedRow {
    pub strike: i64,
    pub kind: String,
    pub ltp: String,
    pub fair_value: String,
    pub discount_pct: String,
    pub profit_probability: String,
    pub risk_reward: String,
    pub gamma_score: String,
}

/// Volume/OI change for one strike over the configured lookback, both
/// sides, in crores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeltaRow {
    pub strike: i64,
    pub ce_volume_delta: String,
    pub ce_oi_delta: String,
    pub pe_volume_delta: String,
    pub pe_oi_delta: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionRow {
    pub id: u64,
    pub contract: String,
    pub action: String,
    pub strategy: String,
    pub entry_price: String,
    pub current_ltp: String,
    pub pnl: String,
}

/// The full per-cycle rendered view for one user. Everything is already
/// formatted (two decimals, Cr scaling) so the differ can compare by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewPayload {
    pub index: String,
    pub spot: String,
    pub expiry: String,
    pub pcr: String,
    pub discount_calls: Vec<RankedRow>,
    pub discount_puts: Vec<RankedRow>,
    pub top_gamma: Vec<RankedRow>,
    pub deltas: Vec<DeltaRow>,
    pub positions: Vec<PositionRow>,
    pub total_pnl: String,
    pub active_strategies: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewUpdate {
    Unchanged,
    Changed(ViewPayload),
}

/// Suppresses redundant emissions: per index, the previously emitted
/// payload is retained and compared by value against the new one.
#[derive(Debug, Default)]
pub struct SnapshotDiffer {
    last: HashMap<String, ViewPayload>,
}

impl SnapshotDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, index: &str, payload: ViewPayload) -> ViewUpdate {
        if self.last.get(index) == Some(&payload) {
            return ViewUpdate::Unchanged;
        }
        self.last.insert(index.to_string(), payload.clone());
        ViewUpdate::Changed(payload)
    }
}

/// Two-decimal money/ratio rendering; NaN and infinities render "0.00".
pub fn fmt2(v: f64) -> String {
    if v.is_finite() {
        format!("{:.2}", v)
    } else {
        "0.00".to_string()
    }
}

/// Volume/OI scaled to crores (1e7) at two decimals.
pub fn fmt_cr(v: i64) -> String {
    fmt2(v as f64 / 1e7)
}

fn ranked_row(row: &RankedContract) -> RankedRow {
    RankedRow {
        strike: row.key.strike,
        kind: row.key.kind.to_string(),
        ltp: fmt2(row.quote.ltp),
        fair_value: fmt2(row.analytics.fair_value),
        discount_pct: fmt2(row.analytics.discount_pct),
        profit_probability: fmt2(row.analytics.profit_probability),
        risk_reward: fmt2(row.analytics.risk_reward),
        gamma_score: fmt2(row.analytics.gamma_score),
    }
}

/// Compose the rendered cycle view for one user from the current chain,
/// the history store and the user's ledger bucket.
pub fn build_payload(
    user: &str,
    chain: &OptionChain,
    history: &QuoteHistory,
    ledger: &PositionLedger,
    cfg: &Config,
) -> ViewPayload {
    let params = PricingParams::from_config(cfg);
    let window = cfg.delta_window_minutes;

    let discount_calls = best_by_discount(
        chain,
        history,
        OptionKind::Call,
        &params,
        cfg.moneyness_band,
        window,
        cfg.rank_limit,
    );
    let discount_puts = best_by_discount(
        chain,
        history,
        OptionKind::Put,
        &params,
        cfg.moneyness_band,
        window,
        cfg.rank_limit,
    );
    let top_gamma = best_by_gamma(chain, history, &params, window, cfg.rank_limit);

    // Both delta columns read the same shared lookback window
    let deltas = chain
        .strikes()
        .iter()
        .map(|&strike| {
            let ce = history.delta(
                &ContractKey::new(&chain.index, strike, OptionKind::Call),
                window,
            );
            let pe = history.delta(
                &ContractKey::new(&chain.index, strike, OptionKind::Put),
                window,
            );
            DeltaRow {
                strike,
                ce_volume_delta: fmt_cr(ce.map(|d| d.volume).unwrap_or(0)),
                ce_oi_delta: fmt_cr(ce.map(|d| d.oi).unwrap_or(0)),
                pe_volume_delta: fmt_cr(pe.map(|d| d.volume).unwrap_or(0)),
                pe_oi_delta: fmt_cr(pe.map(|d| d.oi).unwrap_or(0)),
            }
        })
        .collect();

    let live = ledger.live_state(user, Some(chain));
    let positions = live
        .positions
        .iter()
        .map(|p| PositionRow {
            id: p.position.id,
            contract: p.position.key.to_string(),
            action: p.position.action.to_string(),
            strategy: p.position.strategy.clone(),
            entry_price: fmt2(p.position.entry_price),
            current_ltp: fmt2(p.current_ltp),
            pnl: fmt2(p.pnl),
        })
        .collect();

    ViewPayload {
        index: chain.index.clone(),
        spot: fmt2(chain.spot),
        expiry: chain.expiry.clone(),
        pcr: fmt2(chain.pcr().unwrap_or(0.0)),
        discount_calls: discount_calls.iter().map(ranked_row).collect(),
        discount_puts: discount_puts.iter().map(ranked_row).collect(),
        top_gamma: top_gamma.iter().map(ranked_row).collect(),
        deltas,
        positions,
        total_pnl: fmt2(live.total_pnl),
        active_strategies: live.active_strategies,
    }
}
