use serde::{Deserialize, Serialize};

use crate::core::history::QuoteHistory;
use crate::core::pricing::{analyze, OptionAnalytics, PricingParams};
use crate::models::{ContractKey, OptionChain, OptionKind, Quote};

pub const DEFAULT_LIMIT: usize = 5;

/// One ranked opportunity row: the contract, its current quote and the
/// derived metrics it was ranked on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedContract {
    pub key: ContractKey,
    pub quote: Quote,
    pub analytics: OptionAnalytics,
}

/// Top contracts of one kind by discount to fair value, restricted to an
/// at/near-the-money band: puts keep strike >= spot - band, calls keep
/// strike <= spot + band.
pub fn best_by_discount(
    chain: &OptionChain,
    history: &QuoteHistory,
    kind: OptionKind,
    params: &PricingParams,
    band: f64,
    window_minutes: u32,
    limit: usize,
) -> Vec<RankedContract> {
    let mut rows: Vec<RankedContract> = chain
        .contracts()
        .filter(|(key, _)| key.kind == kind)
        .filter(|(key, _)| match kind {
            OptionKind::Put => key.strike as f64 >= chain.spot - band,
            OptionKind::Call => key.strike as f64 <= chain.spot + band,
        })
        .map(|(key, quote)| score_row(key, quote, chain, history, params, window_minutes))
        .collect();

    // Vec::sort_by is stable, so equal discounts keep ladder order
    rows.sort_by(|a, b| {
        b.analytics
            .discount_pct
            .partial_cmp(&a.analytics.discount_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows.truncate(limit);
    rows
}

/// Top contracts of either kind by gamma-exposure score; no moneyness
/// filter.
pub fn best_by_gamma(
    chain: &OptionChain,
    history: &QuoteHistory,
    params: &PricingParams,
    window_minutes: u32,
    limit: usize,
) -> Vec<RankedContract> {
    let mut rows: Vec<RankedContract> = chain
        .contracts()
        .map(|(key, quote)| score_row(key, quote, chain, history, params, window_minutes))
        .collect();

    rows.sort_by(|a, b| {
        b.analytics
            .gamma_score
            .partial_cmp(&a.analytics.gamma_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows.truncate(limit);
    rows
}

fn score_row(
    key: &ContractKey,
    quote: &Quote,
    chain: &OptionChain,
    history: &QuoteHistory,
    params: &PricingParams,
    window_minutes: u32,
) -> RankedContract {
    let delta = history.delta(key, window_minutes);
    let analytics = analyze(
        params,
        key.kind,
        key.strike,
        quote,
        chain.spot,
        delta.map(|d| d.volume),
        delta.map(|d| d.oi),
    );
    RankedContract {
        key: key.clone(),
        quote: quote.clone(),
        analytics,
    }
}
