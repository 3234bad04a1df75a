use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::core::gamma::gamma_score;
use crate::models::{OptionKind, Quote};

const MIN_TIME_YEARS: f64 = 1.0 / 365.0;

/// Fixed model inputs for the fair-value heuristic. This is deliberately a
/// flat-volatility, no-dividend shortcut, not a calibrated Greeks engine;
/// downstream consumers treat the output as a screening signal only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PricingParams {
    pub days_to_expiry: f64,
    pub volatility: f64,
    pub risk_free_rate: f64,
}

impl Default for PricingParams {
    fn default() -> Self {
        Self {
            days_to_expiry: 7.0,
            volatility: 0.20,
            risk_free_rate: 0.06,
        }
    }
}

impl PricingParams {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            days_to_expiry: cfg.days_to_expiry,
            volatility: cfg.volatility,
            risk_free_rate: cfg.risk_free_rate,
        }
    }

    fn time_years(&self) -> f64 {
        (self.days_to_expiry / 365.0).max(MIN_TIME_YEARS)
    }

    /// Heuristic fair value. Degenerate inputs and any non-finite
    /// intermediate yield 0.
    pub fn fair_value(&self, spot: f64, strike: f64, kind: OptionKind) -> f64 {
        if strike <= 0.0 {
            return 0.0;
        }
        let t = self.time_years();
        let vol_sqrt_t = self.volatility * t.sqrt();
        let d1 = ((spot / strike).ln()
            + (self.risk_free_rate + 0.5 * self.volatility * self.volatility) * t)
            / vol_sqrt_t;
        let d2 = d1 - vol_sqrt_t;
        let discount = (-self.risk_free_rate * t).exp();

        let value = match kind {
            OptionKind::Call => spot * norm_cdf(d1) - strike * discount * norm_cdf(d2),
            OptionKind::Put => strike * discount * norm_cdf(-d2) - spot * norm_cdf(-d1),
        };

        if value.is_finite() {
            value.max(0.0)
        } else {
            0.0
        }
    }

    /// Probability the contract expires in the money under the lognormal
    /// drift-free shortcut. Unknown/degenerate inputs yield 0.5.
    pub fn profit_probability(&self, spot: f64, strike: f64, kind: OptionKind) -> f64 {
        if strike <= 0.0 || spot <= 0.0 {
            return 0.5;
        }
        let t = self.time_years();
        let d = ((spot / strike).ln() - 0.5 * self.volatility * self.volatility * t)
            / (self.volatility * t.sqrt());
        if !d.is_finite() {
            return 0.5;
        }
        match kind {
            OptionKind::Call => 1.0 - norm_cdf(d),
            OptionKind::Put => norm_cdf(d),
        }
    }
}

/// Intrinsic upside per unit of premium paid. 0 when there is no premium
/// at risk.
pub fn risk_reward(spot: f64, strike: f64, kind: OptionKind, ltp: f64) -> f64 {
    let intrinsic = match kind {
        OptionKind::Call => (spot - strike).max(0.0),
        OptionKind::Put => (strike - spot).max(0.0),
    };
    if ltp > 0.0 {
        (intrinsic - ltp) / ltp
    } else {
        0.0
    }
}

/// Standard normal CDF.
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + libm::erf(x / std::f64::consts::SQRT_2))
}

/// Per-contract, per-cycle derived metrics. Pure function of the quote,
/// the underlying spot and the fixed model parameters; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionAnalytics {
    pub fair_value: f64,
    pub discount_pct: f64,
    pub profit_probability: f64,
    pub risk_reward: f64,
    pub gamma_score: f64,
}

pub fn analyze(
    params: &PricingParams,
    kind: OptionKind,
    strike: i64,
    quote: &Quote,
    spot: f64,
    volume_change: Option<i64>,
    oi_change: Option<i64>,
) -> OptionAnalytics {
    let strike_f = strike as f64;
    let fair_value = params.fair_value(spot, strike_f, kind);
    let discount_pct = if fair_value > 0.0 {
        (fair_value - quote.ltp) / fair_value * 100.0
    } else {
        0.0
    };

    OptionAnalytics {
        fair_value,
        discount_pct,
        profit_probability: params.profit_probability(spot, strike_f, kind),
        risk_reward: risk_reward(spot, strike_f, kind, quote.ltp),
        gamma_score: gamma_score(
            spot,
            strike_f,
            kind,
            quote.volume,
            volume_change,
            quote.oi,
            oi_change,
        ),
    }
}
