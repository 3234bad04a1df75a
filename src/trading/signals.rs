use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::models::{OptionChain, OptionKind};

/// A fired ATM threshold crossing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtmSignal {
    pub kind: OptionKind,
    pub strike: i64,
    pub price: f64,
}

/// Fires at most once per kind when the ATM leg's LTP crosses above a
/// user-set threshold. `reset` clears both the fired state and the
/// thresholds, re-arming the desk.
#[derive(Debug, Default)]
pub struct SignalEngine {
    ce_threshold: Option<f64>,
    pe_threshold: Option<f64>,
    ce_fired: Option<AtmSignal>,
    pe_fired: Option<AtmSignal>,
}

impl SignalEngine {
    pub fn new(ce_threshold: Option<f64>, pe_threshold: Option<f64>) -> Self {
        Self {
            ce_threshold,
            pe_threshold,
            ce_fired: None,
            pe_fired: None,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.ce_entry_threshold, cfg.pe_entry_threshold)
    }

    pub fn set_thresholds(&mut self, ce: Option<f64>, pe: Option<f64>) {
        self.ce_threshold = ce;
        self.pe_threshold = pe;
    }

    /// Evaluate the chain's ATM quotes against the thresholds. Returns the
    /// signals fired by this call only.
    pub fn check(&mut self, chain: &OptionChain) -> Vec<AtmSignal> {
        let Some(atm) = chain.atm_strike() else {
            return Vec::new();
        };
        let mut fired = Vec::new();

        if self.ce_fired.is_none() {
            if let (Some(threshold), Some(ltp)) =
                (self.ce_threshold, chain.ltp(atm, OptionKind::Call))
            {
                if ltp > threshold {
                    let signal = AtmSignal {
                        kind: OptionKind::Call,
                        strike: atm,
                        price: ltp,
                    };
                    self.ce_fired = Some(signal.clone());
                    fired.push(signal);
                }
            }
        }

        if self.pe_fired.is_none() {
            if let (Some(threshold), Some(ltp)) =
                (self.pe_threshold, chain.ltp(atm, OptionKind::Put))
            {
                if ltp > threshold {
                    let signal = AtmSignal {
                        kind: OptionKind::Put,
                        strike: atm,
                        price: ltp,
                    };
                    self.pe_fired = Some(signal.clone());
                    fired.push(signal);
                }
            }
        }

        fired
    }

    pub fn fired(&self) -> Vec<&AtmSignal> {
        self.ce_fired.iter().chain(self.pe_fired.iter()).collect()
    }

    pub fn reset(&mut self) {
        self.ce_threshold = None;
        self.pe_threshold = None;
        self.ce_fired = None;
        self.pe_fired = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::make_chain_with_ltps;

    fn chain(ce_ltp: f64, pe_ltp: f64) -> OptionChain {
        make_chain_with_ltps("NIFTY", 25000.0, &[(25000, ce_ltp, pe_ltp)])
    }

    #[test]
    fn fires_once_above_threshold() {
        let mut engine = SignalEngine::new(Some(120.0), None);

        assert!(engine.check(&chain(110.0, 90.0)).is_empty());

        let fired = engine.check(&chain(130.0, 90.0));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].kind, OptionKind::Call);
        assert_eq!(fired[0].strike, 25000);
        assert!((fired[0].price - 130.0).abs() < 1e-9);

        // Still above the threshold next cycle: no re-fire
        assert!(engine.check(&chain(140.0, 90.0)).is_empty());
        assert_eq!(engine.fired().len(), 1);
    }

    #[test]
    fn both_sides_fire_independently() {
        let mut engine = SignalEngine::new(Some(120.0), Some(100.0));
        let fired = engine.check(&chain(130.0, 110.0));
        assert_eq!(fired.len(), 2);
    }

    #[test]
    fn disarmed_without_threshold() {
        let mut engine = SignalEngine::new(None, None);
        assert!(engine.check(&chain(1e9, 1e9)).is_empty());
    }

    #[test]
    fn reset_rearms_and_clears_thresholds() {
        let mut engine = SignalEngine::new(Some(120.0), None);
        engine.check(&chain(130.0, 90.0));
        assert_eq!(engine.fired().len(), 1);

        engine.reset();
        assert!(engine.fired().is_empty());
        // Thresholds cleared: nothing fires until re-armed
        assert!(engine.check(&chain(500.0, 500.0)).is_empty());

        engine.set_thresholds(Some(120.0), None);
        assert_eq!(engine.check(&chain(130.0, 90.0)).len(), 1);
    }
}
