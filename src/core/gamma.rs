use crate::models::OptionKind;

const PROXIMITY_CAP: f64 = 30.0;
const VOLUME_CAP: f64 = 30.0;
const OI_CAP: f64 = 30.0;
const ITM_SCORE: f64 = 10.0;
const OTM_SCORE: f64 = 5.0;

/// Composite gamma-exposure heuristic in [0, 100].
///
/// Proximity to the money, volume churn and OI churn contribute up to 30
/// points each; moneyness contributes 10 (ITM) or 5 (OTM). Changes are
/// optional because a contract may have too little history for a window
/// delta; unknown changes score 0.
pub fn gamma_score(
    spot: f64,
    strike: f64,
    kind: OptionKind,
    volume: i64,
    volume_change: Option<i64>,
    oi: i64,
    oi_change: Option<i64>,
) -> f64 {
    let proximity = (1.0 - (spot - strike).abs() / spot).max(0.0) * PROXIMITY_CAP;

    let volume_score = match volume_change {
        Some(change) if volume > 0 => {
            (change.unsigned_abs() as f64 / volume as f64 * 100.0).min(VOLUME_CAP)
        }
        _ => 0.0,
    };

    let oi_score = match oi_change {
        Some(change) if oi > 0 => {
            (change.unsigned_abs() as f64 / oi as f64 * 100.0).min(OI_CAP)
        }
        _ => 0.0,
    };

    let moneyness = match kind {
        OptionKind::Call if strike <= spot => ITM_SCORE,
        OptionKind::Put if strike >= spot => ITM_SCORE,
        _ => OTM_SCORE,
    };

    let total = proximity + volume_score + oi_score + moneyness;
    if total.is_finite() {
        total.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_within_bounds() {
        let cases = [
            (25000.0, 25000.0, 1_000_000, Some(900_000), 500_000, Some(400_000)),
            (25000.0, 10.0, 0, None, 0, None),
            (25000.0, 90000.0, 5, Some(-1000), 3, Some(-1000)),
            (0.0, 25000.0, 100, Some(10), 100, Some(10)),
        ];
        for (spot, strike, vol, vc, oi, oc) in cases {
            for kind in [OptionKind::Call, OptionKind::Put] {
                let s = gamma_score(spot, strike, kind, vol, vc, oi, oc);
                assert!((0.0..=100.0).contains(&s), "score {s} out of range");
            }
        }
    }

    #[test]
    fn atm_with_full_churn_scores_high() {
        // ATM, 30% volume churn, 30% OI churn, ITM call
        let s = gamma_score(
            25000.0,
            25000.0,
            OptionKind::Call,
            1000,
            Some(300),
            1000,
            Some(300),
        );
        assert!((s - 100.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_changes_score_zero_churn() {
        let s = gamma_score(25000.0, 25000.0, OptionKind::Call, 1000, None, 1000, None);
        // proximity 30 + moneyness 10 only
        assert!((s - 40.0).abs() < 1e-9);
    }

    #[test]
    fn moneyness_call_vs_put() {
        // strike below spot: ITM call, OTM put
        let call = gamma_score(25000.0, 24000.0, OptionKind::Call, 0, None, 0, None);
        let put = gamma_score(25000.0, 24000.0, OptionKind::Put, 0, None, 0, None);
        assert!((call - put - 5.0).abs() < 1e-9);
    }

    #[test]
    fn churn_components_are_capped() {
        // 500% volume churn still contributes at most 30
        let s = gamma_score(
            25000.0,
            25000.0,
            OptionKind::Call,
            100,
            Some(500),
            0,
            None,
        );
        assert!((s - 70.0).abs() < 1e-9); // 30 proximity + 30 volume + 10 ITM
    }

    #[test]
    fn zero_spot_floors_proximity() {
        // proximity divides by spot; the max(0) floor absorbs the -inf,
        // leaving only churn (10 + 10) and OTM moneyness (5)
        let s = gamma_score(0.0, 25000.0, OptionKind::Call, 100, Some(10), 100, Some(10));
        assert!((s - 25.0).abs() < 1e-9);
    }
}
