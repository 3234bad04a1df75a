use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::ContractKey;

pub type SharedHistory = Arc<RwLock<QuoteHistory>>;

/// Default retention: 600 samples, roughly 10 minutes at 1s cadence.
pub const DEFAULT_CAPACITY: usize = 600;

#[derive(Debug, Clone, Copy)]
pub struct QuoteSample {
    pub timestamp: DateTime<Utc>,
    pub volume: i64,
    pub oi: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowDelta {
    pub volume: i64,
    pub oi: i64,
}

/// Bounded per-contract time series of (timestamp, volume, OI) samples.
/// Timestamps are assumed non-decreasing per key; the oldest sample is
/// evicted once a series reaches capacity.
#[derive(Debug)]
pub struct QuoteHistory {
    capacity: usize,
    series: HashMap<ContractKey, VecDeque<QuoteSample>>,
}

impl QuoteHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            series: HashMap::new(),
        }
    }

    pub fn shared(self) -> SharedHistory {
        Arc::new(RwLock::new(self))
    }

    pub fn append(&mut self, key: &ContractKey, sample: QuoteSample) {
        let buf = self
            .series
            .entry(key.clone())
            .or_insert_with(|| VecDeque::with_capacity(self.capacity));
        if buf.len() == self.capacity {
            buf.pop_front();
        }
        buf.push_back(sample);
    }

    pub fn len(&self, key: &ContractKey) -> usize {
        self.series.get(key).map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Volume/OI change over the trailing `minutes` window.
    ///
    /// Baseline is the first sample at or after `latest - minutes`; when the
    /// requested window predates retained history this degrades to "change
    /// since the oldest known sample" rather than erroring. None when the
    /// key is unknown or has fewer than two samples.
    pub fn delta(&self, key: &ContractKey, minutes: u32) -> Option<WindowDelta> {
        let buf = self.series.get(key)?;
        if buf.len() < 2 {
            return None;
        }

        let latest = buf.back()?;
        let target = latest.timestamp - Duration::seconds(minutes as i64 * 60);

        let baseline = buf
            .iter()
            .find(|s| s.timestamp >= target)
            .or_else(|| buf.front())?;

        Some(WindowDelta {
            volume: latest.volume - baseline.volume,
            oi: latest.oi - baseline.oi,
        })
    }
}

impl Default for QuoteHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OptionKind;

    fn key() -> ContractKey {
        ContractKey::new("NIFTY", 25000, OptionKind::Call)
    }

    fn sample(offset_secs: i64, volume: i64, oi: i64) -> QuoteSample {
        let base = DateTime::parse_from_rfc3339("2025-07-01T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        QuoteSample {
            timestamp: base + Duration::seconds(offset_secs),
            volume,
            oi,
        }
    }

    #[test]
    fn capacity_evicts_oldest_in_order() {
        let cap = 5;
        let mut h = QuoteHistory::new(cap);
        let k = key();
        for i in 0..(cap as i64 + 3) {
            h.append(&k, sample(i, 100 + i, 500 + i));
        }
        assert_eq!(h.len(&k), cap);
        // Oldest retained sample is i=3, so a full-width delta spans 3..7
        let d = h.delta(&k, 60).unwrap();
        assert_eq!(d.volume, 4);
        assert_eq!(d.oi, 4);
    }

    #[test]
    fn delta_absent_for_unknown_key() {
        let h = QuoteHistory::default();
        assert!(h.delta(&key(), 1).is_none());
    }

    #[test]
    fn delta_absent_with_single_sample() {
        let mut h = QuoteHistory::default();
        let k = key();
        h.append(&k, sample(0, 100, 500));
        assert!(h.delta(&k, 1).is_none());
    }

    #[test]
    fn delta_picks_first_sample_inside_window() {
        // Samples at t=0 (100,500), t=30 (120,520), t=65 (140,530).
        // 1-minute window at now=65 -> target=5 -> baseline t=30.
        let mut h = QuoteHistory::default();
        let k = key();
        h.append(&k, sample(0, 100, 500));
        h.append(&k, sample(30, 120, 520));
        h.append(&k, sample(65, 140, 530));

        let d = h.delta(&k, 1).unwrap();
        assert_eq!(d.volume, 20);
        assert_eq!(d.oi, 10);
    }

    #[test]
    fn delta_degrades_to_oldest_sample() {
        let mut h = QuoteHistory::default();
        let k = key();
        h.append(&k, sample(0, 100, 500));
        h.append(&k, sample(10, 150, 540));

        // 60-minute window is wider than 10s of history: baseline = oldest
        let d = h.delta(&k, 60).unwrap();
        assert_eq!(d.volume, 50);
        assert_eq!(d.oi, 40);
    }

    #[test]
    fn series_are_independent_per_key() {
        let mut h = QuoteHistory::default();
        let call = ContractKey::new("NIFTY", 25000, OptionKind::Call);
        let put = ContractKey::new("NIFTY", 25000, OptionKind::Put);
        h.append(&call, sample(0, 100, 500));
        h.append(&call, sample(5, 110, 505));
        h.append(&put, sample(0, 10, 50));

        assert!(h.delta(&call, 1).is_some());
        assert!(h.delta(&put, 1).is_none());
    }
}
