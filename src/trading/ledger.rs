use chrono::{NaiveDate, Utc};
use chrono_tz::Asia::Kolkata;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::models::{ContractKey, LegAction, OptionChain, StrategyPosition};
use crate::trading::strategies::StrategyKind;

pub type SharedLedger = Arc<RwLock<PositionLedger>>;

pub const MANUAL_TAG: &str = "MANUAL";
pub const SIGNAL_TAG: &str = "SIGNAL";

/// Result of an exit request. `Denied` and `NotFound` leave the ledger
/// untouched; callers that treat them as no-ops can ignore the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Removed,
    Denied,
    NotFound,
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionPnl {
    pub position: StrategyPosition,
    pub current_ltp: f64,
    pub pnl: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LiveState {
    pub positions: Vec<PositionPnl>,
    pub total_pnl: f64,
    pub active_strategies: usize,
}

/// Simulated positions per user per trading day (IST calendar date).
/// All mutation goes through this type; P&L is a pure read-time projection.
pub struct PositionLedger {
    buckets: HashMap<(String, NaiveDate), Vec<StrategyPosition>>,
    next_id: u64,
    lot_size: i64,
    /// Empty disables persistence (tests, backfills).
    data_dir: String,
    /// When set, used instead of the IST clock for the day key (tests).
    pub sim_today: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LedgerSnapshot {
    user: String,
    day: NaiveDate,
    positions: Vec<StrategyPosition>,
}

impl PositionLedger {
    pub fn new(cfg: &Config) -> Self {
        Self {
            buckets: HashMap::new(),
            next_id: 0,
            lot_size: cfg.lot_size,
            data_dir: cfg.data_dir.clone(),
            sim_today: None,
        }
    }

    /// Ledger without on-disk persistence.
    pub fn in_memory(lot_size: i64) -> Self {
        Self {
            buckets: HashMap::new(),
            next_id: 0,
            lot_size,
            data_dir: String::new(),
            sim_today: None,
        }
    }

    pub fn shared(self) -> SharedLedger {
        Arc::new(RwLock::new(self))
    }

    fn today(&self) -> NaiveDate {
        self.sim_today
            .unwrap_or_else(|| Utc::now().with_timezone(&Kolkata).date_naive())
    }

    fn push_leg(
        &mut self,
        user: &str,
        key: ContractKey,
        entry_price: f64,
        action: LegAction,
        tag: &str,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        let day = self.today();
        let position = StrategyPosition {
            id,
            key,
            entry_price,
            entry_time: Utc::now().to_rfc3339(),
            lot_size: self.lot_size,
            strategy: tag.to_string(),
            action,
            user: user.to_string(),
        };
        self.buckets
            .entry((user.to_string(), day))
            .or_default()
            .push(position);
        id
    }

    /// One BUY leg at the given price, tagged MANUAL.
    pub fn add_manual(&mut self, user: &str, key: ContractKey, ltp: f64) -> u64 {
        let id = self.push_leg(user, key, ltp, LegAction::Buy, MANUAL_TAG);
        self.save(user);
        id
    }

    /// One BUY leg opened by the ATM threshold signal path.
    pub fn add_signal(&mut self, user: &str, key: ContractKey, ltp: f64) -> u64 {
        let id = self.push_leg(user, key, ltp, LegAction::Buy, SIGNAL_TAG);
        self.save(user);
        id
    }

    /// Resolve a named strategy against the chain's strike ladder and append
    /// one position per leg. Legs without a quote enter at 0. Returns the
    /// number of legs actually constructed.
    pub fn add_strategy(
        &mut self,
        user: &str,
        strategy: StrategyKind,
        chain: &OptionChain,
    ) -> usize {
        let legs = strategy.resolve(chain);
        for &(strike, kind, action) in &legs {
            let entry = chain.ltp(strike, kind).unwrap_or(0.0);
            let key = ContractKey::new(&chain.index, strike, kind);
            self.push_leg(user, key, entry, action, strategy.as_str());
        }
        if !legs.is_empty() {
            self.save(user);
        }
        legs.len()
    }

    /// Remove `position_id` from `user`'s bucket for today. Only the owner
    /// or an admin may remove; anyone else gets `Denied` and the bucket is
    /// left exactly as it was.
    pub fn exit(
        &mut self,
        user: &str,
        position_id: u64,
        requesting_user: &str,
        is_admin: bool,
    ) -> ExitOutcome {
        if requesting_user != user && !is_admin {
            return ExitOutcome::Denied;
        }
        let day = self.today();
        let Some(bucket) = self.buckets.get_mut(&(user.to_string(), day)) else {
            return ExitOutcome::NotFound;
        };
        let before = bucket.len();
        bucket.retain(|p| p.id != position_id);
        if bucket.len() == before {
            return ExitOutcome::NotFound;
        }
        self.save(user);
        ExitOutcome::Removed
    }

    /// Admins clear every user's bucket for the day; everyone else clears
    /// only their own.
    pub fn clear(&mut self, requesting_user: &str, is_admin: bool) {
        let day = self.today();
        if is_admin {
            let users: Vec<String> = self
                .buckets
                .keys()
                .filter(|(_, d)| *d == day)
                .map(|(u, _)| u.clone())
                .collect();
            for user in users {
                self.buckets.remove(&(user.clone(), day));
                self.save(&user);
            }
        } else {
            self.buckets.remove(&(requesting_user.to_string(), day));
            self.save(requesting_user);
        }
    }

    pub fn positions(&self, user: &str) -> &[StrategyPosition] {
        let day = self.today();
        self.buckets
            .get(&(user.to_string(), day))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Live P&L projection against the current chain. A leg with no quote
    /// marks at its entry price (zero P&L).
    pub fn live_state(&self, user: &str, chain: Option<&OptionChain>) -> LiveState {
        let mut positions = Vec::new();
        let mut total_pnl = 0.0;
        let mut strategies: HashSet<&str> = HashSet::new();

        for position in self.positions(user) {
            let current_ltp = chain
                .and_then(|c| c.quote(&position.key))
                .map(|q| q.ltp)
                .unwrap_or(position.entry_price);
            let pnl = position.pnl(current_ltp);
            total_pnl += pnl;
            strategies.insert(position.strategy.as_str());
            positions.push(PositionPnl {
                position: position.clone(),
                current_ltp,
                pnl,
            });
        }

        LiveState {
            positions,
            total_pnl,
            active_strategies: strategies.len(),
        }
    }

    fn snapshot_path(&self, user: &str, day: NaiveDate) -> PathBuf {
        PathBuf::from(&self.data_dir).join(format!("positions_{}_{}.json", user, day))
    }

    /// Persist the (user, today) bucket. Best-effort: a failed write is
    /// not an operational error for the desk.
    pub fn save(&self, user: &str) {
        if self.data_dir.is_empty() {
            return;
        }
        let day = self.today();
        let snapshot = LedgerSnapshot {
            user: user.to_string(),
            day,
            positions: self.positions(user).to_vec(),
        };
        let _ = fs::create_dir_all(&self.data_dir);
        if let Ok(json) = serde_json::to_string_pretty(&snapshot) {
            let _ = fs::write(self.snapshot_path(user, day), json);
        }
    }

    /// Load the persisted (user, today) bucket, replacing the in-memory
    /// bucket for that day. Missing or unreadable files leave it alone.
    pub fn load(&mut self, user: &str) {
        if self.data_dir.is_empty() {
            return;
        }
        let day = self.today();
        let Ok(content) = fs::read_to_string(self.snapshot_path(user, day)) else {
            return;
        };
        let Ok(snapshot) = serde_json::from_str::<LedgerSnapshot>(&content) else {
            return;
        };
        let max_id = snapshot.positions.iter().map(|p| p.id).max().unwrap_or(0);
        self.next_id = self.next_id.max(max_id);
        self.buckets
            .insert((user.to_string(), day), snapshot.positions);
    }
}
