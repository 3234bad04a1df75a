use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use options_desk::broker::OptionsBroker;
use options_desk::config::{Config, SharedConfig};
use options_desk::core::history::{QuoteHistory, QuoteSample, SharedHistory};
use options_desk::models::{ContractKey, OptionChain};
use options_desk::trading::{PositionLedger, SharedLedger, SignalEngine};
use options_desk::view::{build_payload, SnapshotDiffer, ViewUpdate};

const STATUS_LOG_INTERVAL: f64 = 60.0;

pub type SharedChain = Arc<RwLock<Option<OptionChain>>>;

/// The single ingestion loop: one fetch per cycle feeds the history store,
/// the signal engine, the ledger view and the differ. Viewers read the
/// published snapshot instead of fetching for themselves.
pub struct DeskBot {
    config: SharedConfig,
    broker: Box<dyn OptionsBroker>,
    history: SharedHistory,
    ledger: SharedLedger,
    latest: SharedChain,
    signals: SignalEngine,
    differ: SnapshotDiffer,

    last_status: Instant,
    cycles: u64,
    failures: u64,
}

impl DeskBot {
    pub async fn new(config: SharedConfig, broker: Box<dyn OptionsBroker>) -> Self {
        let cfg = config.read().await.clone();

        info!("{}", "=".repeat(60));
        info!("Options desk starting up");
        info!("Symbol: {}", cfg.index_symbol);
        info!(
            "Poll: {}s | History: {} samples | Delta window: {}min",
            cfg.poll_interval_secs, cfg.history_capacity, cfg.delta_window_minutes
        );
        info!(
            "Pricing: {}d to expiry, vol {:.0}%, rate {:.0}%",
            cfg.days_to_expiry,
            cfg.volatility * 100.0,
            cfg.risk_free_rate * 100.0
        );
        info!("{}", "=".repeat(60));

        let mut ledger = PositionLedger::new(&cfg);
        ledger.load(&cfg.default_user);
        let signals = SignalEngine::from_config(&cfg);
        let history = QuoteHistory::new(cfg.history_capacity).shared();

        Self {
            config,
            broker,
            history,
            ledger: ledger.shared(),
            latest: Arc::new(RwLock::new(None)),
            signals,
            differ: SnapshotDiffer::new(),
            last_status: Instant::now(),
            cycles: 0,
            failures: 0,
        }
    }

    /// Handle to the most recently published snapshot.
    pub fn latest(&self) -> SharedChain {
        Arc::clone(&self.latest)
    }

    pub fn ledger(&self) -> SharedLedger {
        Arc::clone(&self.ledger)
    }

    pub fn history(&self) -> SharedHistory {
        Arc::clone(&self.history)
    }

    pub async fn run(&mut self) -> Result<()> {
        info!("Desk is now running. Press Ctrl+C to stop.");

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    self.shutdown().await;
                    return Ok(());
                }
                _ = self.tick() => {}
            }
        }
    }

    async fn tick(&mut self) {
        let cfg = self.config.read().await.clone();
        self.cycles += 1;

        let timeout = Duration::from_secs(cfg.fetch_timeout_secs);
        let fetched = tokio::time::timeout(timeout, self.broker.fetch_option_chain()).await;

        match fetched {
            Ok(Ok(chain)) if !chain.is_empty() => {
                self.ingest(chain, &cfg).await;
            }
            Ok(Ok(_)) => {
                self.failures += 1;
                warn!("Empty chain snapshot; serving last-good data");
            }
            Ok(Err(e)) => {
                self.failures += 1;
                warn!("Fetch failed: {e}; serving last-good data");
            }
            Err(_) => {
                self.failures += 1;
                warn!(
                    "Fetch timed out after {}s; serving last-good data",
                    cfg.fetch_timeout_secs
                );
            }
        }

        self.emit_view(&cfg).await;

        if self.last_status.elapsed().as_secs_f64() > STATUS_LOG_INTERVAL {
            self.print_status(&cfg).await;
            self.last_status = Instant::now();
        }

        tokio::time::sleep(Duration::from_secs(cfg.poll_interval_secs)).await;
    }

    /// Fold one good snapshot into the desk state: history samples for every
    /// contract, ATM threshold checks, then publish.
    async fn ingest(&mut self, chain: OptionChain, cfg: &Config) {
        let now = chain.fetched_at.unwrap_or_else(Utc::now);
        {
            let mut history = self.history.write().await;
            for (key, quote) in chain.contracts() {
                history.append(
                    key,
                    QuoteSample {
                        timestamp: now,
                        volume: quote.volume,
                        oi: quote.oi,
                    },
                );
            }
        }

        for signal in self.signals.check(&chain) {
            info!(
                "ATM signal: {} {} crossed at {:.2}",
                signal.strike, signal.kind, signal.price
            );
            let key = ContractKey::new(&chain.index, signal.strike, signal.kind);
            let mut ledger = self.ledger.write().await;
            ledger.add_signal(&cfg.default_user, key, signal.price);
        }

        *self.latest.write().await = Some(chain);
    }

    /// Rebuild the rendered view from published state and log only when it
    /// differs from the previous cycle.
    async fn emit_view(&mut self, cfg: &Config) {
        let latest = self.latest.read().await;
        let Some(chain) = latest.as_ref() else {
            debug!("No snapshot yet; market data unavailable");
            return;
        };

        let history = self.history.read().await;
        let ledger = self.ledger.read().await;
        let payload = build_payload(&cfg.default_user, chain, &history, &ledger, cfg);

        match self.differ.observe(&chain.index, payload) {
            ViewUpdate::Changed(p) => {
                debug!(
                    "View update: spot {} pcr {} | {} gamma rows | pnl {}",
                    p.spot,
                    p.pcr,
                    p.top_gamma.len(),
                    p.total_pnl
                );
            }
            ViewUpdate::Unchanged => {}
        }
    }

    async fn print_status(&self, cfg: &Config) {
        let latest = self.latest.read().await;
        let ledger = self.ledger.read().await;
        let live = ledger.live_state(&cfg.default_user, latest.as_ref());

        info!(
            "Cycles: {} | Failures: {} | Positions: {} | PnL: {:+.2}",
            self.cycles,
            self.failures,
            live.positions.len(),
            live.total_pnl
        );
        if let Some(chain) = latest.as_ref() {
            info!(
                "{}: spot {:.2} | {} contracts | expiry {}",
                chain.index,
                chain.spot,
                chain.len(),
                chain.expiry
            );
        }
    }

    async fn shutdown(&mut self) {
        info!("Shutting down...");
        let cfg = self.config.read().await.clone();
        self.ledger.read().await.save(&cfg.default_user);
        self.print_status(&cfg).await;
        info!("Desk stopped.");
    }
}
