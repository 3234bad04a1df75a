pub mod ledger;
pub mod signals;
pub mod strategies;

pub use ledger::{ExitOutcome, LiveState, PositionLedger, SharedLedger};
pub use signals::{AtmSignal, SignalEngine};
pub use strategies::StrategyKind;
