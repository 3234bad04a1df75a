pub mod contract;
pub mod position;

pub use contract::{ContractKey, OptionChain, OptionKind, Quote};
pub use position::{LegAction, StrategyPosition};
