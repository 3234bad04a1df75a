pub mod fyers;

pub use fyers::FyersClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::OptionChain;

/// Why a snapshot fetch produced no usable chain. Callers degrade to the
/// last-good snapshot either way, but tests and logs can tell transport
/// trouble from a garbage body.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("upstream unavailable: {0}")]
    Upstream(String),
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

#[async_trait]
pub trait OptionsBroker: Send + Sync {
    /// Fetch and normalize one snapshot of the option chain.
    async fn fetch_option_chain(&mut self) -> Result<OptionChain, FeedError>;
}
