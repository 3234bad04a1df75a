mod bot;

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use options_desk::broker::FyersClient;
use options_desk::config::Config;

use crate::bot::DeskBot;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    let broker = Box::new(FyersClient::new(&cfg));
    let shared_config = cfg.shared();

    let mut bot = DeskBot::new(shared_config, broker).await;
    bot.run().await?;

    Ok(())
}
