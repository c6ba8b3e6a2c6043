mod config;
mod marketplace;
mod models;
mod monitor;
mod notifier;
mod scheduler;

use std::sync::Arc;

use config::Config;
use marketplace::TgtgClient;
use monitor::Watcher;
use notifier::{Notifier, TelegramMessenger};
use scheduler::Scheduler;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tgtg_watch=info")),
        )
        .init();

    info!("🥡 TGTG Watch v{}", env!("CARGO_PKG_VERSION"));
    info!("==========================================");

    // Missing credentials end the process here, before anything is sent
    let config = Config::load()?;
    info!("Configuration: {:?}", config);

    let source = Arc::new(TgtgClient::new(config.tgtg.clone())?);
    let messenger = Arc::new(TelegramMessenger::new(&config.telegram)?);
    let notifier = Notifier::new(messenger);

    let scheduler = Scheduler::new(
        Watcher::new(source, notifier.clone()),
        notifier,
        config.schedule.check_interval(),
        config.schedule.heartbeat_interval(),
    );

    info!("✓ Watching favorites");
    scheduler.run().await;

    Ok(())
}
