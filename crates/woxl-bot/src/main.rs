//! Main entry point for the Woxl moderation bot.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use woxl_bot::WoxlBot;
use woxl_common::logging::init_logging;
use woxl_config::{ConfigCache, ConfigLoader};

/// Role-based moderation bot for Telegram group chats
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "WOXL_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Log filter, overriding the configured level (e.g. `debug`, `woxl_commands=trace`)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = ConfigLoader::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    let _log_guard = init_logging(&config.logging.to_logging_config())?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Woxl");

    let cache = Arc::new(ConfigCache::new(config));
    #[cfg(unix)]
    spawn_reload_on_sighup(Arc::clone(&cache), cli.config.clone())?;

    let bot = WoxlBot::new(cache).await.context("starting bot")?;
    if let Err(e) = bot.run(shutdown_signal()).await {
        error!(error = %e, "Bot stopped with an error");
        return Err(e.into());
    }

    info!("Woxl stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
fn spawn_reload_on_sighup(cache: Arc<ConfigCache>, path: Option<PathBuf>) -> anyhow::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangups = signal(SignalKind::hangup()).context("installing SIGHUP handler")?;
    tokio::spawn(async move {
        while hangups.recv().await.is_some() {
            if let Err(e) = cache.reload(path.as_deref()) {
                warn!(error = %e, "Configuration reload failed, keeping the previous one");
            }
        }
    });
    Ok(())
}
