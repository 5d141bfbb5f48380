use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pricewatch::alert::{run_log_sink, AlertBus};
use pricewatch::config::{Config, ConfigManager};
use pricewatch::poller::Poller;
use pricewatch::query::QueryFacade;
use pricewatch::source::CoinbaseSource;
use pricewatch::watcher::Watcher;

fn init_tracing() -> Result<()> {
    std::fs::create_dir_all("logs")?;

    let file_appender = tracing_appender::rolling::daily("logs", "pricewatch.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true)
        .compact();

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .json()
        .with_current_span(false)
        .with_span_list(false);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Keep the appender alive for the process lifetime
    std::mem::forget(guard);

    Ok(())
}

fn load_config() -> Result<Config> {
    match std::env::args().nth(1) {
        Some(path) => {
            let config = Config::load_from_file(&path)
                .with_context(|| format!("invalid configuration file {path}"))?;
            info!(%path, symbols = ?config.symbols, "configuration loaded");
            Ok(config)
        }
        None => {
            info!("no config file given, starting with defaults (empty watchlist)");
            Ok(Config::default())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    info!("pricewatch starting");

    let config = load_config()?;
    let request_timeout = Duration::from_secs(config.request_timeout_secs);
    let manager = Arc::new(ConfigManager::new(config).context("configuration rejected")?);

    let source = Arc::new(
        CoinbaseSource::new(request_timeout).context("failed to build quote client")?,
    );
    let bus = AlertBus::new();
    let watcher = Arc::new(Watcher::new(manager, source, bus));

    // Query surface for an embedding dashboard; the binary itself only
    // exercises it for the startup summary.
    let facade = QueryFacade::new(Arc::clone(&watcher));

    let (shutdown_tx, _) = broadcast::channel(4);

    let sink_rx = watcher.bus().subscribe();
    let sink_task = tokio::spawn(run_log_sink(sink_rx));

    let poller_shutdown = shutdown_tx.subscribe();
    let poller_task = tokio::spawn(Poller::new(Arc::clone(&watcher)).run(poller_shutdown));

    info!(
        tracked = watcher.config_snapshot().symbols.len(),
        "watcher running, press Ctrl+C to stop"
    );

    match signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => error!(error = %e, "failed to listen for shutdown signal"),
    }

    let _ = shutdown_tx.send(());
    match poller_task.await {
        Ok(Ok(())) => info!("poll loop stopped cleanly"),
        Ok(Err(e)) => error!(error = %e, "poll loop error during shutdown"),
        Err(e) => error!(error = %e, "poll task failed"),
    }
    sink_task.abort();

    let prices = facade.current_prices();
    if !prices.is_empty() {
        info!(symbols = prices.len(), "final snapshot recorded in logs");
    }
    info!("pricewatch shutdown complete");
    Ok(())
}
