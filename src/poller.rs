/// Periodic poll loop driving fetch-record-alert cycles

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::broadcast;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::watcher::Watcher;

/// Timer-driven cycle runner. Exactly one cycle is in flight at a time:
/// the loop awaits the full cycle before taking the next tick, and a slow
/// cycle delays rather than stacks subsequent ticks.
pub struct Poller {
    watcher: Arc<Watcher>,
}

impl Poller {
    pub fn new(watcher: Arc<Watcher>) -> Self {
        Self { watcher }
    }

    /// Runs until a shutdown signal arrives. Cycle errors never surface
    /// here; per-symbol failures are handled inside the cycle.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        let poll_secs = self.watcher.config_snapshot().poll_interval_secs.max(1);
        let mut ticker = interval(Duration::from_secs(poll_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(poll_secs, "poll loop starting");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let started = Instant::now();
                    let recorded = self.watcher.run_cycle().await;
                    debug!(
                        recorded,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "poll cycle complete"
                    );
                }
                _ = shutdown.recv() => {
                    info!("poll loop shutting down gracefully");
                    return Ok(());
                }
            }
        }
    }
}
