/// Broadcast fan-out of alert events to delivery sinks

use anyhow::Result;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::engine::{AlertEvent, AlertKind};

/// Hands alert events to whoever is subscribed (web handler, desktop
/// notifier, log sink). Lossy for slow subscribers, which is acceptable
/// for advisory alerts.
#[derive(Debug, Clone)]
pub struct AlertBus {
    tx: broadcast::Sender<AlertEvent>,
}

impl AlertBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        debug!("alert bus initialized with capacity 256");
        Self { tx }
    }

    /// Publishes one event. An error here only means nobody is listening,
    /// which must not disturb the poll cycle; callers log and move on.
    pub fn publish(&self, event: AlertEvent) -> Result<usize> {
        let receivers = self.tx.send(event)?;
        Ok(receivers)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AlertEvent> {
        self.tx.subscribe()
    }
}

impl Default for AlertBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Built-in delivery sink that writes every alert through tracing,
/// severity picked by alert kind. Runs until the bus is dropped.
pub async fn run_log_sink(mut rx: broadcast::Receiver<AlertEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => match event.kind {
                AlertKind::TrendStreak | AlertKind::ThresholdLow | AlertKind::ThresholdHigh => {
                    warn!(
                        symbol = %event.symbol,
                        kind = ?event.kind,
                        emitted_at = %event.emitted_at,
                        "{}",
                        event.message
                    )
                }
                AlertKind::SimpleRiser | AlertKind::SimpleFaller => {
                    info!(
                        symbol = %event.symbol,
                        kind = ?event.kind,
                        emitted_at = %event.emitted_at,
                        "{}",
                        event.message
                    )
                }
            },
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!(missed, "log sink lagged behind the alert bus");
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("alert bus closed, log sink stopping");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event(kind: AlertKind) -> AlertEvent {
        AlertEvent {
            symbol: "BTC".to_string(),
            kind,
            message: "test".to_string(),
            emitted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = AlertBus::new();
        let mut rx = bus.subscribe();
        bus.publish(event(AlertKind::SimpleRiser)).expect("publish");
        let received = rx.recv().await.expect("recv");
        assert_eq!(received.kind, AlertKind::SimpleRiser);
        assert_eq!(received.symbol, "BTC");
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_an_error_not_a_panic() {
        let bus = AlertBus::new();
        assert!(bus.publish(event(AlertKind::ThresholdLow)).is_err());
    }
}
