/// Alert rule evaluation over history and trend state

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{Config, PriceBounds};
use crate::market::{evaluate_streak, HistoryStore, StreakSignal, TrendTunables};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertKind {
    ThresholdLow,
    ThresholdHigh,
    /// Escalated up-trend (streak reached the escalation count).
    TrendStreak,
    /// Plain rising signal.
    SimpleRiser,
    /// Plain dipping signal.
    SimpleFaller,
}

/// Transient alert, produced once and handed straight to the sinks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    pub symbol: String,
    pub kind: AlertKind,
    pub message: String,
    pub emitted_at: DateTime<Utc>,
}

impl AlertEvent {
    fn new(symbol: &str, kind: AlertKind, message: String) -> Self {
        Self {
            symbol: symbol.to_string(),
            kind,
            message,
            emitted_at: Utc::now(),
        }
    }
}

/// Turns trend output and static threshold bounds into alert events, one
/// evaluation per symbol per cycle. Performs no I/O; delivery is the
/// caller's concern.
pub struct AlertEngine {
    thresholds: HashMap<String, PriceBounds>,
    tunables: TrendTunables,
}

impl AlertEngine {
    pub fn from_config(config: &Config) -> Self {
        Self {
            thresholds: config.thresholds.clone(),
            tunables: TrendTunables::from_config(config),
        }
    }

    /// Evaluates every rule for one symbol. Threshold alerts re-fire each
    /// cycle the condition holds; the only suppression in the trend rules
    /// is the escalated signal replacing the plain one.
    pub fn evaluate(&self, symbol: &str, store: &mut HistoryStore) -> Vec<AlertEvent> {
        let mut events = Vec::new();

        let latest = match store.latest(symbol) {
            Some(sample) => sample,
            None => return events,
        };

        let bounds = self.thresholds.get(symbol).copied().unwrap_or_default();
        if let Some(low) = bounds.low_alert {
            if latest.value <= low {
                events.push(AlertEvent::new(
                    symbol,
                    AlertKind::ThresholdLow,
                    format!(
                        "{} at {:.2} is at or below the low alert bound {}",
                        symbol, latest.value, low
                    ),
                ));
            }
        }
        if let Some(high) = bounds.high_alert {
            if latest.value >= high {
                events.push(AlertEvent::new(
                    symbol,
                    AlertKind::ThresholdHigh,
                    format!(
                        "{} at {:.2} is at or above the high alert bound {}",
                        symbol, latest.value, high
                    ),
                ));
            }
        }

        let values = store.values(symbol);
        let steps = self.tunables.streak_window - 1;
        let threshold = self.tunables.step_threshold_pct;
        if let Some(state) = store.trend_state_mut(symbol) {
            match evaluate_streak(&values, state, &self.tunables) {
                Some(StreakSignal::MajorRise { streak }) => events.push(AlertEvent::new(
                    symbol,
                    AlertKind::TrendStreak,
                    format!(
                        "major buying signal for {}: rising streak {}",
                        symbol, streak
                    ),
                )),
                Some(StreakSignal::Rising { .. }) => events.push(AlertEvent::new(
                    symbol,
                    AlertKind::SimpleRiser,
                    format!(
                        "{} rising: {} consecutive gains above {}%",
                        symbol, steps, threshold
                    ),
                )),
                Some(StreakSignal::Dipping) => events.push(AlertEvent::new(
                    symbol,
                    AlertKind::SimpleFaller,
                    format!(
                        "{} dipping: {} consecutive drops beyond {}%",
                        symbol, steps, threshold
                    ),
                )),
                None => {}
            }
        }

        events
    }

    /// Net change `latest - oldest` per symbol with at least two samples,
    /// largest first, truncated to `count`. A derived read, not an alert.
    pub fn top_movers(store: &HistoryStore, count: usize) -> Vec<(String, f64)> {
        let mut movers: Vec<(String, f64)> = store
            .seen_symbols()
            .into_iter()
            .filter_map(|symbol| {
                let values = store.values(&symbol);
                if values.len() < 2 {
                    return None;
                }
                let delta = values[values.len() - 1] - values[0];
                Some((symbol, (delta * 100.0).round() / 100.0))
            })
            .collect();
        movers.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        movers.truncate(count);
        movers
    }
}
