/// Watcher configuration structures

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Optional absolute alert bounds for one symbol.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct PriceBounds {
    pub low_alert: Option<f64>,
    pub high_alert: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Symbols polled each cycle. May be empty; the poller then idles.
    #[serde(default)]
    pub symbols: Vec<String>,

    /// Absolute alert bounds, keyed by symbol. Keys must be tracked symbols.
    #[serde(default)]
    pub thresholds: HashMap<String, PriceBounds>,

    #[serde(default = "defaults::poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "defaults::request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Samples retained per symbol, oldest evicted first.
    #[serde(default = "defaults::history_capacity")]
    pub history_capacity: usize,

    /// Per-step percent change a sample must beat to count toward a streak.
    #[serde(default = "defaults::percent_step_threshold")]
    pub percent_step_threshold: f64,

    /// Consecutive up-streaks at which the plain rising signal escalates.
    #[serde(default = "defaults::streak_escalation")]
    pub streak_escalation: u32,

    /// Samples inspected by the coarse monotonic trend label.
    #[serde(default = "defaults::trend_window")]
    pub trend_window: usize,

    /// Samples inspected by the percent-change streak test.
    #[serde(default = "defaults::streak_window")]
    pub streak_window: usize,

    /// Entries returned by the top-movers ranking.
    #[serde(default = "defaults::top_movers")]
    pub top_movers: usize,
}

mod defaults {
    pub fn poll_interval_secs() -> u64 {
        300
    }
    pub fn request_timeout_secs() -> u64 {
        15
    }
    pub fn history_capacity() -> usize {
        10
    }
    pub fn percent_step_threshold() -> f64 {
        0.5
    }
    pub fn streak_escalation() -> u32 {
        2
    }
    pub fn trend_window() -> usize {
        3
    }
    pub fn streak_window() -> usize {
        4
    }
    pub fn top_movers() -> usize {
        3
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            symbols: Vec::new(),
            thresholds: HashMap::new(),
            poll_interval_secs: defaults::poll_interval_secs(),
            request_timeout_secs: defaults::request_timeout_secs(),
            history_capacity: defaults::history_capacity(),
            percent_step_threshold: defaults::percent_step_threshold(),
            streak_escalation: defaults::streak_escalation(),
            trend_window: defaults::trend_window(),
            streak_window: defaults::streak_window(),
            top_movers: defaults::top_movers(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects inverted bounds and bounds keyed by untracked symbols.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (symbol, bounds) in &self.thresholds {
            if !self.symbols.iter().any(|s| s == symbol) {
                return Err(ConfigError::UnknownSymbol(symbol.clone()));
            }
            if let (Some(low), Some(high)) = (bounds.low_alert, bounds.high_alert) {
                if low >= high {
                    return Err(ConfigError::InvertedBounds {
                        symbol: symbol.clone(),
                        low,
                        high,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn bounds_for(&self, symbol: &str) -> PriceBounds {
        self.thresholds.get(symbol).copied().unwrap_or_default()
    }
}
