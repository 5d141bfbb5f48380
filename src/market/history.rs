/// Bounded per-symbol price history and trend state

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observed spot price. Immutable once recorded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub value: f64,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendDirection {
    Up,
    Down,
    #[default]
    Neutral,
}

/// Streak bookkeeping for the percent-change classifier. Persists across
/// cycles until a contradicting or neutral window resets it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendState {
    pub last_direction: TrendDirection,
    pub streak: u32,
}

#[derive(Debug, Default)]
struct SymbolState {
    history: VecDeque<PriceSample>,
    trend: TrendState,
}

/// Sole owner of all histories and trend state. Single writer (the poll
/// cycle); readers take cloned snapshots through the accessors.
#[derive(Debug)]
pub struct HistoryStore {
    capacity: usize,
    symbols: HashMap<String, SymbolState>,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            // A zero capacity would make every record a no-op
            capacity: capacity.max(1),
            symbols: HashMap::new(),
        }
    }

    /// Appends a sample, evicting the oldest past capacity. Non-positive or
    /// non-finite prices are discarded and leave the history untouched;
    /// returns whether the sample was recorded.
    pub fn record(&mut self, symbol: &str, value: f64) -> bool {
        if !value.is_finite() || value <= 0.0 {
            return false;
        }
        let state = self.symbols.entry(symbol.to_string()).or_default();
        state.history.push_back(PriceSample {
            value,
            observed_at: Utc::now(),
        });
        while state.history.len() > self.capacity {
            state.history.pop_front();
        }
        true
    }

    /// Current history, oldest first. Empty for unseen symbols.
    pub fn get(&self, symbol: &str) -> Vec<PriceSample> {
        self.symbols
            .get(symbol)
            .map(|s| s.history.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Raw price values, oldest first.
    pub fn values(&self, symbol: &str) -> Vec<f64> {
        self.symbols
            .get(symbol)
            .map(|s| s.history.iter().map(|p| p.value).collect())
            .unwrap_or_default()
    }

    pub fn latest(&self, symbol: &str) -> Option<PriceSample> {
        self.symbols
            .get(symbol)
            .and_then(|s| s.history.back())
            .copied()
    }

    pub fn trend_state(&self, symbol: &str) -> TrendState {
        self.symbols
            .get(symbol)
            .map(|s| s.trend)
            .unwrap_or_default()
    }

    pub(crate) fn trend_state_mut(&mut self, symbol: &str) -> Option<&mut TrendState> {
        self.symbols.get_mut(symbol).map(|s| &mut s.trend)
    }

    /// Symbols with at least one recorded sample, unordered.
    pub fn seen_symbols(&self) -> Vec<String> {
        self.symbols.keys().cloned().collect()
    }

    /// Drops state for symbols outside the tracked set.
    pub fn retain_symbols(&mut self, tracked: &[String]) {
        self.symbols
            .retain(|symbol, _| tracked.iter().any(|s| s == symbol));
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
