/// Price history and trend classification

pub mod history;
pub mod trend;

pub use history::{HistoryStore, PriceSample, TrendDirection, TrendState};
pub use trend::{classify_monotonic, evaluate_streak, StreakSignal, TrendLabel, TrendTunables};
