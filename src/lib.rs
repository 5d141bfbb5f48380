// Advisory spot-price watcher: bounded per-symbol history, trend
// classification, threshold and streak alerting, read-only query surface.

pub mod alert;
pub mod config;
pub mod error;
pub mod market;
pub mod poller;
pub mod query;
pub mod source;
pub mod watcher;

// Re-export commonly used types for convenience
pub use alert::{AlertBus, AlertEngine, AlertEvent, AlertKind};
pub use config::{Config, ConfigManager, PriceBounds};
pub use error::{ConfigError, FetchError};
pub use poller::Poller;
pub use query::QueryFacade;
pub use source::{CoinbaseSource, PriceSource};
pub use watcher::Watcher;
