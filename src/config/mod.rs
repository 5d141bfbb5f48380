/// Configuration management

pub mod manager;
pub mod settings;

pub use manager::ConfigManager;
pub use settings::{Config, PriceBounds};
