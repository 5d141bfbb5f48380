/// Runtime configuration manager with validated apply

use std::sync::RwLock;

use tracing::info;

use super::Config;
use crate::error::ConfigError;

/// Holds the live configuration behind a lock so the poll loop and the
/// query surface always read a consistent snapshot. Mutations validate
/// first and apply wholesale; a rejected update leaves the previous
/// configuration untouched.
pub struct ConfigManager {
    current: RwLock<Config>,
}

impl ConfigManager {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            current: RwLock::new(config),
        })
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::load_from_file(path)?;
        Ok(Self {
            current: RwLock::new(config),
        })
    }

    pub fn get(&self) -> Config {
        self.current.read().unwrap().clone()
    }

    /// Replaces the tracked symbol set wholesale. Alert bounds for symbols
    /// that leave the set are dropped with them.
    pub fn replace_symbols(&self, symbols: Vec<String>) -> Result<(), ConfigError> {
        let mut candidate = self.get();
        candidate.symbols = symbols;
        let kept: Vec<String> = candidate.symbols.clone();
        candidate
            .thresholds
            .retain(|symbol, _| kept.iter().any(|s| s == symbol));
        candidate.validate()?;

        let mut current = self.current.write().unwrap();
        info!(symbols = ?candidate.symbols, "tracked symbol set replaced");
        *current = candidate;
        Ok(())
    }

    /// Full configuration replacement, validate-then-apply.
    pub fn apply(&self, config: Config) -> Result<(), ConfigError> {
        config.validate()?;
        let mut current = self.current.write().unwrap();
        *current = config;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PriceBounds;

    #[test]
    fn replace_symbols_drops_stale_bounds() {
        let mut config = Config::default();
        config.symbols = vec!["BTC".to_string(), "ETH".to_string()];
        config.thresholds.insert(
            "ETH".to_string(),
            PriceBounds {
                low_alert: Some(1500.0),
                high_alert: None,
            },
        );
        let manager = ConfigManager::new(config).expect("valid config");

        manager
            .replace_symbols(vec!["BTC".to_string(), "SOL".to_string()])
            .expect("replace");

        let current = manager.get();
        assert_eq!(current.symbols, vec!["BTC", "SOL"]);
        assert!(current.thresholds.is_empty());
    }

    #[test]
    fn invalid_apply_keeps_previous_config() {
        let mut config = Config::default();
        config.symbols = vec!["BTC".to_string()];
        let manager = ConfigManager::new(config).expect("valid config");

        let mut bad = manager.get();
        bad.thresholds.insert(
            "BTC".to_string(),
            PriceBounds {
                low_alert: Some(5.0),
                high_alert: Some(1.0),
            },
        );
        assert!(manager.apply(bad).is_err());
        assert!(manager.get().thresholds.is_empty());
    }
}
