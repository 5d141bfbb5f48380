/// Read-only snapshot access for the presentation layer

use std::collections::HashMap;
use std::sync::Arc;

use crate::alert::AlertEngine;
use crate::market::{classify_monotonic, TrendLabel, TrendTunables};
use crate::watcher::Watcher;

/// Snapshot reads over the watcher state. Safe to call concurrently with a
/// running poll cycle; each call observes the pre- or post-update state of
/// a symbol, never a torn one.
#[derive(Clone)]
pub struct QueryFacade {
    watcher: Arc<Watcher>,
}

impl QueryFacade {
    pub fn new(watcher: Arc<Watcher>) -> Self {
        Self { watcher }
    }

    /// Latest recorded price per symbol with history.
    pub fn current_prices(&self) -> HashMap<String, f64> {
        let store = self.watcher.store();
        store
            .seen_symbols()
            .into_iter()
            .filter_map(|symbol| {
                let latest = store.latest(&symbol)?;
                Some((symbol, latest.value))
            })
            .collect()
    }

    /// Full history per symbol, oldest first.
    pub fn histories(&self) -> HashMap<String, Vec<f64>> {
        let store = self.watcher.store();
        store
            .seen_symbols()
            .into_iter()
            .map(|symbol| {
                let values = store.values(&symbol);
                (symbol, values)
            })
            .collect()
    }

    /// Coarse trend label for every tracked symbol, `Stable` when history
    /// is still short.
    pub fn trends(&self) -> HashMap<String, TrendLabel> {
        let config = self.watcher.config_snapshot();
        let tunables = TrendTunables::from_config(&config);
        let store = self.watcher.store();
        config
            .symbols
            .iter()
            .map(|symbol| {
                let label = classify_monotonic(&store.values(symbol), &tunables);
                (symbol.clone(), label)
            })
            .collect()
    }

    /// Biggest net movers across each symbol's current window, descending.
    /// `count` falls back to the configured default.
    pub fn top_movers(&self, count: Option<usize>) -> Vec<(String, f64)> {
        let config = self.watcher.config_snapshot();
        let store = self.watcher.store();
        AlertEngine::top_movers(&store, count.unwrap_or(config.top_movers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::AlertBus;
    use crate::config::{Config, ConfigManager};
    use crate::error::FetchError;
    use async_trait::async_trait;

    struct FixedSource(f64);

    #[async_trait]
    impl crate::source::PriceSource for FixedSource {
        async fn fetch(&self, _symbol: &str) -> Result<f64, FetchError> {
            Ok(self.0)
        }
    }

    fn facade_with(symbols: &[&str], prices: &[(&str, &[f64])]) -> QueryFacade {
        let mut config = Config::default();
        config.symbols = symbols.iter().map(|s| s.to_string()).collect();
        let manager = Arc::new(ConfigManager::new(config).expect("valid config"));
        let watcher = Arc::new(Watcher::new(
            manager,
            Arc::new(FixedSource(1.0)),
            AlertBus::new(),
        ));
        for (symbol, values) in prices {
            for value in *values {
                watcher.seed_sample(symbol, *value);
            }
        }
        QueryFacade::new(watcher)
    }

    #[test]
    fn current_prices_are_latest_samples() {
        let facade = facade_with(
            &["BTC", "ETH"],
            &[("BTC", &[100.0, 101.0]), ("ETH", &[2000.0])],
        );
        let prices = facade.current_prices();
        assert_eq!(prices.get("BTC"), Some(&101.0));
        assert_eq!(prices.get("ETH"), Some(&2000.0));
    }

    #[test]
    fn histories_keep_insertion_order() {
        let facade = facade_with(&["BTC"], &[("BTC", &[3.0, 1.0, 2.0])]);
        assert_eq!(facade.histories().get("BTC"), Some(&vec![3.0, 1.0, 2.0]));
    }

    #[test]
    fn trends_cover_all_tracked_symbols() {
        let facade = facade_with(
            &["UP", "DOWN", "NEW"],
            &[("UP", &[8.0, 9.0, 10.0]), ("DOWN", &[10.0, 9.0, 8.0])],
        );
        let trends = facade.trends();
        assert_eq!(trends.get("UP"), Some(&TrendLabel::Riser));
        assert_eq!(trends.get("DOWN"), Some(&TrendLabel::Warning));
        // Tracked but unseen symbols still report Stable
        assert_eq!(trends.get("NEW"), Some(&TrendLabel::Stable));
    }

    #[test]
    fn top_movers_respect_requested_count() {
        let facade = facade_with(
            &["A", "B", "C"],
            &[
                ("A", &[10.0, 12.0]),
                ("B", &[5.0, 4.0]),
                ("C", &[1.0, 1.0]),
            ],
        );
        let all = facade.top_movers(None);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0], ("A".to_string(), 2.0));
        let one = facade.top_movers(Some(1));
        assert_eq!(one, vec![("A".to_string(), 2.0)]);
    }
}
