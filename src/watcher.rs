/// Shared watcher state and the fetch-record-alert cycle

use std::sync::{Arc, RwLock, RwLockReadGuard};

use tracing::{debug, warn};

use crate::alert::{AlertBus, AlertEngine};
use crate::config::{Config, ConfigManager};
use crate::error::ConfigError;
use crate::market::HistoryStore;
use crate::source::PriceSource;

/// Owns the history/trend aggregate behind a single-writer lock. The poll
/// cycle is the only writer; query snapshots take the read side. Network
/// fetches happen outside the lock so readers never wait on I/O.
pub struct Watcher {
    config: Arc<ConfigManager>,
    source: Arc<dyn PriceSource>,
    bus: AlertBus,
    store: RwLock<HistoryStore>,
}

impl Watcher {
    pub fn new(config: Arc<ConfigManager>, source: Arc<dyn PriceSource>, bus: AlertBus) -> Self {
        let capacity = config.get().history_capacity;
        Self {
            config,
            source,
            bus,
            store: RwLock::new(HistoryStore::new(capacity)),
        }
    }

    /// One full poll pass: fetch every tracked symbol, record successes,
    /// evaluate alert rules, publish events. A failure for one symbol is
    /// logged and never aborts the rest of the cycle. Returns how many
    /// samples were recorded.
    pub async fn run_cycle(&self) -> usize {
        let config = self.config.get();
        if config.symbols.is_empty() {
            debug!("no symbols tracked, idle cycle");
            return 0;
        }
        let engine = AlertEngine::from_config(&config);

        let mut recorded = 0;
        for symbol in &config.symbols {
            let price = match self.source.fetch(symbol).await {
                Ok(price) => price,
                Err(e) => {
                    warn!(%symbol, error = %e, "quote fetch failed, skipping symbol this cycle");
                    continue;
                }
            };

            let events = {
                let mut store = self.store.write().unwrap();
                if !store.record(symbol, price) {
                    warn!(%symbol, price, "discarded invalid price sample");
                    continue;
                }
                recorded += 1;
                engine.evaluate(symbol, &mut store)
            };

            for event in events {
                if let Err(e) = self.bus.publish(event) {
                    debug!(%symbol, error = %e, "alert published with no subscribers");
                }
            }
        }
        recorded
    }

    /// Replaces the tracked symbol set and drops state for symbols that
    /// left it. Validation failures leave both config and store untouched.
    pub fn set_tracked_symbols(&self, symbols: Vec<String>) -> Result<(), ConfigError> {
        self.config.replace_symbols(symbols)?;
        let tracked = self.config.get().symbols;
        self.store.write().unwrap().retain_symbols(&tracked);
        Ok(())
    }

    pub fn config_snapshot(&self) -> Config {
        self.config.get()
    }

    pub fn bus(&self) -> &AlertBus {
        &self.bus
    }

    pub(crate) fn store(&self) -> RwLockReadGuard<'_, HistoryStore> {
        self.store.read().unwrap()
    }

    #[cfg(test)]
    pub(crate) fn seed_sample(&self, symbol: &str, value: f64) {
        self.store.write().unwrap().record(symbol, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::AlertKind;
    use crate::config::PriceBounds;
    use crate::error::FetchError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Scripted quote source: per-symbol queues of results, then failures.
    struct ScriptedSource {
        scripts: Mutex<HashMap<String, Vec<Result<f64, FetchError>>>>,
    }

    impl ScriptedSource {
        fn new() -> Self {
            Self {
                scripts: Mutex::new(HashMap::new()),
            }
        }

        fn push(&self, symbol: &str, result: Result<f64, FetchError>) {
            self.scripts
                .lock()
                .unwrap()
                .entry(symbol.to_string())
                .or_default()
                .push(result);
        }
    }

    #[async_trait]
    impl crate::source::PriceSource for ScriptedSource {
        async fn fetch(&self, symbol: &str) -> Result<f64, FetchError> {
            let mut scripts = self.scripts.lock().unwrap();
            match scripts.get_mut(symbol) {
                Some(queue) if !queue.is_empty() => queue.remove(0),
                _ => Err(FetchError::Malformed(format!("no script for {symbol}"))),
            }
        }
    }

    fn watcher_for(symbols: &[&str], source: Arc<ScriptedSource>) -> Watcher {
        let mut config = Config::default();
        config.symbols = symbols.iter().map(|s| s.to_string()).collect();
        let manager = Arc::new(ConfigManager::new(config).expect("valid config"));
        Watcher::new(manager, source, AlertBus::new())
    }

    #[tokio::test]
    async fn cycle_records_all_tracked_symbols() {
        let source = Arc::new(ScriptedSource::new());
        source.push("BTC", Ok(67000.0));
        source.push("ETH", Ok(3500.0));
        let watcher = watcher_for(&["BTC", "ETH"], source);

        assert_eq!(watcher.run_cycle().await, 2);
        let store = watcher.store();
        assert_eq!(store.values("BTC"), vec![67000.0]);
        assert_eq!(store.values("ETH"), vec![3500.0]);
    }

    #[tokio::test]
    async fn one_failing_symbol_does_not_abort_the_cycle() {
        let source = Arc::new(ScriptedSource::new());
        source.push("X", Err(FetchError::Malformed("boom".to_string())));
        source.push("Y", Ok(10.0));
        source.push("Z", Ok(20.0));
        let watcher = watcher_for(&["X", "Y", "Z"], source);

        assert_eq!(watcher.run_cycle().await, 2);
        let store = watcher.store();
        assert!(store.get("X").is_empty());
        assert_eq!(store.values("Y"), vec![10.0]);
        assert_eq!(store.values("Z"), vec![20.0]);
    }

    #[tokio::test]
    async fn threshold_alert_reaches_the_bus() {
        let source = Arc::new(ScriptedSource::new());
        source.push("BTC", Ok(175.99));

        let mut config = Config::default();
        config.symbols = vec!["BTC".to_string()];
        config.thresholds.insert(
            "BTC".to_string(),
            PriceBounds {
                low_alert: Some(176.0),
                high_alert: None,
            },
        );
        let manager = Arc::new(ConfigManager::new(config).expect("valid config"));
        let watcher = Watcher::new(manager, source, AlertBus::new());

        let mut rx = watcher.bus().subscribe();
        watcher.run_cycle().await;

        let event = rx.try_recv().expect("one alert on the bus");
        assert_eq!(event.kind, AlertKind::ThresholdLow);
        assert_eq!(event.symbol, "BTC");
    }

    #[tokio::test]
    async fn replacing_symbols_drops_removed_state() {
        let source = Arc::new(ScriptedSource::new());
        source.push("BTC", Ok(1.0));
        source.push("DOGE", Ok(2.0));
        let watcher = watcher_for(&["BTC", "DOGE"], source);
        watcher.run_cycle().await;

        watcher
            .set_tracked_symbols(vec!["BTC".to_string()])
            .expect("replace");

        let store = watcher.store();
        assert!(store.get("DOGE").is_empty());
        assert_eq!(store.values("BTC"), vec![1.0]);
    }

    #[tokio::test]
    async fn empty_watchlist_idles() {
        let source = Arc::new(ScriptedSource::new());
        let watcher = watcher_for(&[], source);
        assert_eq!(watcher.run_cycle().await, 0);
    }
}
