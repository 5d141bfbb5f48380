/// Quote source capability

pub mod coinbase;

use async_trait::async_trait;

use crate::error::FetchError;

pub use coinbase::CoinbaseSource;

/// Supplies the latest spot price for a symbol. May fail or be slow;
/// implementations bound their own request time so one symbol cannot
/// stall a poll cycle indefinitely.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch(&self, symbol: &str) -> Result<f64, FetchError>;
}
