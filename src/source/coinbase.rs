/// Coinbase spot price client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::PriceSource;
use crate::error::FetchError;

const COINBASE_API: &str = "https://api.coinbase.com/v2/prices";

#[derive(Debug, Deserialize)]
struct SpotResponse {
    data: Option<SpotData>,
}

#[derive(Debug, Deserialize)]
struct SpotData {
    amount: Option<String>,
}

pub struct CoinbaseSource {
    client: Client,
    base_url: String,
}

impl CoinbaseSource {
    pub fn new(request_timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            base_url: COINBASE_API.to_string(),
        })
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }
}

/// Pulls the price out of a spot payload:
/// `{"data":{"amount":"67123.45"}}`.
fn parse_spot_payload(symbol: &str, body: &str) -> Result<f64, FetchError> {
    let response: SpotResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    let amount = response
        .data
        .ok_or(FetchError::MissingField("data"))?
        .amount
        .ok_or(FetchError::MissingField("data.amount"))?;
    let value: f64 = amount
        .parse()
        .map_err(|_| FetchError::Malformed(format!("amount is not a number: {amount}")))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(FetchError::InvalidPrice {
            symbol: symbol.to_string(),
            value,
        });
    }
    Ok(value)
}

#[async_trait]
impl PriceSource for CoinbaseSource {
    async fn fetch(&self, symbol: &str) -> Result<f64, FetchError> {
        let url = format!("{}/{}-USD/spot", self.base_url, symbol);
        debug!(%symbol, %url, "fetching spot price");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        let body = response.text().await?;
        parse_spot_payload(symbol, &body)
    }
}
