/// Error taxonomy for the price watcher

use thiserror::Error;

/// Failures while fetching a quote for one symbol.
///
/// Any of these means "no sample this cycle" for that symbol; the poll
/// loop logs and moves on to the next symbol.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("quote endpoint returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed quote payload: {0}")]
    Malformed(String),

    #[error("missing field `{0}` in quote payload")]
    MissingField(&'static str),

    #[error("invalid price {value} for {symbol}")]
    InvalidPrice { symbol: String, value: f64 },
}

/// Configuration problems, surfaced at load or apply time.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("alert bounds inverted for {symbol}: low {low} >= high {high}")]
    InvertedBounds {
        symbol: String,
        low: f64,
        high: f64,
    },

    #[error("alert bounds reference untracked symbol: {0}")]
    UnknownSymbol(String),
}
