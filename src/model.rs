// Core structs: RawBar, Candle, EarningsQuote, TickerSnapshot
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// One bar as delivered by the provider. Any price or volume field may be missing.
/// The open is not used by any indicator and is not carried.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBar {
    pub timestamp: DateTime<Utc>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

/// A bar that survived filtering: close and volume are known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Returns `None` when close or volume is missing. Missing high/low fall back to close.
    pub fn from_raw(bar: &RawBar) -> Option<Self> {
        let close = bar.close?;
        let volume = bar.volume?;
        Some(Self {
            timestamp: bar.timestamp,
            high: bar.high.unwrap_or(close),
            low: bar.low.unwrap_or(close),
            close,
            volume,
        })
    }

    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EarningsQuote {
    pub symbol: String,
    pub earnings_at: Option<DateTime<Utc>>,
}

/// Alert tier assigned to a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Quiet = 0,
    Momentum = 1,
    Surge = 2,
}

impl Category {
    pub fn level(self) -> u8 {
        self as u8
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.level())
    }
}

/// Point-in-time result for one symbol at its latest bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerSnapshot {
    pub symbol: String,
    pub price: f64,
    pub pct_change: f64,
    pub relative_volume: f64,
    pub rsi: f64,
    pub ema_cross_up: bool,
    pub macd_cross_up: bool,
    pub above_ema200: bool,
    pub above_vwap: bool,
    pub earnings_label: String,
    pub category: Category,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("not authorized: {0}")]
    Unauthorized(String),
    #[error("provider responded with status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("no data for {0}")]
    NoData(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
