use crate::model::{EarningsQuote, ProviderError, RawBar};
use crate::provider::Timeframe;
use chrono::{DateTime, Utc};

#[async_trait::async_trait]
pub trait MarketData: Send + Sync {
    /// Bars for `symbol` at `interval` from `period_start` until now, oldest first.
    async fn fetch_bars(
        &self,
        symbol: &str,
        interval: Timeframe,
        period_start: DateTime<Utc>,
    ) -> Result<Vec<RawBar>, ProviderError>;

    /// Latest quote metadata for up to ten symbols.
    async fn fetch_quote_batch(&self, symbols: &[String]) -> Result<Vec<EarningsQuote>, ProviderError>;
}
