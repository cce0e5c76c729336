use crate::provider::MarketData;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Symbols per quote request.
pub const EARNINGS_BATCH_SIZE: usize = 10;

/// Symbol -> known earnings timestamp, rebuilt on every scan.
pub type EarningsIndex = HashMap<String, DateTime<Utc>>;

/// Fetches earnings metadata one batch at a time. A failed batch is logged and skipped.
pub async fn prefetch_earnings<P: MarketData + ?Sized>(provider: &P, symbols: &[String]) -> EarningsIndex {
    let mut index = EarningsIndex::new();
    for batch in symbols.chunks(EARNINGS_BATCH_SIZE) {
        match provider.fetch_quote_batch(batch).await {
            Ok(quotes) => {
                for quote in quotes {
                    if let Some(at) = quote.earnings_at {
                        index.insert(quote.symbol, at);
                    }
                }
            }
            Err(e) => {
                warn!("Earnings batch [{}] failed: {}", batch.join(","), e);
            }
        }
    }
    debug!("Earnings known for {}/{} symbols", index.len(), symbols.len());
    index
}
