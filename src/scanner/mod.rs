// Scan orchestration: earnings prefetch followed by a bounded worker pool.

pub mod earnings;

use crate::analyzer::analyze;
use crate::analyzer::ticker::valid_candles;
use crate::model::TickerSnapshot;
use crate::provider::{MarketData, Timeframe};
use chrono::{DateTime, Utc};
use earnings::{prefetch_earnings, EarningsIndex};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Number of symbols processed concurrently.
pub const WORKER_COUNT: usize = 5;

pub struct Scanner<P: MarketData + ?Sized> {
    provider: Arc<P>,
}

impl<P: MarketData + ?Sized> Scanner<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// Runs one scan cycle. Failed or short-history symbols are skipped, never surfaced.
    pub async fn scan(&self, symbols: &[String], timeframe: &str) -> Vec<TickerSnapshot> {
        let started = Instant::now();
        let symbols = normalize_symbols(symbols);
        let interval = Timeframe::from_label(timeframe);
        let period_start = Utc::now() - Timeframe::lookback();
        info!("Scanning {} symbols at {}", symbols.len(), interval);

        let earnings = prefetch_earnings(self.provider.as_ref(), &symbols).await;

        let cursor = AtomicUsize::new(0);
        let workers = (0..WORKER_COUNT.min(symbols.len()))
            .map(|_| self.worker(&symbols, &cursor, &earnings, interval, period_start));
        let results: Vec<TickerSnapshot> = join_all(workers).await.into_iter().flatten().collect();

        info!(
            "Scan finished: {}/{} snapshots in {:.2?}",
            results.len(),
            symbols.len(),
            started.elapsed()
        );
        results
    }

    /// Claims symbols until the backlog is empty and returns its local results.
    async fn worker(
        &self,
        symbols: &[String],
        cursor: &AtomicUsize,
        earnings: &EarningsIndex,
        interval: Timeframe,
        period_start: DateTime<Utc>,
    ) -> Vec<TickerSnapshot> {
        let mut local = Vec::new();
        loop {
            let idx = cursor.fetch_add(1, Ordering::Relaxed);
            let Some(symbol) = symbols.get(idx) else {
                break;
            };

            let bars = match self.provider.fetch_bars(symbol, interval, period_start).await {
                Ok(bars) => bars,
                Err(e) => {
                    warn!("Fetch failed for {}: {}", symbol, e);
                    continue;
                }
            };

            match analyze(symbol, &bars, earnings.get(symbol).copied()) {
                Some(snapshot) => local.push(snapshot),
                None => debug!(
                    "Skipping {}: insufficient history ({} valid of {} bars)",
                    symbol,
                    valid_candles(&bars).len(),
                    bars.len()
                ),
            }
        }
        local
    }
}

/// Trims, drops blanks and de-duplicates while keeping first-seen order.
pub fn normalize_symbols(symbols: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    symbols
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && seen.insert(s.to_string()))
        .map(str::to_string)
        .collect()
}
