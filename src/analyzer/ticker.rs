use crate::analyzer::indicators::{self, Macd};
use crate::model::{Candle, Category, RawBar, TickerSnapshot};
use crate::utils::{day_label, utc_day};
use chrono::{DateTime, Utc};

/// Minimum number of valid bars needed before a snapshot is produced.
pub const MIN_BARS: usize = 50;
/// Relative volume above which momentum is promoted to a surge.
pub const SURGE_RVOL: f64 = 2.0;
pub const RSI_PERIOD: usize = 14;
pub const VOLUME_SMA_PERIOD: usize = 20;
pub const NO_EARNINGS_LABEL: &str = "-";

/// All indicator series for one symbol, aligned index-for-index with the candles.
#[derive(Debug, Clone)]
pub struct IndicatorSet {
    pub ema9: Vec<f64>,
    pub ema20: Vec<f64>,
    pub ema200: Vec<f64>,
    pub macd: Macd,
    pub vwap: Vec<f64>,
    pub volume_sma20: Vec<f64>,
    pub rsi14: Vec<f64>,
}

impl IndicatorSet {
    pub fn compute(candles: &[Candle]) -> Self {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();

        Self {
            ema9: indicators::ema(&closes, 9),
            ema20: indicators::ema(&closes, 20),
            ema200: indicators::ema(&closes, 200),
            macd: indicators::macd(&closes),
            vwap: indicators::vwap(candles),
            volume_sma20: indicators::sma(&volumes, VOLUME_SMA_PERIOD),
            rsi14: indicators::rsi(&closes, RSI_PERIOD),
        }
    }
}

/// Two-factor tier: momentum needs both crosses, a surge also needs volume.
pub fn categorize(ema_cross_up: bool, macd_cross_up: bool, relative_volume: f64) -> Category {
    let momentum = ema_cross_up && macd_cross_up;
    if momentum && relative_volume > SURGE_RVOL {
        Category::Surge
    } else if momentum {
        Category::Momentum
    } else {
        Category::Quiet
    }
}

/// Close of the last bar on an earlier UTC calendar day than the latest bar.
pub fn prior_session_close(candles: &[Candle]) -> Option<f64> {
    let (current, earlier) = candles.split_last()?;
    let today = utc_day(current.timestamp);
    earlier
        .iter()
        .rev()
        .find(|c| utc_day(c.timestamp) < today)
        .map(|c| c.close)
}

/// Bars with a known close and volume, in their original order.
pub fn valid_candles(bars: &[RawBar]) -> Vec<Candle> {
    bars.iter().filter_map(Candle::from_raw).collect()
}

/// Builds a snapshot at the latest bar, or `None` when history is too short.
pub fn analyze(
    symbol: &str,
    bars: &[RawBar],
    earnings_at: Option<DateTime<Utc>>,
) -> Option<TickerSnapshot> {
    let candles = valid_candles(bars);
    if candles.len() < MIN_BARS {
        return None;
    }

    let set = IndicatorSet::compute(&candles);
    let idx = candles.len() - 1;
    let current = &candles[idx];
    let price = current.close;

    let prev_close = prior_session_close(&candles).unwrap_or(price);
    let pct_change = if prev_close != 0.0 {
        (price - prev_close) / prev_close * 100.0
    } else {
        0.0
    };
    let relative_volume = indicators::relative_volume(current.volume, set.volume_sma20[idx]);

    let ema_cross_up = set.ema9[idx] > set.ema20[idx];
    let macd_cross_up = set.macd.line[idx] > set.macd.signal[idx];

    Some(TickerSnapshot {
        symbol: symbol.to_string(),
        price,
        pct_change,
        relative_volume,
        rsi: set.rsi14[idx],
        ema_cross_up,
        macd_cross_up,
        above_ema200: price > set.ema200[idx],
        above_vwap: price > set.vwap[idx],
        earnings_label: earnings_at
            .map(day_label)
            .unwrap_or_else(|| NO_EARNINGS_LABEL.to_string()),
        category: categorize(ema_cross_up, macd_cross_up, relative_volume),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    /// Bars spaced five minutes apart starting at 2024-03-04 14:30 UTC.
    pub(crate) fn bars_from(closes: &[f64], volumes: &[f64]) -> Vec<RawBar> {
        let start = Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, 0).unwrap();
        closes
            .iter()
            .zip(volumes)
            .enumerate()
            .map(|(i, (&close, &volume))| RawBar {
                timestamp: start + Duration::minutes(5 * i as i64),
                high: Some(close + 0.1),
                low: Some(close - 0.1),
                close: Some(close),
                volume: Some(volume),
            })
            .collect()
    }

    pub(crate) fn rising_bars(n: usize) -> Vec<RawBar> {
        let closes: Vec<f64> = (0..n).map(|i| 50.0 + i as f64 * 0.2).collect();
        bars_from(&closes, &vec![1000.0; n])
    }

    #[test]
    fn fewer_than_fifty_valid_bars_is_absent() {
        assert!(analyze("AMZN", &rising_bars(49), None).is_none());
        assert!(analyze("AMZN", &rising_bars(50), None).is_some());
    }

    #[test]
    fn invalid_bars_do_not_count_toward_history() {
        let mut bars = rising_bars(52);
        bars[10].close = None;
        bars[20].volume = None;
        bars[30].close = None;
        assert!(analyze("AMZN", &bars, None).is_none());

        assert_eq!(valid_candles(&bars).len(), 49);

        let mut more = rising_bars(55);
        more[3].volume = None;
        assert!(analyze("AMZN", &more, None).is_some());
    }

    #[test]
    fn valid_candles_keep_order_and_skip_gaps() {
        let mut bars = rising_bars(6);
        bars[1].close = None;
        bars[4].volume = None;
        let candles = valid_candles(&bars);
        assert_eq!(candles.len(), 4);
        let stamps: Vec<_> = candles.iter().map(|c| c.timestamp).collect();
        let expected: Vec<_> = [0, 2, 3, 5].iter().map(|&i| bars[i].timestamp).collect();
        assert_eq!(stamps, expected);
    }

    #[test]
    fn rising_trend_with_flat_volume_is_momentum() {
        let snap = analyze("MU", &rising_bars(60), None).unwrap();
        assert!(snap.ema_cross_up);
        assert!(snap.above_ema200);
        assert!(snap.above_vwap);
        assert_eq!(snap.rsi, 100.0);
        assert!((snap.relative_volume - 1.0).abs() < 1e-12);
        // Same UTC day throughout, so there is no prior session.
        assert_eq!(snap.pct_change, 0.0);
        assert_eq!(snap.earnings_label, "-");
        assert!(snap.macd_cross_up);
        assert_eq!(snap.category, Category::Momentum);
    }

    #[test]
    fn volume_spike_on_uptrend_is_surge() {
        let n = 60;
        let closes: Vec<f64> = (0..n).map(|i| 50.0 + i as f64 * 0.2).collect();
        let mut volumes = vec![1000.0; n];
        volumes[n - 1] = 10_000.0;
        let snap = analyze("COIN", &bars_from(&closes, &volumes), None).unwrap();
        assert!(snap.relative_volume > SURGE_RVOL);
        assert!(snap.ema_cross_up && snap.macd_cross_up);
        assert_eq!(snap.category, Category::Surge);
    }

    #[test]
    fn falling_trend_is_quiet() {
        let closes: Vec<f64> = (0..60).map(|i| 80.0 - i as f64 * 0.2).collect();
        let snap = analyze("NKE", &bars_from(&closes, &vec![1000.0; 60]), None).unwrap();
        assert!(!snap.ema_cross_up);
        assert!(!snap.above_ema200);
        assert_eq!(snap.rsi, 0.0);
        assert_eq!(snap.category, Category::Quiet);
    }

    #[test]
    fn pct_change_uses_prior_utc_session_close() {
        let mut bars = rising_bars(60);
        let day_before = Utc.with_ymd_and_hms(2024, 3, 1, 20, 55, 0).unwrap();
        for (i, bar) in bars.iter_mut().take(10).enumerate() {
            bar.timestamp = day_before + Duration::minutes(i as i64 - 10);
        }
        // bars[9] is the last bar of the earlier session.
        let prev = bars[9].close.unwrap();
        let price = bars[59].close.unwrap();
        let snap = analyze("HOOD", &bars, None).unwrap();
        assert!((snap.pct_change - (price - prev) / prev * 100.0).abs() < 1e-9);
    }

    #[test]
    fn earnings_label_is_utc_day() {
        let at = Utc.with_ymd_and_hms(2024, 4, 25, 20, 0, 0).unwrap();
        let snap = analyze("AMZN", &rising_bars(50), Some(at)).unwrap();
        assert_eq!(snap.earnings_label, "2024-04-25");
    }

    #[test]
    fn indicator_series_align_with_candles() {
        let candles: Vec<Candle> = rising_bars(75).iter().filter_map(Candle::from_raw).collect();
        let set = IndicatorSet::compute(&candles);
        for len in [
            set.ema9.len(),
            set.ema20.len(),
            set.ema200.len(),
            set.macd.line.len(),
            set.macd.signal.len(),
            set.vwap.len(),
            set.volume_sma20.len(),
            set.rsi14.len(),
        ] {
            assert_eq!(len, candles.len());
        }
    }

    #[test]
    fn categorize_lattice() {
        assert_eq!(categorize(true, true, 2.5), Category::Surge);
        assert_eq!(categorize(true, true, 2.0), Category::Momentum);
        assert_eq!(categorize(true, true, 0.0), Category::Momentum);
        assert_eq!(categorize(true, false, 9.0), Category::Quiet);
        assert_eq!(categorize(false, true, 9.0), Category::Quiet);
    }

    #[test]
    fn category_implies_its_conditions() {
        for ema in [false, true] {
            for macd in [false, true] {
                for rvol in [0.0, 1.0, 2.0, 2.01, 7.5] {
                    match categorize(ema, macd, rvol) {
                        Category::Surge => assert!(ema && macd && rvol > SURGE_RVOL),
                        Category::Momentum => assert!(ema && macd && rvol <= SURGE_RVOL),
                        Category::Quiet => assert!(!(ema && macd)),
                    }
                }
            }
        }
    }

    #[test]
    fn no_prior_session_without_earlier_day() {
        let candles: Vec<Candle> = rising_bars(5).iter().filter_map(Candle::from_raw).collect();
        assert_eq!(prior_session_close(&candles), None);
        assert_eq!(prior_session_close(&[]), None);
    }
}
