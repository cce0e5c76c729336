//! Pure indicator functions over ordered price/volume series.
//!
//! Every function returns a series aligned index-for-index with its input.
//! Inputs must be non-empty; an empty input yields an empty output.

use crate::model::Candle;

pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

/// Exponential moving average seeded with the first value, `k = 2 / (period + 1)`.
///
/// No warm-up suppression: defined from index 0.
pub fn ema(series: &[f64], period: usize) -> Vec<f64> {
    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(series.len());
    for (i, &value) in series.iter().enumerate() {
        if i == 0 {
            out.push(value);
        } else {
            out.push(value * k + out[i - 1] * (1.0 - k));
        }
    }
    out
}

/// Simple moving average. Indices before the first full window are `0.0`.
pub fn sma(series: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![0.0; series.len()];
    }
    (0..series.len())
        .map(|i| {
            if i + 1 < period {
                0.0
            } else {
                series[i + 1 - period..=i].iter().sum::<f64>() / period as f64
            }
        })
        .collect()
}

/// Relative strength index with Wilder smoothing.
///
/// Indices `< period` are `0.0`; a series shorter than `period + 1` is all zeros.
/// A zero average loss yields exactly `100.0`.
pub fn rsi(series: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![0.0; series.len()];
    if period == 0 || series.len() < period + 1 {
        return out;
    }

    let n = period as f64;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let delta = series[i] - series[i - 1];
        if delta > 0.0 {
            avg_gain += delta;
        } else {
            avg_loss -= delta;
        }
    }
    avg_gain /= n;
    avg_loss /= n;
    out[period] = rsi_value(avg_gain, avg_loss);

    for i in period + 1..series.len() {
        let delta = series[i] - series[i - 1];
        let (gain, loss) = if delta > 0.0 { (delta, 0.0) } else { (0.0, -delta) };
        avg_gain = (avg_gain * (n - 1.0) + gain) / n;
        avg_loss = (avg_loss * (n - 1.0) + loss) / n;
        out[i] = rsi_value(avg_gain, avg_loss);
    }
    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
}

/// MACD(12, 26, 9): line is `EMA12 - EMA26`, signal is `EMA9` of the line.
pub fn macd(series: &[f64]) -> Macd {
    let fast = ema(series, MACD_FAST);
    let slow = ema(series, MACD_SLOW);
    let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema(&line, MACD_SIGNAL);
    Macd { line, signal }
}

/// Running VWAP over the whole window, `cumsum(tp * vol) / cumsum(vol)`.
///
/// Never resets at session boundaries. While cumulative volume is still zero
/// the bar's typical price is emitted.
pub fn vwap(candles: &[Candle]) -> Vec<f64> {
    let mut cum_tpv = 0.0;
    let mut cum_vol = 0.0;
    candles
        .iter()
        .map(|c| {
            let tp = c.typical_price();
            cum_tpv += tp * c.volume;
            cum_vol += c.volume;
            if cum_vol > 0.0 { cum_tpv / cum_vol } else { tp }
        })
        .collect()
}

/// Current volume over its trailing average; `0.0` while the average is unavailable.
pub fn relative_volume(current_volume: f64, volume_sma: f64) -> f64 {
    if volume_sma > 0.0 {
        current_volume / volume_sma
    } else {
        0.0
    }
}
