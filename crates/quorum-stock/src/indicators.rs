//! Technical indicator engine
//!
//! A pure function over an ordered series of daily bars. All monetary inputs
//! are normalized to the major currency unit before any arithmetic, so every
//! monetary output (prices, averages, bands, ATR, MACD values) is already
//! major-unit. Percent and oscillator outputs are scale-invariant.

use crate::error::{MarketError, Result};
use crate::model::{Bar, Currency, TechnicalSnapshot, Trend};

/// Longest lookback in the indicator set (SMA50); fewer bars is a typed
/// insufficient-data outcome.
pub const MIN_BARS: usize = 50;

const RSI_PERIOD: usize = 14;
const ATR_PERIOD: usize = 14;
const STOCH_PERIOD: usize = 14;
const BAND_PERIOD: usize = 20;

/// Compute the full indicator snapshot for a bar series
///
/// Requires at least [`MIN_BARS`] bars; returns
/// [`MarketError::InsufficientBars`] otherwise. Deterministic for identical
/// input; the input slice is never mutated.
pub fn compute_technicals(
    ticker: &str,
    bars: &[Bar],
    source_currency: &str,
) -> Result<TechnicalSnapshot> {
    if bars.len() < MIN_BARS {
        return Err(MarketError::InsufficientBars {
            required: MIN_BARS,
            got: bars.len(),
        });
    }

    let currency = Currency::from_source(source_currency);
    let closes: Vec<f64> = bars.iter().map(|b| currency.normalize(b.close)).collect();
    let highs: Vec<f64> = bars.iter().map(|b| currency.normalize(b.high)).collect();
    let lows: Vec<f64> = bars.iter().map(|b| currency.normalize(b.low)).collect();
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume as f64).collect();

    let current = closes[closes.len() - 1];
    let sma20 = trailing_mean(&closes, BAND_PERIOD);
    let sma50 = trailing_mean(&closes, MIN_BARS);

    let rsi_values = rsi_series(&closes, RSI_PERIOD);
    let rsi = rsi_values[rsi_values.len() - 1];

    // MACD(12, 26, 9) on close
    let ema12 = ema_series(&closes, 12);
    let ema26 = ema_series(&closes, 26);
    let macd_line_series: Vec<f64> = ema12
        .iter()
        .zip(ema26.iter())
        .map(|(fast, slow)| fast - slow)
        .collect();
    let signal_series = ema_series(&macd_line_series, 9);
    let macd_line = macd_line_series[macd_line_series.len() - 1];
    let macd_signal = signal_series[signal_series.len() - 1];
    let macd_histogram = macd_line - macd_signal;

    // Bollinger(20, 2) around SMA20, population standard deviation
    let band_window = &closes[closes.len() - BAND_PERIOD..];
    let half_width = 2.0 * population_std(band_window);
    let bb_middle = sma20;
    let bb_upper = bb_middle + half_width;
    let bb_lower = bb_middle - half_width;
    let bb_width = (bb_upper - bb_lower) / bb_middle * 100.0;

    let atr = trailing_mean(&true_ranges(&highs, &lows, &closes), ATR_PERIOD);

    let stoch_rsi = stochastic(&rsi_values, STOCH_PERIOD);

    let volume = bars[bars.len() - 1].volume;
    let volume_sma20 = trailing_mean(&volumes, BAND_PERIOD);

    let support = lows[lows.len() - BAND_PERIOD..]
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min);
    let resistance = highs[highs.len() - BAND_PERIOD..]
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    let trend = classify_trend(
        current > sma50,
        current > sma20,
        macd_histogram > 0.0,
        rsi > 50.0,
    );

    Ok(TechnicalSnapshot {
        ticker: ticker.to_string(),
        current,
        sma20,
        sma50,
        rsi,
        trend,
        support,
        resistance,
        currency: currency.code.clone(),
        symbol: currency.symbol,
        macd_line: Some(macd_line),
        macd_signal: Some(macd_signal),
        macd_histogram: Some(macd_histogram),
        bb_upper: Some(bb_upper),
        bb_middle: Some(bb_middle),
        bb_lower: Some(bb_lower),
        bb_width: Some(bb_width),
        volume: Some(volume),
        volume_sma20: Some(volume_sma20),
        atr: Some(atr),
        stoch_rsi: Some(stoch_rsi),
    })
}

/// Four-signal trend score: ≥3 bullish, ≤1 bearish, otherwise neutral
pub fn classify_trend(
    above_sma50: bool,
    above_sma20: bool,
    histogram_positive: bool,
    rsi_above_midline: bool,
) -> Trend {
    let score = usize::from(above_sma50)
        + usize::from(above_sma20)
        + usize::from(histogram_positive)
        + usize::from(rsi_above_midline);

    match score {
        3.. => Trend::Bullish,
        2 => Trend::Neutral,
        _ => Trend::Bearish,
    }
}

/// Arithmetic mean of the trailing `period` values
fn trailing_mean(values: &[f64], period: usize) -> f64 {
    let window = &values[values.len() - period..];
    window.iter().sum::<f64>() / period as f64
}

/// Exponential moving average series, seeded with the first value
///
/// `ema[t] = ema[t-1] + (2/(span+1)) * (x[t] - ema[t-1])`
fn ema_series(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut ema = values[0];
    out.push(ema);
    for &value in &values[1..] {
        ema += alpha * (value - ema);
        out.push(ema);
    }
    out
}

/// Rolling-mean RSI series
///
/// One value per bar starting at index `period`; the undefined zero-loss
/// window maps to the neutral 50.0 instead of propagating a division by zero.
fn rsi_series(closes: &[f64], period: usize) -> Vec<f64> {
    let deltas: Vec<f64> = closes.windows(2).map(|pair| pair[1] - pair[0]).collect();
    let mut out = Vec::with_capacity(deltas.len().saturating_sub(period - 1));

    for window in deltas.windows(period) {
        let avg_gain = window.iter().filter(|d| **d > 0.0).sum::<f64>() / period as f64;
        let avg_loss = -window.iter().filter(|d| **d < 0.0).sum::<f64>() / period as f64;

        if avg_loss == 0.0 {
            out.push(50.0);
        } else {
            let rs = avg_gain / avg_loss;
            out.push(100.0 - 100.0 / (1.0 + rs));
        }
    }
    out
}

/// Stochastic oscillator over the trailing `period` values
///
/// A flat window has no range to normalize against and yields the neutral
/// midpoint.
fn stochastic(values: &[f64], period: usize) -> f64 {
    let window = &values[values.len().saturating_sub(period)..];
    let latest = window[window.len() - 1];
    let min = window.iter().copied().fold(f64::INFINITY, f64::min);
    let max = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if (max - min).abs() < f64::EPSILON {
        50.0
    } else {
        100.0 * (latest - min) / (max - min)
    }
}

/// True range per bar; the first bar has no previous close, so its range is
/// high − low
fn true_ranges(highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<f64> {
    (0..highs.len())
        .map(|i| {
            if i == 0 {
                highs[0] - lows[0]
            } else {
                let prev_close = closes[i - 1];
                (highs[i] - lows[i])
                    .max((highs[i] - prev_close).abs())
                    .max((lows[i] - prev_close).abs())
            }
        })
        .collect()
}

/// Population standard deviation
fn population_std(values: &[f64]) -> f64 {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values
        .iter()
        .map(|v| {
            let d = v - mean;
            d * d
        })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
                    + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000,
            })
            .collect()
    }

    /// 50 bars rising 100 → 119.6 in 0.4 steps, then `flat_len` bars at 120
    fn rising_then_flat(flat_len: usize) -> Vec<Bar> {
        let mut closes: Vec<f64> = (0..50).map(|i| 100.0 + 0.4 * i as f64).collect();
        closes.extend(std::iter::repeat_n(120.0, flat_len));
        bars_from_closes(&closes)
    }

    #[test]
    fn test_insufficient_bars_is_typed() {
        let bars = bars_from_closes(&vec![100.0; 30]);
        let err = compute_technicals("AAPL", &bars, "USD").unwrap_err();
        match err {
            MarketError::InsufficientBars { required, got } => {
                assert_eq!(required, 50);
                assert_eq!(got, 30);
            }
            other => panic!("expected InsufficientBars, got {other:?}"),
        }
    }

    #[test]
    fn test_minimum_bars_fully_populates_snapshot() {
        let bars = rising_then_flat(0);
        let snapshot = compute_technicals("AAPL", &bars, "USD").unwrap();

        assert!(snapshot.macd_line.is_some());
        assert!(snapshot.macd_signal.is_some());
        assert!(snapshot.macd_histogram.is_some());
        assert!(snapshot.bb_upper.is_some());
        assert!(snapshot.bb_middle.is_some());
        assert!(snapshot.bb_lower.is_some());
        assert!(snapshot.bb_width.is_some());
        assert!(snapshot.volume.is_some());
        assert!(snapshot.volume_sma20.is_some());
        assert!(snapshot.atr.is_some());
        assert!(snapshot.stoch_rsi.is_some());
    }

    #[test]
    fn test_rising_series_is_bullish() {
        let bars = rising_then_flat(0);
        let snapshot = compute_technicals("AAPL", &bars, "USD").unwrap();

        assert!((snapshot.current - 119.6).abs() < 1e-9);
        assert!((snapshot.sma20 - 115.8).abs() < 1e-9);
        assert!((snapshot.sma50 - 109.8).abs() < 1e-9);
        // Monotone rise has a zero loss average: guarded RSI fallback
        assert!((snapshot.rsi - 50.0).abs() < 1e-9);
        assert!(snapshot.macd_histogram.unwrap() > 0.0);
        // Signals {above SMA50, above SMA20, histogram > 0, RSI > 50} =
        // {T, T, T, F}: score 3
        assert_eq!(snapshot.trend, Trend::Bullish);
    }

    #[test]
    fn test_flat_tail_turns_neutral() {
        let bars = rising_then_flat(10);
        let snapshot = compute_technicals("AAPL", &bars, "USD").unwrap();

        assert!(snapshot.sma50 < snapshot.current);
        assert!(snapshot.sma20 < snapshot.current);
        // Momentum decays once the rise stops: the histogram has crossed
        // below zero but stays near it relative to price.
        let histogram = snapshot.macd_histogram.unwrap();
        assert!(histogram < 0.0);
        assert!(histogram.abs() < 0.5);
        assert_eq!(snapshot.trend, Trend::Neutral);
    }

    #[test]
    fn test_rsi_stays_in_bounds() {
        // Deterministic zigzag with drift
        let closes: Vec<f64> = (0..80)
            .map(|i| 100.0 + (i % 7) as f64 * 1.3 - (i % 3) as f64 * 2.1 + i as f64 * 0.05)
            .collect();
        let rsis = rsi_series(&closes, 14);
        assert!(!rsis.is_empty());
        for rsi in rsis {
            assert!((0.0..=100.0).contains(&rsi), "RSI out of bounds: {rsi}");
        }
    }

    #[test]
    fn test_flat_series_hits_neutral_fallbacks() {
        let bars = bars_from_closes(&vec![100.0; 60]);
        let snapshot = compute_technicals("AAPL", &bars, "USD").unwrap();

        // Zero deltas: both the RSI zero-loss guard and the flat
        // stochastic window guard engage.
        assert!((snapshot.rsi - 50.0).abs() < 1e-9);
        assert!((snapshot.stoch_rsi.unwrap() - 50.0).abs() < 1e-9);
        // Flat closes collapse the bands onto the middle.
        assert!((snapshot.bb_width.unwrap()).abs() < 1e-9);
        assert!((snapshot.bb_upper.unwrap() - snapshot.bb_lower.unwrap()).abs() < 1e-9);
        // High/low spread of 2.0 per bar gives ATR 2.0.
        assert!((snapshot.atr.unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_stochastic_bounds() {
        let values = vec![30.0, 45.0, 80.0, 65.0, 70.0, 20.0, 55.0, 60.0, 40.0, 75.0, 50.0, 35.0, 90.0, 10.0];
        let stoch = stochastic(&values, 14);
        assert!((0.0..=100.0).contains(&stoch));
        // Latest 10.0 is the window minimum
        assert!((stoch - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_support_and_resistance_cover_trailing_window() {
        let mut closes: Vec<f64> = vec![100.0; 45];
        closes.extend([95.0, 104.0, 99.0, 101.0, 100.0]);
        let bars = bars_from_closes(&closes);
        let snapshot = compute_technicals("AAPL", &bars, "USD").unwrap();

        // Lows are close - 1, highs close + 1
        assert!((snapshot.support - 94.0).abs() < 1e-9);
        assert!((snapshot.resistance - 105.0).abs() < 1e-9);
    }

    #[test]
    fn test_pence_quotes_are_normalized_throughout() {
        let closes: Vec<f64> = (0..60).map(|i| 5000.0 + 10.0 * i as f64).collect();
        let bars = bars_from_closes(&closes);
        let snapshot = compute_technicals("LLOY.L", &bars, "GBp").unwrap();

        assert_eq!(snapshot.currency, "GBP");
        assert_eq!(snapshot.symbol, "£");
        assert!((snapshot.current - 55.90).abs() < 1e-9);
        assert!(snapshot.sma20 < 56.0);
        assert!(snapshot.support < snapshot.current);
        assert!(snapshot.resistance < 60.0);
        // ATR computed on normalized highs/lows
        assert!(snapshot.atr.unwrap() < 1.0);
    }

    #[test]
    fn test_trend_threshold_split() {
        // Score 4 and 3 are bullish
        assert_eq!(classify_trend(true, true, true, true), Trend::Bullish);
        assert_eq!(classify_trend(true, true, true, false), Trend::Bullish);
        // Score 2 is neutral
        assert_eq!(classify_trend(true, true, false, false), Trend::Neutral);
        assert_eq!(classify_trend(false, true, false, true), Trend::Neutral);
        // Score 1 and 0 are bearish
        assert_eq!(classify_trend(false, false, true, false), Trend::Bearish);
        assert_eq!(classify_trend(false, false, false, false), Trend::Bearish);
    }

    #[test]
    fn test_ema_seeding_and_recurrence() {
        let values = vec![10.0, 20.0, 30.0];
        let ema = ema_series(&values, 3);
        assert!((ema[0] - 10.0).abs() < 1e-9);
        // alpha = 0.5 for span 3
        assert!((ema[1] - 15.0).abs() < 1e-9);
        assert!((ema[2] - 22.5).abs() < 1e-9);
    }

    #[test]
    fn test_population_std() {
        // Known population sigma: [2, 4, 4, 4, 5, 5, 7, 9] has sigma 2
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((population_std(&values) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_engine_does_not_mutate_input() {
        let bars = rising_then_flat(10);
        let before = bars.clone();
        let _ = compute_technicals("AAPL", &bars, "USD").unwrap();
        assert_eq!(bars, before);
    }
}
