// src/indicators/oscillators.rs

use super::moving_average::{closes, ema_values};
use crate::types::{CandleData, IndicatorPoint, IndicatorSeries};
use indexmap::IndexMap;

/// RSI over the trailing `period` close-to-close deltas. The first value is at
/// bar `period`. A window with no losses and some gains reads 100; a window
/// with neither produces no point.
pub fn calculate_rsi(candles: &[CandleData], period: usize) -> IndicatorSeries {
    let mut result = Vec::new();
    if period == 0 || candles.len() <= period {
        return result;
    }

    let close = closes(candles);
    // deltas[k] is close[k + 1] - close[k]
    let deltas: Vec<f64> = close.windows(2).map(|w| w[1] - w[0]).collect();

    for i in period..candles.len() {
        let window = &deltas[i - period..i];
        let gain: f64 = window.iter().filter(|d| **d > 0.0).sum();
        let loss: f64 = window.iter().filter(|d| **d < 0.0).map(|d| -d).sum();
        let avg_gain = gain / period as f64;
        let avg_loss = loss / period as f64;

        let rsi = if avg_loss == 0.0 {
            if avg_gain > 0.0 {
                100.0
            } else {
                continue;
            }
        } else {
            let rs = avg_gain / avg_loss;
            100.0 - 100.0 / (1.0 + rs)
        };

        result.push(IndicatorPoint {
            time: candles[i].time,
            value: rsi.clamp(0.0, 100.0),
        });
    }
    result
}

/// MACD line, signal line and histogram, all aligned to the input bars.
pub fn calculate_macd(
    candles: &[CandleData],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> IndexMap<String, IndicatorSeries> {
    let close = closes(candles);
    let fast = ema_values(&close, fast_period);
    let slow = ema_values(&close, slow_period);
    let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema_values(&macd, signal_period);

    let mut macd_line = Vec::with_capacity(candles.len());
    let mut signal_line = Vec::with_capacity(candles.len());
    let mut histogram = Vec::with_capacity(candles.len());

    for (i, c) in candles.iter().enumerate() {
        macd_line.push(IndicatorPoint { time: c.time, value: macd[i] });
        signal_line.push(IndicatorPoint { time: c.time, value: signal[i] });
        histogram.push(IndicatorPoint { time: c.time, value: macd[i] - signal[i] });
    }

    let mut lines = IndexMap::new();
    lines.insert("macd".to_string(), macd_line);
    lines.insert("signal".to_string(), signal_line);
    lines.insert("histogram".to_string(), histogram);
    lines
}
