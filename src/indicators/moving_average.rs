// src/indicators/moving_average.rs

use crate::types::{CandleData, IndicatorPoint, IndicatorSeries};

// Trailing simple moving average; the first `period - 1` slots stay None.
pub(crate) fn sma_values(data: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 || data.is_empty() {
        return vec![None; data.len()];
    }
    let mut sma_values = vec![None; data.len()];
    let mut sum = 0.0;

    for i in 0..data.len() {
        sum += data[i];
        if i >= period {
            sum -= data[i - period]; // Subtract the value that falls out of the window
        }
        if i + 1 >= period {
            sma_values[i] = Some(sum / period as f64);
        }
    }
    sma_values
}

// Exponential smoothing with alpha = 2 / (period + 1), seeded at data[0].
pub(crate) fn ema_values(data: &[f64], period: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(data.len());
    let Some(&first) = data.first() else {
        return out;
    };
    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev = first;
    out.push(prev);
    for &value in &data[1..] {
        prev = alpha * value + (1.0 - alpha) * prev;
        out.push(prev);
    }
    out
}

pub(crate) fn closes(candles: &[CandleData]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Simple moving average of close. Output starts at bar `period - 1`.
pub fn calculate_sma(candles: &[CandleData], period: usize) -> IndicatorSeries {
    let sma = sma_values(&closes(candles), period);
    sma.iter()
        .enumerate()
        .filter_map(|(i, val)| val.map(|v| IndicatorPoint { time: candles[i].time, value: v }))
        .collect()
}

/// Exponential moving average of close. Every bar produces a value.
pub fn calculate_ema(candles: &[CandleData], period: usize) -> IndicatorSeries {
    if period == 0 {
        return Vec::new();
    }
    ema_values(&closes(candles), period)
        .into_iter()
        .zip(candles)
        .map(|(value, c)| IndicatorPoint { time: c.time, value })
        .collect()
}
