// src/indicators/bands.rs

use super::moving_average::closes;
use crate::types::{CandleData, IndicatorPoint, IndicatorSeries};
use indexmap::IndexMap;

/// Bollinger bands: SMA middle line, upper/lower at `std_dev` population
/// standard deviations. Same warm-up as the SMA.
pub fn calculate_bollinger_bands(
    candles: &[CandleData],
    period: usize,
    std_dev: f64,
) -> IndexMap<String, IndicatorSeries> {
    let mut upper = Vec::new();
    let mut middle = Vec::new();
    let mut lower = Vec::new();

    if period > 0 && candles.len() >= period {
        let close = closes(candles);
        for end in period..=close.len() {
            let window = &close[end - period..end];
            let mean = window.iter().sum::<f64>() / period as f64;
            let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / period as f64;
            let band = std_dev * variance.sqrt();
            let time = candles[end - 1].time;

            upper.push(IndicatorPoint { time, value: mean + band });
            middle.push(IndicatorPoint { time, value: mean });
            lower.push(IndicatorPoint { time, value: mean - band });
        }
    }

    let mut lines = IndexMap::new();
    lines.insert("upper".to_string(), upper);
    lines.insert("middle".to_string(), middle);
    lines.insert("lower".to_string(), lower);
    lines
}
