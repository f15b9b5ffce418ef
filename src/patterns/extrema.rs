// src/patterns/extrema.rs

use crate::types::CandleData;

/// Indices of local highs and lows, in chronological order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extrema {
    pub peaks: Vec<usize>,
    pub troughs: Vec<usize>,
}

/// A peak must have a `high` strictly above every `high` within `order` bars on
/// both sides; a trough a `low` strictly below every `low` in the same window.
/// Near the ends the window is clipped to the series, so the first and last
/// bars are compared against themselves and never qualify.
pub fn find_peaks_and_troughs(candles: &[CandleData], order: usize) -> Extrema {
    let mut extrema = Extrema::default();
    let n = candles.len();
    if order == 0 || n < 3 {
        return extrema;
    }
    let last = n - 1;

    for i in 1..last {
        let mut neighbours = (1..=order.min(last))
            .flat_map(|k| [i.saturating_sub(k), i.saturating_add(k).min(last)]);

        let high = candles[i].high;
        if neighbours.clone().all(|j| high > candles[j].high) {
            extrema.peaks.push(i);
        }

        let low = candles[i].low;
        if neighbours.all(|j| low < candles[j].low) {
            extrema.troughs.push(i);
        }
    }
    extrema
}
