// src/patterns/triangle.rs

use super::{Extrema, PatternKind, PatternMatch, PatternRecognizer, PROBABILITY_CAP};
use crate::types::CandleData;

const FLAT_SLOPE: f64 = 0.01;
const MAX_TOUCHES: usize = 3;

pub struct TriangleRecognizer;

fn last_n(indices: &[usize], n: usize) -> &[usize] {
    &indices[indices.len().saturating_sub(n)..]
}

// Price change per bar between the first and last point.
fn slope(points: &[usize], price: impl Fn(usize) -> f64) -> f64 {
    match (points.first(), points.last()) {
        (Some(&first), Some(&last)) if last > first => {
            (price(last) - price(first)) / (last - first) as f64
        }
        _ => 0.0,
    }
}

impl PatternRecognizer for TriangleRecognizer {
    fn name(&self) -> &'static str {
        "triangle"
    }

    fn detect(&self, candles: &[CandleData], extrema: &Extrema) -> PatternMatch {
        if extrema.peaks.len() < 2 || extrema.troughs.len() < 2 {
            return PatternMatch::not_found(PatternKind::Triangle, "Insufficient peaks and troughs");
        }

        let peaks = last_n(&extrema.peaks, MAX_TOUCHES);
        let troughs = last_n(&extrema.troughs, MAX_TOUCHES);
        let peak_slope = slope(peaks, |i| candles[i].high);
        let trough_slope = slope(troughs, |i| candles[i].low);

        let falling_peaks = peak_slope < -FLAT_SLOPE;
        let rising_troughs = trough_slope > FLAT_SLOPE;
        let (kind, convergence) = if falling_peaks && rising_troughs {
            (PatternKind::SymmetricTriangle, peak_slope.abs() + trough_slope.abs())
        } else if falling_peaks && trough_slope.abs() < FLAT_SLOPE {
            (PatternKind::DescendingTriangle, peak_slope.abs())
        } else if peak_slope.abs() < FLAT_SLOPE && rising_troughs {
            (PatternKind::AscendingTriangle, trough_slope.abs())
        } else {
            return PatternMatch::not_found(PatternKind::Triangle, "No Triangle pattern found");
        };

        let touches = peaks.len().min(troughs.len()) as f64;
        let probability = (convergence * touches * 0.2).min(PROBABILITY_CAP);

        let start = peaks[0].min(troughs[0]);
        let end = peaks[peaks.len() - 1].max(troughs[troughs.len() - 1]);

        PatternMatch::found(kind, probability, candles[start].time, candles[end].time, None)
    }
}
