// src/patterns/double_pattern.rs
// Double top and its mirror image, double bottom.

use super::{strongest, Extrema, PatternKind, PatternMatch, PatternRecognizer, PROBABILITY_CAP};
use crate::types::CandleData;

const LEVEL_TOLERANCE: f64 = 0.03;

pub struct DoubleTopRecognizer;

pub struct DoubleBottomRecognizer;

impl PatternRecognizer for DoubleTopRecognizer {
    fn name(&self) -> &'static str {
        "double_top"
    }

    fn detect(&self, candles: &[CandleData], extrema: &Extrema) -> PatternMatch {
        let kind = PatternKind::DoubleTop;
        if extrema.peaks.len() < 2 || extrema.troughs.is_empty() {
            return PatternMatch::not_found(kind, "Insufficient peaks and troughs");
        }

        let n = candles.len() as f64;
        let candidates = extrema.peaks.windows(2).filter_map(|w| {
            let (p1, p2) = (w[0], w[1]);
            let (first, second) = (candles[p1].high, candles[p2].high);
            if first <= 0.0 || (first - second).abs() / first >= LEVEL_TOLERANCE {
                return None;
            }

            let trough = *extrema.troughs.iter().find(|&&t| p1 < t && t < p2)?;
            let height = first - candles[trough].low;
            let probability =
                (height / first * ((p2 - p1) as f64 / n) * 5.0).clamp(0.0, PROBABILITY_CAP);

            Some(PatternMatch::found(
                kind,
                probability,
                candles[p1].time,
                candles[p2].time,
                Some(candles[trough].time),
            ))
        });

        strongest(candidates)
            .unwrap_or_else(|| PatternMatch::not_found(kind, "No Double Top pattern found"))
    }
}

impl PatternRecognizer for DoubleBottomRecognizer {
    fn name(&self) -> &'static str {
        "double_bottom"
    }

    fn detect(&self, candles: &[CandleData], extrema: &Extrema) -> PatternMatch {
        let kind = PatternKind::DoubleBottom;
        if extrema.troughs.len() < 2 || extrema.peaks.is_empty() {
            return PatternMatch::not_found(kind, "Insufficient peaks and troughs");
        }

        let n = candles.len() as f64;
        let candidates = extrema.troughs.windows(2).filter_map(|w| {
            let (t1, t2) = (w[0], w[1]);
            let (first, second) = (candles[t1].low, candles[t2].low);
            if first <= 0.0 || (first - second).abs() / first >= LEVEL_TOLERANCE {
                return None;
            }

            let peak = *extrema.peaks.iter().find(|&&p| t1 < p && p < t2)?;
            let height = candles[peak].high - first;
            let probability =
                (height / first * ((t2 - t1) as f64 / n) * 5.0).clamp(0.0, PROBABILITY_CAP);

            Some(PatternMatch::found(
                kind,
                probability,
                candles[t1].time,
                candles[t2].time,
                Some(candles[peak].time),
            ))
        });

        strongest(candidates)
            .unwrap_or_else(|| PatternMatch::not_found(kind, "No Double Bottom pattern found"))
    }
}
