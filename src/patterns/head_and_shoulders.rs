// src/patterns/head_and_shoulders.rs

use super::{strongest, Extrema, PatternKind, PatternMatch, PatternRecognizer, PROBABILITY_CAP};
use crate::types::CandleData;

const SHOULDER_TOLERANCE: f64 = 0.10;

pub struct HeadAndShouldersRecognizer;

impl PatternRecognizer for HeadAndShouldersRecognizer {
    fn name(&self) -> &'static str {
        "head_and_shoulders"
    }

    fn detect(&self, candles: &[CandleData], extrema: &Extrema) -> PatternMatch {
        let kind = PatternKind::HeadAndShoulders;
        let peaks = &extrema.peaks;
        if peaks.len() < 3 {
            return PatternMatch::not_found(kind, "Insufficient peaks and troughs");
        }

        let n = candles.len() as f64;
        let candidates = peaks.windows(3).filter_map(|w| {
            let (p1, p2, p3) = (w[0], w[1], w[2]);
            let (left, head, right) = (candles[p1].high, candles[p2].high, candles[p3].high);

            if !(head > left && head > right) || left <= 0.0 {
                return None;
            }
            if (left - right).abs() / left >= SHOULDER_TOLERANCE {
                return None;
            }

            let neckline = candles[p1..p3]
                .iter()
                .map(|c| c.low)
                .fold(f64::INFINITY, f64::min);
            let head_height = head - neckline;
            let pattern_length = (p3 - p1) as f64;
            let probability = (head_height / head * (pattern_length / n) * 5.0)
                .clamp(0.0, PROBABILITY_CAP);

            Some(PatternMatch::found(
                kind,
                probability,
                candles[p1].time,
                candles[p3].time,
                Some(candles[p2].time),
            ))
        });

        strongest(candidates)
            .unwrap_or_else(|| PatternMatch::not_found(kind, "No Head and Shoulders pattern found"))
    }
}
