// src/patterns/mod.rs
use crate::config::DEFAULT_PIVOT_ORDER;
use crate::types::CandleData;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::fmt;

mod double_pattern;
mod extrema;
mod head_and_shoulders;
mod triangle;

pub use double_pattern::{DoubleBottomRecognizer, DoubleTopRecognizer};
pub use extrema::{find_peaks_and_troughs, Extrema};
pub use head_and_shoulders::HeadAndShouldersRecognizer;
pub use triangle::TriangleRecognizer;

pub(crate) const PROBABILITY_CAP: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    HeadAndShoulders,
    DoubleTop,
    DoubleBottom,
    AscendingTriangle,
    DescendingTriangle,
    SymmetricTriangle,
    /// Only used for "no triangle found" results.
    Triangle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    Bullish,
    Bearish,
    Neutral,
}

impl PatternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::HeadAndShoulders => "head_and_shoulders",
            PatternKind::DoubleTop => "double_top",
            PatternKind::DoubleBottom => "double_bottom",
            PatternKind::AscendingTriangle => "ascending_triangle",
            PatternKind::DescendingTriangle => "descending_triangle",
            PatternKind::SymmetricTriangle => "symmetric_triangle",
            PatternKind::Triangle => "triangle",
        }
    }

    /// "double_top" -> "Double Top"
    pub fn title(&self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Lower-case words, "double_top" -> "double top".
    pub fn words(&self) -> String {
        self.as_str().replace('_', " ")
    }

    pub fn bias(&self) -> Bias {
        match self {
            PatternKind::DoubleBottom | PatternKind::AscendingTriangle => Bias::Bullish,
            PatternKind::DoubleTop
            | PatternKind::HeadAndShoulders
            | PatternKind::DescendingTriangle => Bias::Bearish,
            PatternKind::SymmetricTriangle | PatternKind::Triangle => Bias::Neutral,
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub pattern: PatternKind,
    pub found: bool,
    pub probability: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub start_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub end_time: Option<i64>,
    /// Head, intervening trough or intervening peak, depending on the pattern.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pivot_time: Option<i64>,
    pub message: String,
}

impl PatternMatch {
    pub fn not_found(pattern: PatternKind, message: impl Into<String>) -> Self {
        Self {
            pattern,
            found: false,
            probability: 0.0,
            start_time: None,
            end_time: None,
            pivot_time: None,
            message: message.into(),
        }
    }

    pub(crate) fn found(
        pattern: PatternKind,
        probability: f64,
        start_time: i64,
        end_time: i64,
        pivot_time: Option<i64>,
    ) -> Self {
        Self {
            pattern,
            found: true,
            probability,
            start_time: Some(start_time),
            end_time: Some(end_time),
            pivot_time,
            message: format!(
                "{} pattern found with {:.2} probability",
                pattern.title(),
                probability
            ),
        }
    }
}

// Trait for pattern recognizers
pub trait PatternRecognizer {
    fn name(&self) -> &'static str;
    fn detect(&self, candles: &[CandleData], extrema: &Extrema) -> PatternMatch;
}

/// Runs every recognizer over one shared set of extrema.
pub struct PatternDetector {
    order: usize,
    recognizers: Vec<Box<dyn PatternRecognizer + Send + Sync>>,
}

impl Default for PatternDetector {
    fn default() -> Self {
        Self::new(DEFAULT_PIVOT_ORDER)
    }
}

impl PatternDetector {
    pub fn new(order: usize) -> Self {
        Self {
            order: order.max(1),
            recognizers: vec![
                Box::new(HeadAndShouldersRecognizer),
                Box::new(DoubleTopRecognizer),
                Box::new(DoubleBottomRecognizer),
                Box::new(TriangleRecognizer),
            ],
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn extrema(&self, candles: &[CandleData]) -> Extrema {
        find_peaks_and_troughs(candles, self.order)
    }

    /// Found patterns only, strongest first (stable on ties).
    pub fn identify(&self, candles: &[CandleData]) -> Vec<PatternMatch> {
        let extrema = self.extrema(candles);
        debug!(
            "Pattern scan over {} candles: {} peaks, {} troughs",
            candles.len(),
            extrema.peaks.len(),
            extrema.troughs.len()
        );

        let mut patterns: Vec<PatternMatch> = self
            .recognizers
            .iter()
            .map(|r| {
                let found = r.detect(candles, &extrema);
                trace!("{}: {}", r.name(), found.message);
                found
            })
            .filter(|m| m.found)
            .collect();

        patterns.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        debug!("Pattern scan found {} patterns", patterns.len());
        patterns
    }
}

pub fn identify_patterns(candles: &[CandleData]) -> Vec<PatternMatch> {
    PatternDetector::default().identify(candles)
}

fn detect_with<R: PatternRecognizer>(recognizer: R, candles: &[CandleData]) -> PatternMatch {
    let extrema = find_peaks_and_troughs(candles, DEFAULT_PIVOT_ORDER);
    recognizer.detect(candles, &extrema)
}

pub fn identify_head_and_shoulders(candles: &[CandleData]) -> PatternMatch {
    detect_with(HeadAndShouldersRecognizer, candles)
}

pub fn identify_double_top(candles: &[CandleData]) -> PatternMatch {
    detect_with(DoubleTopRecognizer, candles)
}

pub fn identify_double_bottom(candles: &[CandleData]) -> PatternMatch {
    detect_with(DoubleBottomRecognizer, candles)
}

pub fn identify_triangle(candles: &[CandleData]) -> PatternMatch {
    detect_with(TriangleRecognizer, candles)
}

/// Keeps the first candidate with the highest probability.
pub(crate) fn strongest(
    candidates: impl IntoIterator<Item = PatternMatch>,
) -> Option<PatternMatch> {
    let mut best: Option<PatternMatch> = None;
    for candidate in candidates {
        let stronger = best
            .as_ref()
            .map_or(true, |current| candidate.probability > current.probability);
        if stronger {
            best = Some(candidate);
        }
    }
    best
}
