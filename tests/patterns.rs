// tests/patterns.rs
mod common;

use common::{ascending, random_walk, time_at, waypoints};
use strategy_lab::patterns::{
    find_peaks_and_troughs, identify_double_bottom, identify_double_top,
    identify_head_and_shoulders, identify_patterns, identify_triangle, PatternDetector,
    PatternKind,
};
use strategy_lab::CandleData;

fn double_top() -> Vec<CandleData> {
    waypoints(&[(0, 100.0), (10, 110.0), (20, 100.0), (30, 110.5), (40, 100.0)])
}

fn head_and_shoulders() -> Vec<CandleData> {
    waypoints(&[
        (0, 100.0),
        (10, 108.0),
        (17, 102.0),
        (25, 115.0),
        (32, 102.0),
        (40, 108.5),
        (49, 100.0),
    ])
}

fn descending_triangle() -> Vec<CandleData> {
    waypoints(&[
        (0, 100.0),
        (6, 110.0),
        (12, 100.0),
        (18, 107.0),
        (24, 100.0),
        (30, 104.0),
        (36, 100.0),
        (42, 102.0),
    ])
}

#[test]
fn extrema_never_include_the_end_bars() {
    let candles = double_top();
    let extrema = find_peaks_and_troughs(&candles, 5);
    assert_eq!(extrema.peaks, vec![10, 30]);
    assert_eq!(extrema.troughs, vec![20]);
}

#[test]
fn double_top_near_the_start_is_found() {
    // First peak sits three bars in, inside the pivot window.
    let candles = waypoints(&[(0, 100.0), (3, 110.0), (15, 100.0), (25, 109.5), (37, 100.0)]);
    let extrema = find_peaks_and_troughs(&candles, 5);
    assert_eq!(extrema.peaks, vec![3, 25]);

    let found = identify_double_top(&candles);
    assert!(found.found, "{}", found.message);
    assert_eq!(found.start_time, Some(time_at(3)));
    assert_eq!(found.pivot_time, Some(time_at(15)));
}

#[test]
fn detects_double_top() {
    let candles = double_top();
    let found = identify_double_top(&candles);
    assert!(found.found, "{}", found.message);
    assert_eq!(found.pattern, PatternKind::DoubleTop);
    assert_eq!(found.start_time, Some(time_at(10)));
    assert_eq!(found.end_time, Some(time_at(30)));
    assert_eq!(found.pivot_time, Some(time_at(20)));
    assert!(found.probability > 0.0 && found.probability <= 0.9);
    assert!(found.message.starts_with("Double Top pattern found with"));

    assert!(!identify_double_bottom(&candles).found);
    assert!(!identify_head_and_shoulders(&candles).found);
    assert!(!identify_triangle(&candles).found);
}

#[test]
fn detects_head_and_shoulders_as_strongest() {
    let candles = head_and_shoulders();
    let found = identify_head_and_shoulders(&candles);
    assert!(found.found, "{}", found.message);
    assert_eq!(found.pivot_time, Some(time_at(25)));
    assert_eq!(found.start_time, Some(time_at(10)));
    assert_eq!(found.end_time, Some(time_at(40)));

    let all = identify_patterns(&candles);
    assert_eq!(all[0].pattern, PatternKind::HeadAndShoulders);
    assert!(all.iter().any(|m| m.pattern == PatternKind::DoubleBottom));
}

#[test]
fn detects_descending_triangle() {
    let candles = descending_triangle();
    let found = identify_triangle(&candles);
    assert!(found.found, "{}", found.message);
    assert_eq!(found.pattern, PatternKind::DescendingTriangle);
    assert!((found.probability - 0.15).abs() < 1e-9);
    assert_eq!(found.start_time, Some(time_at(6)));
    assert_eq!(found.end_time, Some(time_at(36)));
}

#[test]
fn results_are_found_only_and_sorted() {
    let fixtures = [
        double_top(),
        head_and_shoulders(),
        descending_triangle(),
        random_walk(42, 300),
    ];
    for candles in fixtures {
        let patterns = identify_patterns(&candles);
        assert!(patterns.iter().all(|m| m.found));
        assert!(patterns.iter().all(|m| (0.0..=1.0).contains(&m.probability)));
        assert!(patterns.windows(2).all(|w| w[0].probability >= w[1].probability));
    }
}

#[test]
fn monotonic_series_has_no_patterns() {
    let candles = ascending(60);
    assert!(identify_patterns(&candles).is_empty());
    let triangle = identify_triangle(&candles);
    assert_eq!(triangle.pattern, PatternKind::Triangle);
    assert_eq!(triangle.message, "Insufficient peaks and troughs");
    assert!(triangle.start_time.is_none());
}

#[test]
fn short_series_is_not_an_error() {
    let candles = ascending(5);
    assert!(identify_patterns(&candles).is_empty());
    assert!(!identify_head_and_shoulders(&candles).found);
}

#[test]
fn wider_order_drops_minor_swings() {
    let candles = waypoints(&[
        (0, 100.0),
        (10, 110.0),
        (13, 108.0),
        (16, 112.0),
        (30, 100.0),
        (40, 105.0),
    ]);
    let narrow = PatternDetector::new(2).extrema(&candles);
    let wide = PatternDetector::new(5).extrema(&candles);
    assert_eq!(narrow.peaks, vec![10, 16]);
    assert_eq!(wide.peaks, vec![16]);
}
