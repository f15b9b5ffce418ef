// tests/indicators.rs
mod common;

use common::{ascending, from_closes, random_walk};
use strategy_lab::indicators::{
    calculate_bollinger_bands, calculate_indicator, calculate_multiple_indicators, calculate_rsi,
    calculate_sma, IndicatorParams,
};
use strategy_lab::CoreError;

#[test]
fn sma_has_one_point_per_full_window() {
    let candles = random_walk(7, 60);
    for period in [1, 5, 20, 60] {
        let sma = calculate_sma(&candles, period);
        assert_eq!(sma.len(), candles.len() + 1 - period, "period {}", period);
        assert_eq!(sma[0].time, candles[period - 1].time);
    }
    assert!(calculate_sma(&candles, 61).is_empty());
}

#[test]
fn sma_values_are_window_means() {
    let candles = from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    let values: Vec<f64> = calculate_sma(&candles, 3).iter().map(|p| p.value).collect();
    assert_eq!(values, vec![2.0, 3.0, 4.0]);
}

#[test]
fn rsi_stays_within_bounds() {
    for seed in 0..5 {
        let candles = random_walk(seed, 200);
        let rsi = calculate_rsi(&candles, 14);
        assert!(!rsi.is_empty());
        assert_eq!(rsi[0].time, candles[14].time);
        for point in &rsi {
            assert!((0.0..=100.0).contains(&point.value), "seed {}: {}", seed, point.value);
        }
    }
}

#[test]
fn rsi_of_rising_series_is_100() {
    let rsi = calculate_rsi(&ascending(30), 14);
    assert_eq!(rsi.len(), 16);
    assert!(rsi.iter().all(|p| p.value == 100.0));
}

#[test]
fn flat_window_produces_no_rsi_point() {
    let candles = from_closes(&[100.0; 20]);
    assert!(calculate_rsi(&candles, 14).is_empty());
}

#[test]
fn bollinger_bands_are_ordered() {
    let candles = random_walk(11, 120);
    let bands = calculate_bollinger_bands(&candles, 20, 2.0);
    let (upper, middle, lower) = (&bands["upper"], &bands["middle"], &bands["lower"]);
    assert_eq!(upper.len(), 101);
    for i in 0..upper.len() {
        assert!(upper[i].value >= middle[i].value);
        assert!(middle[i].value >= lower[i].value);
    }
}

#[test]
fn macd_returns_three_aligned_lines() {
    let candles = random_walk(3, 80);
    let output = calculate_indicator(&candles, "MACD", &IndicatorParams::default()).unwrap();
    for line in ["macd", "signal", "histogram"] {
        assert_eq!(output.line(line).map(|s| s.len()), Some(80), "{}", line);
    }
    let macd = output.line("macd").unwrap();
    let signal = output.line("signal").unwrap();
    let hist = output.line("histogram").unwrap();
    assert!((hist[40].value - (macd[40].value - signal[40].value)).abs() < 1e-12);
}

#[test]
fn embedded_period_wins_over_params() {
    let candles = random_walk(5, 50);
    let params = IndicatorParams { period: Some(30), ..Default::default() };
    let output = calculate_indicator(&candles, "SMA_10", &params).unwrap();
    assert_eq!(output.as_single().map(|s| s.len()), Some(41));
}

#[test]
fn unknown_indicator_is_a_validation_error() {
    let candles = random_walk(1, 30);
    let err = calculate_indicator(&candles, "VWAP_20", &IndicatorParams::default()).unwrap_err();
    assert_eq!(err, CoreError::Validation("Unsupported indicator type: VWAP_20".to_string()));
}

#[test]
fn zero_period_is_rejected() {
    let candles = random_walk(1, 30);
    let params = IndicatorParams { period: Some(0), ..Default::default() };
    let err = calculate_indicator(&candles, "RSI", &params).unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}

#[test]
fn multiple_indicators_keep_order_and_isolate_failures() {
    let candles = random_walk(9, 60);
    let results = calculate_multiple_indicators(&candles, &["RSI_14", "FOO", "SMA_5", "BB_20"]);
    let keys: Vec<&str> = results.keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["RSI_14", "FOO", "SMA_5", "BB_20"]);
    assert!(results["RSI_14"].is_ok());
    assert!(results["FOO"].is_err());
    assert!(results["SMA_5"].is_ok());
    assert!(results["BB_20"].as_ref().unwrap().line("middle").is_some());
}
