// tests/common/mod.rs
#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use strategy_lab::trading::{
    ParamValue, Parameters, RiskManagement, Rule, RuleAction, RuleCondition, Strategy,
};
use strategy_lab::CandleData;

pub const START_TIME: i64 = 1_700_000_000;
pub const BAR_SECONDS: i64 = 3_600;

pub fn time_at(i: usize) -> i64 {
    START_TIME + i as i64 * BAR_SECONDS
}

/// Flat bar with a one-unit range around `close`.
pub fn bar(i: usize, close: f64) -> CandleData {
    CandleData::new(time_at(i), close, close + 0.5, close - 0.5, close, 1_000.0)
}

pub fn ohlc(i: usize, open: f64, high: f64, low: f64, close: f64) -> CandleData {
    CandleData::new(time_at(i), open, high, low, close, 1_000.0)
}

pub fn from_closes(closes: &[f64]) -> Vec<CandleData> {
    closes.iter().enumerate().map(|(i, &c)| bar(i, c)).collect()
}

/// Piecewise-linear closes through `(index, price)` waypoints.
pub fn waypoints(points: &[(usize, f64)]) -> Vec<CandleData> {
    let mut closes = Vec::new();
    for pair in points.windows(2) {
        let ((a, pa), (b, pb)) = (pair[0], pair[1]);
        for i in a..b {
            closes.push(pa + (pb - pa) * (i - a) as f64 / (b - a) as f64);
        }
    }
    if let Some(&(_, last)) = points.last() {
        closes.push(last);
    }
    from_closes(&closes)
}

pub fn ascending(n: usize) -> Vec<CandleData> {
    from_closes(&(0..n).map(|i| 100.0 + i as f64).collect::<Vec<_>>())
}

pub fn sine(n: usize, period: f64, amplitude: f64) -> Vec<CandleData> {
    let closes: Vec<f64> = (0..n)
        .map(|i| 100.0 + amplitude * (i as f64 * std::f64::consts::TAU / period).sin())
        .collect();
    from_closes(&closes)
}

/// Seeded random walk with consistent OHLC ordering.
pub fn random_walk(seed: u64, n: usize) -> Vec<CandleData> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut price = 100.0_f64;
    (0..n)
        .map(|i| {
            let open = price;
            let close = (open * (1.0 + rng.gen_range(-0.02..0.02))).max(1.0);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            price = close;
            ohlc(i, open, high, low, close)
        })
        .collect()
}

/// Moving-average crossover strategy driven by `SMA_<period>_period`.
pub fn sma_strategy(period: usize) -> Strategy {
    let name = format!("SMA_{}", period);
    let mut parameters = Parameters::new();
    parameters.insert(format!("{}_period", name), ParamValue::from(period));

    Strategy {
        name: "SMA crossover".to_string(),
        description: "Test strategy".to_string(),
        entry_rules: vec![Rule::Indicator {
            indicator: name.clone(),
            action: RuleAction::Buy,
            condition: RuleCondition::PriceCrossesAbove,
            threshold: None,
            description: format!("Enter long when price crosses above {}", name),
        }],
        exit_rules: vec![Rule::StopLoss {
            action: RuleAction::ExitLong,
            percent: 2.0,
            description: "Exit long when price falls 2% below entry".to_string(),
        }],
        risk_management: RiskManagement::default(),
        parameters,
    }
}
