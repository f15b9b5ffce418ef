// src/lib.rs
pub mod config;
pub mod data;
pub mod errors;
pub mod indicators;
pub mod patterns;
pub mod trading;
pub mod types;

pub use config::EngineConfig;
pub use data::{load_candles_csv, load_candles_from_path, load_candles_json};
pub use errors::{CoreError, ErrorResponse, Result};
pub use indicators::{
    calculate_indicator, calculate_multiple_indicators, IndicatorOutput, IndicatorParams,
};
pub use patterns::{identify_patterns, PatternDetector, PatternKind, PatternMatch};
pub use trading::{
    backtest_strategy, create_strategy, generate_strategy_report, optimize_strategy,
    BacktestEngine, BacktestResult, OptimizationOutcome, StrategyOptimizer, StrategyReport,
};
pub use types::{validate_candles, CandleData, IndicatorPoint, IndicatorSeries};
