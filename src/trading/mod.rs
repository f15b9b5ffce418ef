// src/trading/mod.rs
pub mod backtest;
pub mod optimizer;
pub mod report;
pub mod strategy;
pub mod strategy_builder;
pub mod trades;

pub use backtest::{backtest_strategy, BacktestEngine, BacktestResult};
pub use optimizer::{optimize_strategy, OptimizationOutcome, ParamRanges, StrategyOptimizer};
pub use report::{generate_strategy_report, PerformanceRating, StrategyReport};
pub use strategy::{
    ParamValue, Parameters, RiskManagement, Rule, RuleAction, RuleCondition, Strategy,
};
pub use strategy_builder::create_strategy;
pub use trades::{ExitReason, Trade, TradeDirection, TradeSummary};
