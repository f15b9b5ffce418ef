// src/trading/report.rs
use crate::trading::backtest::BacktestResult;
use crate::trading::strategy::{RiskManagement, Strategy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceRating {
    Excellent,
    Good,
    Average,
    Poor,
}

impl PerformanceRating {
    pub fn assess(profit_percent: f64, win_rate: f64, max_drawdown_percent: f64) -> Self {
        if profit_percent > 20.0 && win_rate > 0.5 && max_drawdown_percent < 15.0 {
            PerformanceRating::Excellent
        } else if profit_percent > 10.0 && win_rate > 0.4 && max_drawdown_percent < 20.0 {
            PerformanceRating::Good
        } else if profit_percent > 0.0 {
            PerformanceRating::Average
        } else {
            PerformanceRating::Poor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub rating: PerformanceRating,
    pub profit_percent: f64,
    /// Percentage, unlike `BacktestResult::win_rate`.
    pub win_rate: f64,
    #[serde(with = "crate::types::unbounded_f64")]
    pub profit_factor: f64,
    pub max_drawdown_percent: f64,
    pub total_trades: usize,
    pub avg_profit_per_trade: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSummary {
    pub entry_rules: Vec<String>,
    pub exit_rules: Vec<String>,
    pub risk_management: RiskManagement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestPeriod {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyReport {
    pub strategy_name: String,
    pub strategy_description: String,
    pub performance: PerformanceSummary,
    pub summary: RuleSummary,
    pub recommendations: Vec<String>,
    pub backtest_period: BacktestPeriod,
}

pub fn generate_strategy_report(strategy: &Strategy, result: &BacktestResult) -> StrategyReport {
    let profit_percent = result.profit_percent();
    let avg_profit_per_trade = if result.total_trades > 0 {
        profit_percent / result.total_trades as f64
    } else {
        0.0
    };

    let mut recommendations = Vec::new();
    if result.win_rate < 0.4 {
        recommendations.push("Consider improving entry criteria to increase win rate".to_string());
    }
    if result.max_drawdown_percent > 20.0 {
        recommendations.push("Implement tighter stop-loss rules to reduce drawdown".to_string());
    }
    if result.total_trades < 10 {
        recommendations.push(
            "Strategy generates too few trades, consider relaxing entry criteria".to_string(),
        );
    }
    if result.profit_factor > 0.0 && result.profit_factor < 1.5 {
        recommendations
            .push("Improve risk-reward ratio by adjusting take-profit levels".to_string());
    }

    StrategyReport {
        strategy_name: strategy.name.clone(),
        strategy_description: strategy.description.clone(),
        performance: PerformanceSummary {
            rating: PerformanceRating::assess(
                profit_percent,
                result.win_rate,
                result.max_drawdown_percent,
            ),
            profit_percent,
            win_rate: result.win_rate * 100.0,
            profit_factor: result.profit_factor,
            max_drawdown_percent: result.max_drawdown_percent,
            total_trades: result.total_trades,
            avg_profit_per_trade,
        },
        summary: RuleSummary {
            entry_rules: strategy.entry_rules.iter().map(|r| r.description().to_string()).collect(),
            exit_rules: strategy.exit_rules.iter().map(|r| r.description().to_string()).collect(),
            risk_management: strategy.risk_management,
        },
        recommendations,
        backtest_period: BacktestPeriod {
            start_date: result.start_date.clone(),
            end_date: result.end_date.clone(),
        },
    }
}
