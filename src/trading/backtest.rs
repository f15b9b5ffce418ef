// src/trading/backtest.rs
use crate::config::{EngineConfig, DEFAULT_INITIAL_CAPITAL, DEFAULT_MIN_BARS};
use crate::errors::{CoreError, Result};
use crate::indicators::sma_values;
use crate::trading::strategy::{RiskManagement, Strategy};
use crate::trading::trades::{trade_return_percent, ExitReason, Trade, TradeDirection, TradeSummary};
use crate::types::{format_timestamp, require_min_bars, validate_candles, CandleData};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub strategy_name: String,
    pub start_date: String,
    pub end_date: String,
    pub initial_capital: f64,
    pub final_capital: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    /// Infinite when every trade won; written as `null` in JSON.
    #[serde(with = "crate::types::unbounded_f64")]
    pub profit_factor: f64,
    pub max_drawdown: f64,
    pub max_drawdown_percent: f64,
    pub trades: Vec<Trade>,
}

impl BacktestResult {
    pub fn profit_percent(&self) -> f64 {
        (self.final_capital / self.initial_capital - 1.0) * 100.0
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenPosition {
    direction: TradeDirection,
    entry_price: f64,
    stop_loss: f64,
    take_profit: f64,
    entry_index: usize,
}

impl OpenPosition {
    fn open(direction: TradeDirection, price: f64, risk: &RiskManagement, index: usize) -> Self {
        let sl = risk.stop_loss_percent / 100.0;
        let tp = risk.take_profit_percent / 100.0;
        let (stop_loss, take_profit) = match direction {
            TradeDirection::Long => (price * (1.0 - sl), price * (1.0 + tp)),
            TradeDirection::Short => (price * (1.0 + sl), price * (1.0 - tp)),
        };
        Self {
            direction,
            entry_price: price,
            stop_loss,
            take_profit,
            entry_index: index,
        }
    }

    // Stop first, then target, then signal reversal.
    fn exit_on(&self, candle: &CandleData, prev: i8, cur: i8) -> Option<(f64, ExitReason)> {
        match self.direction {
            TradeDirection::Long => {
                if candle.low <= self.stop_loss {
                    Some((self.stop_loss, ExitReason::StopLoss))
                } else if candle.high >= self.take_profit {
                    Some((self.take_profit, ExitReason::TakeProfit))
                } else if prev == 1 && cur == -1 {
                    Some((candle.close, ExitReason::SignalReversal))
                } else {
                    None
                }
            }
            TradeDirection::Short => {
                if candle.high >= self.stop_loss {
                    Some((self.stop_loss, ExitReason::StopLoss))
                } else if candle.low <= self.take_profit {
                    Some((self.take_profit, ExitReason::TakeProfit))
                } else if prev == -1 && cur == 1 {
                    Some((candle.close, ExitReason::SignalReversal))
                } else {
                    None
                }
            }
        }
    }
}

/// Close-versus-SMA signal per bar: 1 above, -1 below, 0 on the line or
/// during warm-up.
pub fn moving_average_signals(candles: &[CandleData], period: usize) -> Vec<i8> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    sma_values(&closes, period)
        .into_iter()
        .zip(&closes)
        .map(|(ma, &close)| match ma {
            Some(ma) if close > ma => 1,
            Some(ma) if close < ma => -1,
            _ => 0,
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct BacktestEngine {
    initial_capital: f64,
    min_bars: usize,
}

impl Default for BacktestEngine {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_CAPITAL, DEFAULT_MIN_BARS)
    }
}

impl BacktestEngine {
    pub fn new(initial_capital: f64, min_bars: usize) -> Self {
        Self { initial_capital, min_bars }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.initial_capital, config.min_bars)
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    pub fn min_bars(&self) -> usize {
        self.min_bars
    }

    pub fn run(&self, strategy: &Strategy, candles: &[CandleData]) -> Result<BacktestResult> {
        require_min_bars(candles, self.min_bars, "backtesting")?;
        validate_candles(candles)?;
        strategy.validate()?;

        let trades = match strategy.moving_average_period()? {
            Some((name, period)) => {
                debug!(
                    "Backtest '{}': {} bars, signals from {} = {}",
                    strategy.name,
                    candles.len(),
                    name,
                    period
                );
                simulate(candles, period, &strategy.risk_management)?
            }
            None => {
                debug!("Backtest '{}': no moving-average parameter, no signals", strategy.name);
                Vec::new()
            }
        };

        let summary = TradeSummary::from_trades(&trades, self.initial_capital);
        if !summary.final_capital.is_finite() {
            return Err(CoreError::Analysis(
                "Equity curve became non-finite during the backtest".to_string(),
            ));
        }

        debug!(
            "Backtest '{}' finished: {} trades, final capital {:.2}",
            strategy.name, summary.total_trades, summary.final_capital
        );

        // Non-empty: checked by require_min_bars / validate_candles above.
        let first = candles[0].time;
        let last = candles[candles.len() - 1].time;

        Ok(BacktestResult {
            strategy_name: strategy.name.clone(),
            start_date: format_timestamp(first),
            end_date: format_timestamp(last),
            initial_capital: self.initial_capital,
            final_capital: summary.final_capital,
            total_trades: summary.total_trades,
            winning_trades: summary.winning_trades,
            losing_trades: summary.losing_trades,
            win_rate: summary.win_rate,
            profit_factor: summary.profit_factor,
            max_drawdown: summary.max_drawdown,
            max_drawdown_percent: summary.max_drawdown_percent,
            trades,
        })
    }
}

fn simulate(candles: &[CandleData], period: usize, risk: &RiskManagement) -> Result<Vec<Trade>> {
    let signals = moving_average_signals(candles, period);
    let mut trades = Vec::new();
    let mut position: Option<OpenPosition> = None;

    for i in (period + 1)..candles.len() {
        let candle = &candles[i];
        let (prev, cur) = (signals[i - 1], signals[i]);

        if let Some(open) = position {
            if let Some((exit_price, reason)) = open.exit_on(candle, prev, cur) {
                let pct = trade_return_percent(open.direction, open.entry_price, exit_price);
                if !pct.is_finite() {
                    return Err(CoreError::Analysis(format!(
                        "Non-finite trade return at index {}",
                        i
                    )));
                }
                trace!(
                    "bar {}: exit {:?} at {:.4} ({:?}, {:.3}%)",
                    i,
                    open.direction,
                    exit_price,
                    reason,
                    pct
                );
                trades.push(Trade {
                    entry_time: candles[open.entry_index].time,
                    exit_time: candle.time,
                    position: open.direction,
                    entry_price: open.entry_price,
                    exit_price,
                    profit_loss_percent: pct,
                    exit_reason: reason,
                    entry_index: open.entry_index,
                    exit_index: i,
                });
                position = None;
            }
        }

        if position.is_none() {
            let direction = match (prev, cur) {
                (-1, 1) => Some(TradeDirection::Long),
                (1, -1) => Some(TradeDirection::Short),
                _ => None,
            };
            if let Some(direction) = direction {
                trace!("bar {}: enter {:?} at {:.4}", i, direction, candle.close);
                position = Some(OpenPosition::open(direction, candle.close, risk, i));
            }
        }
    }

    if let Some(open) = position {
        trace!("Dropping {:?} position opened at bar {}", open.direction, open.entry_index);
    }
    Ok(trades)
}

pub fn backtest_strategy(strategy: &Strategy, candles: &[CandleData]) -> Result<BacktestResult> {
    BacktestEngine::default().run(strategy, candles)
}
