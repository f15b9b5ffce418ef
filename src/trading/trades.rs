// src/trading/trades.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDirection {
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    SignalReversal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_time: i64,
    pub exit_time: i64,
    pub position: TradeDirection,
    pub entry_price: f64,
    pub exit_price: f64,
    pub profit_loss_percent: f64,
    pub exit_reason: ExitReason,
    pub entry_index: usize,
    pub exit_index: usize,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.profit_loss_percent > 0.0
    }
}

/// Percent return of a closed position.
pub fn trade_return_percent(direction: TradeDirection, entry_price: f64, exit_price: f64) -> f64 {
    match direction {
        TradeDirection::Long => (exit_price / entry_price - 1.0) * 100.0,
        TradeDirection::Short => (entry_price / exit_price - 1.0) * 100.0,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeSummary {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Fraction in [0, 1].
    pub win_rate: f64,
    pub profit_factor: f64,
    pub final_capital: f64,
    pub max_drawdown: f64,
    pub max_drawdown_percent: f64,
}

impl TradeSummary {
    pub fn from_trades(trades: &[Trade], initial_capital: f64) -> Self {
        let total_trades = trades.len();

        if total_trades == 0 {
            return TradeSummary {
                total_trades: 0,
                winning_trades: 0,
                losing_trades: 0,
                win_rate: 0.0,
                profit_factor: 0.0,
                final_capital: initial_capital,
                max_drawdown: 0.0,
                max_drawdown_percent: 0.0,
            };
        }

        let winning_trades = trades.iter().filter(|t| t.is_win()).count();
        let losing_trades = total_trades - winning_trades;
        let win_rate = winning_trades as f64 / total_trades as f64;

        let total_wins: f64 = trades
            .iter()
            .filter(|t| t.is_win())
            .map(|t| t.profit_loss_percent)
            .sum();
        let total_losses: f64 = trades
            .iter()
            .filter(|t| !t.is_win())
            .map(|t| t.profit_loss_percent)
            .sum::<f64>()
            .abs();

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        // Compounding equity; the two drawdowns are tracked separately since the
        // largest absolute drop need not be the largest relative one.
        let mut equity = initial_capital;
        let mut peak = initial_capital;
        let mut max_drawdown = 0.0_f64;
        let mut max_drawdown_percent = 0.0_f64;

        for trade in trades {
            equity *= 1.0 + trade.profit_loss_percent / 100.0;
            if equity > peak {
                peak = equity;
            }
            let drawdown = peak - equity;
            max_drawdown = max_drawdown.max(drawdown);
            if peak > 0.0 {
                max_drawdown_percent = max_drawdown_percent.max(drawdown / peak * 100.0);
            }
        }

        TradeSummary {
            total_trades,
            winning_trades,
            losing_trades,
            win_rate,
            profit_factor,
            final_capital: equity,
            max_drawdown,
            max_drawdown_percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(pct: f64) -> Trade {
        Trade {
            entry_time: 0,
            exit_time: 1,
            position: TradeDirection::Long,
            entry_price: 100.0,
            exit_price: 100.0 + pct,
            profit_loss_percent: pct,
            exit_reason: ExitReason::SignalReversal,
            entry_index: 0,
            exit_index: 1,
        }
    }

    #[test]
    fn summary_compounds_and_tracks_drawdown() {
        let summary = TradeSummary::from_trades(&[trade(10.0), trade(-10.0), trade(5.0)], 10_000.0);
        assert_eq!(summary.total_trades, 3);
        assert_eq!(summary.winning_trades, 2);
        assert_eq!(summary.losing_trades, 1);
        assert!((summary.final_capital - 10_395.0).abs() < 1e-6);
        assert!((summary.max_drawdown - 1_100.0).abs() < 1e-6);
        assert!((summary.max_drawdown_percent - 10.0).abs() < 1e-9);
        assert!((summary.profit_factor - 1.5).abs() < 1e-12);
    }

    #[test]
    fn profit_factor_edges() {
        let only_wins = TradeSummary::from_trades(&[trade(1.0)], 10_000.0);
        assert!(only_wins.profit_factor.is_infinite());

        let flat = TradeSummary::from_trades(&[trade(0.0), trade(0.0)], 10_000.0);
        assert_eq!(flat.profit_factor, 0.0);
        assert_eq!(flat.losing_trades, 2);
    }

    #[test]
    fn short_returns_are_inverted() {
        let r = trade_return_percent(TradeDirection::Short, 100.0, 50.0);
        assert!((r - 100.0).abs() < 1e-12);
        let r = trade_return_percent(TradeDirection::Long, 100.0, 98.0);
        assert!((r + 2.0).abs() < 1e-12);
    }
}
