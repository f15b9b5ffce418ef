// src/trading/optimizer.rs
// Exhaustive grid search over strategy parameters.

use crate::config::{EngineConfig, DEFAULT_MAX_COMBINATIONS};
use crate::errors::{CoreError, Result};
use crate::trading::backtest::{BacktestEngine, BacktestResult};
use crate::trading::strategy::{ParamValue, Parameters, Strategy};
use crate::types::{require_min_bars, validate_candles, CandleData};
use indexmap::IndexMap;
use log::{debug, trace, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub type ParamRanges = IndexMap<String, Vec<ParamValue>>;

/// Cartesian product of the ranges in nested-loop order: the last parameter
/// varies fastest.
pub struct ParameterGrid<'a> {
    ranges: &'a ParamRanges,
    indices: Vec<usize>,
    done: bool,
}

impl<'a> ParameterGrid<'a> {
    pub fn new(ranges: &'a ParamRanges) -> Self {
        let done = ranges.is_empty() || ranges.values().any(|v| v.is_empty());
        Self {
            ranges,
            indices: vec![0; ranges.len()],
            done,
        }
    }

    /// Number of combinations, `None` on overflow.
    pub fn size(ranges: &ParamRanges) -> Option<usize> {
        if ranges.is_empty() {
            return Some(0);
        }
        ranges
            .values()
            .try_fold(1usize, |acc, values| acc.checked_mul(values.len()))
    }
}

impl Iterator for ParameterGrid<'_> {
    type Item = Parameters;

    fn next(&mut self) -> Option<Parameters> {
        if self.done {
            return None;
        }

        let combination: Parameters = self
            .ranges
            .iter()
            .zip(&self.indices)
            .map(|((name, values), &i)| (name.clone(), values[i]))
            .collect();

        // Odometer step from the last position.
        let mut pos = self.indices.len();
        loop {
            if pos == 0 {
                self.done = true;
                break;
            }
            pos -= 1;
            self.indices[pos] += 1;
            if self.indices[pos] < self.ranges[pos].len() {
                break;
            }
            self.indices[pos] = 0;
        }

        Some(combination)
    }
}

/// `0.5 * profit% + 0.3 * win rate% - 0.2 * max drawdown%`
pub fn performance_score(result: &BacktestResult) -> f64 {
    0.5 * result.profit_percent() + 0.3 * result.win_rate * 100.0
        - 0.2 * result.max_drawdown_percent
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationOutcome {
    pub optimized_strategy: Strategy,
    pub backtest_result: BacktestResult,
    pub performance_score: f64,
    /// Size of the full grid.
    pub tested_combinations: usize,
    pub evaluated_combinations: usize,
    /// Evaluated combinations that produced no trades or failed.
    pub skipped_combinations: usize,
    pub timed_out: bool,
}

#[derive(Debug, Clone)]
pub struct StrategyOptimizer {
    engine: BacktestEngine,
    max_combinations: usize,
    parallel: bool,
    time_budget: Option<Duration>,
}

impl Default for StrategyOptimizer {
    fn default() -> Self {
        Self {
            engine: BacktestEngine::default(),
            max_combinations: DEFAULT_MAX_COMBINATIONS,
            parallel: false,
            time_budget: None,
        }
    }
}

enum Evaluation {
    Scored {
        strategy: Strategy,
        result: BacktestResult,
        score: f64,
    },
    Skipped,
    NotStarted,
}

impl StrategyOptimizer {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            engine: BacktestEngine::from_config(config),
            max_combinations: config.max_combinations,
            parallel: config.parallel,
            time_budget: config.time_budget,
        }
    }

    pub fn with_engine(mut self, engine: BacktestEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_max_combinations(mut self, max: usize) -> Self {
        self.max_combinations = max;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_time_budget(mut self, budget: Option<Duration>) -> Self {
        self.time_budget = budget;
        self
    }

    pub fn optimize(
        &self,
        strategy: &Strategy,
        candles: &[CandleData],
        ranges: &ParamRanges,
    ) -> Result<OptimizationOutcome> {
        require_min_bars(candles, self.engine.min_bars(), "optimization")?;
        if ranges.is_empty() {
            return Err(CoreError::Validation(
                "Parameter ranges cannot be empty".to_string(),
            ));
        }
        if let Some((name, _)) = ranges.iter().find(|(_, values)| values.is_empty()) {
            return Err(CoreError::Validation(format!(
                "Parameter range for '{}' has no values",
                name
            )));
        }

        let total = ParameterGrid::size(ranges);
        match total {
            Some(n) if n <= self.max_combinations => {}
            _ => {
                let shown = total.map_or_else(|| "overflow".to_string(), |n| n.to_string());
                return Err(CoreError::Validation(format!(
                    "Too many parameter combinations ({}). Maximum allowed is {}.",
                    shown, self.max_combinations
                )));
            }
        }
        let total = total.unwrap_or_default();

        validate_candles(candles)?;
        strategy.validate()?;

        let deadline = self.time_budget.map(|budget| Instant::now() + budget);
        debug!(
            "Optimizing '{}' over {} combinations (parallel: {}, budget: {:?})",
            strategy.name, total, self.parallel, self.time_budget
        );

        let evaluations: Vec<Evaluation> = if self.parallel {
            let combinations: Vec<Parameters> = ParameterGrid::new(ranges).collect();
            combinations
                .par_iter()
                .map(|combo| self.evaluate(strategy, candles, combo, deadline))
                .collect()
        } else {
            let mut out = Vec::with_capacity(total);
            for combo in ParameterGrid::new(ranges) {
                let evaluation = self.evaluate(strategy, candles, &combo, deadline);
                let stop = matches!(evaluation, Evaluation::NotStarted);
                out.push(evaluation);
                if stop {
                    break;
                }
            }
            out
        };

        let mut evaluated = 0;
        let mut skipped = 0;
        let mut timed_out = false;
        let mut best: Option<(Strategy, BacktestResult, f64)> = None;

        for evaluation in evaluations {
            match evaluation {
                Evaluation::Scored { strategy, result, score } => {
                    evaluated += 1;
                    if best.as_ref().map_or(true, |(_, _, s)| score > *s) {
                        best = Some((strategy, result, score));
                    }
                }
                Evaluation::Skipped => {
                    evaluated += 1;
                    skipped += 1;
                }
                Evaluation::NotStarted => timed_out = true,
            }
        }

        if timed_out {
            warn!(
                "Optimization time budget exhausted after {} of {} combinations",
                evaluated, total
            );
        }

        let Some((optimized_strategy, backtest_result, performance_score)) = best else {
            return Err(CoreError::Optimization(
                "No parameter combination produced any trades".to_string(),
            ));
        };

        debug!(
            "Best combination: '{}' with score {:.4}",
            optimized_strategy.name, performance_score
        );

        Ok(OptimizationOutcome {
            optimized_strategy,
            backtest_result,
            performance_score,
            tested_combinations: total,
            evaluated_combinations: evaluated,
            skipped_combinations: skipped,
            timed_out,
        })
    }

    fn evaluate(
        &self,
        strategy: &Strategy,
        candles: &[CandleData],
        combo: &Parameters,
        deadline: Option<Instant>,
    ) -> Evaluation {
        if deadline.map_or(false, |d| Instant::now() >= d) {
            return Evaluation::NotStarted;
        }

        let mut candidate = strategy.with_parameters(combo);
        candidate.name = labelled_name(&strategy.name, combo);

        match self.engine.run(&candidate, candles) {
            Ok(result) if result.total_trades > 0 => {
                let score = performance_score(&result);
                trace!("{}: {} trades, score {:.4}", candidate.name, result.total_trades, score);
                Evaluation::Scored {
                    strategy: candidate,
                    result,
                    score,
                }
            }
            Ok(_) => {
                trace!("{}: no trades", candidate.name);
                Evaluation::Skipped
            }
            Err(e) => {
                warn!("Skipping {}: {}", candidate.name, e);
                Evaluation::Skipped
            }
        }
    }
}

// "name (k1=v1, k2=v2)"
fn labelled_name(base: &str, combo: &Parameters) -> String {
    let assignments: Vec<String> = combo.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    format!("{} ({})", base, assignments.join(", "))
}

pub fn optimize_strategy(
    strategy: &Strategy,
    candles: &[CandleData],
    ranges: &ParamRanges,
) -> Result<OptimizationOutcome> {
    StrategyOptimizer::default().optimize(strategy, candles, ranges)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(spec: &[(&str, &[i64])]) -> ParamRanges {
        spec.iter()
            .map(|(name, values)| {
                (name.to_string(), values.iter().map(|&v| ParamValue::Int(v)).collect())
            })
            .collect()
    }

    #[test]
    fn grid_varies_last_parameter_fastest() {
        let r = ranges(&[("a", &[1, 2]), ("b", &[10, 20, 30])]);
        let combos: Vec<(i64, i64)> = ParameterGrid::new(&r)
            .map(|p| (p["a"].as_f64() as i64, p["b"].as_f64() as i64))
            .collect();
        assert_eq!(
            combos,
            vec![(1, 10), (1, 20), (1, 30), (2, 10), (2, 20), (2, 30)]
        );
        assert_eq!(ParameterGrid::size(&r), Some(6));
    }

    #[test]
    fn empty_value_list_yields_nothing() {
        let r = ranges(&[("a", &[1, 2]), ("b", &[])]);
        assert_eq!(ParameterGrid::new(&r).count(), 0);
        assert_eq!(ParameterGrid::size(&r), Some(0));
    }

    #[test]
    fn labels_list_assignments_in_order() {
        let mut combo = Parameters::new();
        combo.insert("SMA_20_period".into(), ParamValue::Int(10));
        combo.insert("x".into(), ParamValue::Float(1.5));
        assert_eq!(labelled_name("S", &combo), "S (SMA_20_period=10, x=1.5)");
    }
}
