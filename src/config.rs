// src/config.rs
use crate::errors::{CoreError, Result};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;
pub const DEFAULT_MIN_BARS: usize = 10;
pub const DEFAULT_MAX_COMBINATIONS: usize = 100;
pub const DEFAULT_PIVOT_ORDER: usize = 5;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub initial_capital: f64,
    pub min_bars: usize,
    pub max_combinations: usize,
    pub pivot_order: usize,
    pub parallel: bool,
    pub time_budget: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            min_bars: DEFAULT_MIN_BARS,
            max_combinations: DEFAULT_MAX_COMBINATIONS,
            pivot_order: DEFAULT_PIVOT_ORDER,
            parallel: false,
            time_budget: None,
        }
    }
}

impl EngineConfig {
    /// Reads `STRATEGY_LAB_*` variables (after loading `.env`), falling back
    /// to the defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        let defaults = Self::default();

        let initial_capital =
            env_or("STRATEGY_LAB_INITIAL_CAPITAL", defaults.initial_capital)?;
        if !initial_capital.is_finite() || initial_capital <= 0.0 {
            return Err(CoreError::Config(format!(
                "STRATEGY_LAB_INITIAL_CAPITAL must be positive, got {}",
                initial_capital
            )));
        }

        let pivot_order = env_or("STRATEGY_LAB_PIVOT_ORDER", defaults.pivot_order)?;
        if pivot_order == 0 {
            return Err(CoreError::Config(
                "STRATEGY_LAB_PIVOT_ORDER must be at least 1".to_string(),
            ));
        }

        let parallel = match std::env::var("STRATEGY_LAB_PARALLEL") {
            Ok(val) => parse_flag("STRATEGY_LAB_PARALLEL", &val)?,
            Err(_) => defaults.parallel,
        };

        let time_budget = match std::env::var("STRATEGY_LAB_TIME_BUDGET_SECS") {
            Ok(val) => {
                let secs = val.trim().parse::<f64>().map_err(|e| {
                    CoreError::Config(format!(
                        "STRATEGY_LAB_TIME_BUDGET_SECS is not a number '{}': {}",
                        val, e
                    ))
                })?;
                if !secs.is_finite() || secs <= 0.0 {
                    return Err(CoreError::Config(format!(
                        "STRATEGY_LAB_TIME_BUDGET_SECS must be positive, got {}",
                        secs
                    )));
                }
                Some(Duration::from_secs_f64(secs))
            }
            Err(_) => None,
        };

        Ok(Self {
            initial_capital,
            min_bars: env_or("STRATEGY_LAB_MIN_BARS", defaults.min_bars)?,
            max_combinations: env_or("STRATEGY_LAB_MAX_COMBINATIONS", defaults.max_combinations)?,
            pivot_order,
            parallel,
            time_budget,
        })
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<T>().map_err(|e| {
            CoreError::Config(format!("Invalid value '{}' for {}: {}", val, key, e))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_flag(key: &str, val: &str) -> Result<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(CoreError::Config(format!(
            "Invalid value '{}' for {}: expected true or false",
            other, key
        ))),
    }
}

pub fn setup_logging(debug: bool) {
    use env_logger::{Builder, Target};
    use log::LevelFilter;

    // stdout carries the JSON output.
    let mut builder = Builder::new();
    builder.target(Target::Stderr);

    if debug {
        builder.filter_level(LevelFilter::Debug);
    } else {
        builder.filter_level(LevelFilter::Info);
    }
    // RUST_LOG still wins when set.
    builder.parse_default_env();

    builder.init();
}
