// src/main.rs
use clap::{Args, Parser, Subcommand};
use indexmap::IndexMap;
use log::{debug, error};
use serde::Serialize;
use serde_json::{json, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use strategy_lab::config::{setup_logging, EngineConfig};
use strategy_lab::errors::{CoreError, ErrorResponse, Result};
use strategy_lab::indicators::{calculate_multiple_indicators, IndicatorOutput};
use strategy_lab::patterns::PatternDetector;
use strategy_lab::trading::{
    create_strategy, generate_strategy_report, BacktestEngine, ParamRanges, ParamValue, Strategy,
    StrategyOptimizer,
};
use strategy_lab::types::CandleData;
use strategy_lab::load_candles_from_path;

const DEFAULT_INDICATORS: [&str; 3] = ["SMA_20", "RSI_14", "MACD"];

#[derive(Parser, Debug)]
#[command(name = "strategy_lab")]
#[command(about = "Indicators, chart patterns, backtests and parameter sweeps over OHLCV data")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct DataArgs {
    /// Candle file: .csv with time,open,high,low,close[,volume] headers or a JSON array
    #[arg(long)]
    data: PathBuf,
}

#[derive(Args, Debug)]
struct StrategyArgs {
    #[command(flatten)]
    data: DataArgs,

    /// Strategy JSON document; built from the data when omitted
    #[arg(long)]
    strategy: Option<PathBuf>,

    /// Indicator specs used to build the strategy (e.g. SMA_20)
    #[arg(long = "indicator")]
    indicators: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calculate indicators
    Indicators {
        #[command(flatten)]
        data: DataArgs,
        /// Indicator specs, e.g. SMA_20 RSI_14 MACD BB_20
        #[arg(long = "spec", required = true, num_args = 1..)]
        specs: Vec<String>,
    },
    /// Detect chart patterns
    Patterns {
        #[command(flatten)]
        data: DataArgs,
    },
    /// Build a strategy from detected patterns and indicators
    Strategy {
        #[command(flatten)]
        data: DataArgs,
        #[arg(long = "indicator")]
        indicators: Vec<String>,
    },
    /// Backtest a strategy
    Backtest {
        #[command(flatten)]
        args: StrategyArgs,
    },
    /// Grid-search strategy parameters
    Optimize {
        #[command(flatten)]
        args: StrategyArgs,
        /// NAME=V1,V2,... (repeatable)
        #[arg(long = "range", required = true)]
        ranges: Vec<String>,
    },
    /// Backtest a strategy and summarise the result
    Report {
        #[command(flatten)]
        args: StrategyArgs,
    },
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.debug);

    match run(cli.command) {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(text) => println!("{}", text),
            Err(e) => fail(&CoreError::Internal(format!("Failed to render output: {}", e))),
        },
        Err(e) => fail(&e),
    }
}

fn fail(e: &CoreError) -> ! {
    error!("{}", e);
    let body = ErrorResponse::from(e);
    match serde_json::to_string_pretty(&body) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{{\"success\": false}}"),
    }
    std::process::exit(1);
}

fn to_value<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn run(command: Command) -> Result<Value> {
    let config = EngineConfig::from_env()?;
    debug!("Engine config: {:?}", config);

    match command {
        Command::Indicators { data, specs } => {
            let candles = load(&data)?;
            let results = calculate_multiple_indicators(&candles, &specs);
            let mut out = serde_json::Map::new();
            for (spec, result) in results {
                let value = match result {
                    Ok(output) => to_value(&output)?,
                    Err(e) => to_value(&ErrorResponse::from(&e))?,
                };
                out.insert(spec, value);
            }
            Ok(Value::Object(out))
        }
        Command::Patterns { data } => {
            let candles = load(&data)?;
            let detector = PatternDetector::new(config.pivot_order);
            to_value(&detector.identify(&candles))
        }
        Command::Strategy { data, indicators } => {
            let candles = load(&data)?;
            let strategy = build_strategy(&config, &candles, &indicators);
            to_value(&strategy)
        }
        Command::Backtest { args } => {
            let candles = load(&args.data)?;
            let strategy = resolve_strategy(&config, &candles, &args)?;
            let result = BacktestEngine::from_config(&config).run(&strategy, &candles)?;
            to_value(&result)
        }
        Command::Optimize { args, ranges } => {
            let candles = load(&args.data)?;
            let strategy = resolve_strategy(&config, &candles, &args)?;
            let ranges = parse_ranges(&ranges)?;
            let outcome =
                StrategyOptimizer::from_config(&config).optimize(&strategy, &candles, &ranges)?;
            to_value(&outcome)
        }
        Command::Report { args } => {
            let candles = load(&args.data)?;
            let strategy = resolve_strategy(&config, &candles, &args)?;
            let result = BacktestEngine::from_config(&config).run(&strategy, &candles)?;
            let report = generate_strategy_report(&strategy, &result);
            Ok(json!({ "success": true, "report": report, "backtest": result }))
        }
    }
}

fn load(data: &DataArgs) -> Result<Vec<CandleData>> {
    let candles = load_candles_from_path(&data.data)?;
    debug!("Loaded {} candles from {}", candles.len(), data.data.display());
    Ok(candles)
}

fn build_strategy(config: &EngineConfig, candles: &[CandleData], specs: &[String]) -> Strategy {
    let specs: Vec<&str> = if specs.is_empty() {
        DEFAULT_INDICATORS.to_vec()
    } else {
        specs.iter().map(String::as_str).collect()
    };

    let patterns = PatternDetector::new(config.pivot_order).identify(candles);
    let indicators: IndexMap<String, IndicatorOutput> =
        calculate_multiple_indicators(candles, &specs)
            .into_iter()
            .filter_map(|(name, result)| result.ok().map(|output| (name, output)))
            .collect();

    create_strategy(&patterns, &indicators)
}

fn resolve_strategy(
    config: &EngineConfig,
    candles: &[CandleData],
    args: &StrategyArgs,
) -> Result<Strategy> {
    match &args.strategy {
        Some(path) => {
            let file = File::open(path).map_err(|e| {
                CoreError::Validation(format!(
                    "Cannot read strategy file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            Strategy::from_json(BufReader::new(file))
        }
        None => Ok(build_strategy(config, candles, &args.indicators)),
    }
}

// "SMA_20_period=5,10,20"
fn parse_ranges(raw: &[String]) -> Result<ParamRanges> {
    let mut ranges = ParamRanges::new();
    for entry in raw {
        let (name, values) = entry.split_once('=').ok_or_else(|| {
            CoreError::Validation(format!("Invalid range '{}': expected NAME=V1,V2,...", entry))
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation(format!("Invalid range '{}': missing name", entry)));
        }
        let values = values
            .split(',')
            .filter(|v| !v.trim().is_empty())
            .map(str::parse::<ParamValue>)
            .collect::<Result<Vec<_>>>()?;
        ranges.insert(name.to_string(), values);
    }
    Ok(ranges)
}
