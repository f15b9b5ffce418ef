// src/indicators/mod.rs

use crate::errors::{CoreError, Result};
use crate::types::{CandleData, IndicatorSeries};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

mod bands;
mod moving_average;
mod oscillators;

pub use bands::calculate_bollinger_bands;
pub use moving_average::{calculate_ema, calculate_sma};
pub use oscillators::{calculate_macd, calculate_rsi};

pub(crate) use moving_average::sma_values;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndicatorKind {
    Sma,
    Ema,
    Rsi,
    Macd,
    Bollinger,
}

impl IndicatorKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "SMA" => Some(Self::Sma),
            "EMA" => Some(Self::Ema),
            "RSI" => Some(Self::Rsi),
            "MACD" => Some(Self::Macd),
            "BB" | "BOLLINGER" => Some(Self::Bollinger),
            _ => None,
        }
    }

    pub fn default_period(&self) -> usize {
        match self {
            Self::Sma | Self::Ema | Self::Bollinger => 20,
            Self::Rsi => 14,
            Self::Macd => 12,
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sma => "SMA",
            Self::Ema => "EMA",
            Self::Rsi => "RSI",
            Self::Macd => "MACD",
            Self::Bollinger => "BB",
        };
        write!(f, "{}", name)
    }
}

/// A parsed `"TYPE_PERIOD"` indicator spec such as `SMA_20`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorSpec {
    pub kind: IndicatorKind,
    pub period: Option<usize>,
}

impl IndicatorSpec {
    pub fn parse(spec: &str) -> Result<Self> {
        let base = spec.split('_').next().unwrap_or_default();
        let kind = IndicatorKind::from_name(base).ok_or_else(|| {
            CoreError::Validation(format!("Unsupported indicator type: {}", spec))
        })?;
        Ok(Self {
            kind,
            period: embedded_period(spec),
        })
    }

    pub fn period_or_default(&self) -> usize {
        self.period.unwrap_or_else(|| self.kind.default_period())
    }
}

/// Digits of the second `_`-separated component, if it is all digits.
pub fn embedded_period(spec: &str) -> Option<usize> {
    let part = spec.split('_').nth(1)?;
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    pub period: Option<usize>,
    pub fast_period: Option<usize>,
    pub slow_period: Option<usize>,
    pub signal_period: Option<usize>,
    pub std_dev: Option<f64>,
}

/// Single-line indicators return one series; MACD and Bollinger return one
/// series per named line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndicatorOutput {
    Single(IndicatorSeries),
    Multi(IndexMap<String, IndicatorSeries>),
}

impl IndicatorOutput {
    pub fn as_single(&self) -> Option<&IndicatorSeries> {
        match self {
            IndicatorOutput::Single(series) => Some(series),
            IndicatorOutput::Multi(_) => None,
        }
    }

    pub fn line(&self, name: &str) -> Option<&IndicatorSeries> {
        match self {
            IndicatorOutput::Single(_) => None,
            IndicatorOutput::Multi(lines) => lines.get(name),
        }
    }
}

fn positive(name: &str, value: usize) -> Result<usize> {
    if value == 0 {
        return Err(CoreError::Validation(format!("{} must be greater than 0", name)));
    }
    Ok(value)
}

/// Computes one indicator. A period embedded in `indicator_type` (e.g.
/// `RSI_7`) takes precedence over `params.period`.
pub fn calculate_indicator(
    candles: &[CandleData],
    indicator_type: &str,
    params: &IndicatorParams,
) -> Result<IndicatorOutput> {
    let spec = IndicatorSpec::parse(indicator_type)?;
    let period = spec.period.or(params.period);

    debug!(
        "Calculating {} (period {:?}) over {} candles",
        spec.kind,
        period,
        candles.len()
    );

    let output = match spec.kind {
        IndicatorKind::Sma => {
            let period = positive("period", period.unwrap_or(20))?;
            IndicatorOutput::Single(calculate_sma(candles, period))
        }
        IndicatorKind::Ema => {
            let period = positive("period", period.unwrap_or(20))?;
            IndicatorOutput::Single(calculate_ema(candles, period))
        }
        IndicatorKind::Rsi => {
            let period = positive("period", period.unwrap_or(14))?;
            IndicatorOutput::Single(calculate_rsi(candles, period))
        }
        IndicatorKind::Macd => {
            let fast = positive("fast_period", params.fast_period.unwrap_or(12))?;
            let slow = positive("slow_period", params.slow_period.unwrap_or(26))?;
            let signal = positive("signal_period", params.signal_period.unwrap_or(9))?;
            IndicatorOutput::Multi(calculate_macd(candles, fast, slow, signal))
        }
        IndicatorKind::Bollinger => {
            let period = positive("period", period.unwrap_or(20))?;
            let std_dev = params.std_dev.unwrap_or(2.0);
            if !std_dev.is_finite() || std_dev < 0.0 {
                return Err(CoreError::Validation(format!(
                    "Invalid std_dev value: {}",
                    std_dev
                )));
            }
            IndicatorOutput::Multi(calculate_bollinger_bands(candles, period, std_dev))
        }
    };

    check_finite(indicator_type, &output)?;
    Ok(output)
}

fn check_finite(name: &str, output: &IndicatorOutput) -> Result<()> {
    let finite = match output {
        IndicatorOutput::Single(series) => series.iter().all(|p| p.value.is_finite()),
        IndicatorOutput::Multi(lines) => lines
            .values()
            .all(|series| series.iter().all(|p| p.value.is_finite())),
    };
    if finite {
        Ok(())
    } else {
        Err(CoreError::Analysis(format!(
            "Indicator {} produced non-finite values",
            name
        )))
    }
}

/// Computes every spec independently; a failing spec records its error without
/// affecting the others. Keys keep the caller's order.
pub fn calculate_multiple_indicators<S: AsRef<str>>(
    candles: &[CandleData],
    specs: &[S],
) -> IndexMap<String, Result<IndicatorOutput>> {
    let mut result = IndexMap::new();
    for spec in specs {
        let spec = spec.as_ref();
        let output = calculate_indicator(candles, spec, &IndicatorParams::default());
        if let Err(e) = &output {
            warn!("Error calculating indicator {}: {}", spec, e);
        }
        result.insert(spec.to_string(), output);
    }
    result
}
