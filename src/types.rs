// src/types.rs
use crate::errors::{CoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Input ---
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct CandleData {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl CandleData {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self { time, open, high, low, close, volume }
    }
}

// --- Output ---
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub time: i64,
    pub value: f64,
}

pub type IndicatorSeries = Vec<IndicatorPoint>;

/// Checks every candle for finite prices and consistent OHLC ordering, and the
/// series for strictly increasing timestamps. The first violation wins.
pub fn validate_candles(candles: &[CandleData]) -> Result<()> {
    if candles.is_empty() {
        return Err(CoreError::Data("Data is empty".to_string()));
    }

    for (i, c) in candles.iter().enumerate() {
        let prices = [("open", c.open), ("high", c.high), ("low", c.low), ("close", c.close)];
        for (field, value) in prices {
            if !value.is_finite() {
                return Err(CoreError::Data(format!("Invalid {} value at index {}", field, i)));
            }
        }
        if !c.volume.is_finite() || c.volume < 0.0 {
            return Err(CoreError::Data(format!("Invalid volume value at index {}", i)));
        }

        if c.high < c.low {
            return Err(CoreError::Data(format!(
                "High value is less than low value at index {}",
                i
            )));
        }
        if c.high < c.open || c.high < c.close {
            return Err(CoreError::Data(format!(
                "High value is less than open or close value at index {}",
                i
            )));
        }
        if c.low > c.open || c.low > c.close {
            return Err(CoreError::Data(format!(
                "Low value is greater than open or close value at index {}",
                i
            )));
        }

        if i > 0 && c.time <= candles[i - 1].time {
            return Err(CoreError::Data(format!(
                "Time value is not strictly increasing at index {}",
                i
            )));
        }
    }

    Ok(())
}

pub fn require_min_bars(candles: &[CandleData], min_bars: usize, what: &str) -> Result<()> {
    if candles.len() < min_bars {
        return Err(CoreError::Data(format!(
            "Insufficient data for {}: {} bars supplied, at least {} required",
            what,
            candles.len(),
            min_bars
        )));
    }
    Ok(())
}

/// RFC 3339 rendering of a unix timestamp; falls back to the raw number when
/// the timestamp is out of chrono's range.
pub fn format_timestamp(time: i64) -> String {
    match DateTime::<Utc>::from_timestamp(time, 0) {
        Some(dt) => dt.to_rfc3339(),
        None => time.to_string(),
    }
}

/// Serde adapter for ratios that may be `+inf`. JSON has no infinity, so it is
/// written as `null`; `null` and the strings `"inf"` / `"infinity"` read back
/// as `f64::INFINITY`.
pub mod unbounded_f64 {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if *value == f64::INFINITY {
            serializer.serialize_none()
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Option::<Wire>::deserialize(deserializer)? {
            None => Ok(f64::INFINITY),
            Some(Wire::Number(v)) => Ok(v),
            Some(Wire::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "inf" | "+inf" | "infinity" => Ok(f64::INFINITY),
                other => Err(D::Error::custom(format!(
                    "expected a number or \"inf\", got '{}'",
                    other
                ))),
            },
        }
    }
}
