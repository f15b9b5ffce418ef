// src/data/mod.rs
// Loads OHLCV series from CSV or JSON sources.

use crate::errors::{CoreError, Result};
use crate::types::{validate_candles, CandleData};
use csv::{ReaderBuilder, StringRecord};
use log::debug;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Parses a CSV with `time,open,high,low,close[,volume]` headers (any column
/// order, extra columns ignored) and validates the result.
pub fn load_candles_csv<R: Read>(reader: R) -> Result<Vec<CandleData>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();

    // Find column indices
    let mut time_idx = None;
    let mut open_idx = None;
    let mut high_idx = None;
    let mut low_idx = None;
    let mut close_idx = None;
    let mut volume_idx = None;

    for (i, name) in headers.iter().enumerate() {
        match name.to_ascii_lowercase().as_str() {
            "time" | "_time" | "timestamp" => time_idx = Some(i),
            "open" => open_idx = Some(i),
            "high" => high_idx = Some(i),
            "low" => low_idx = Some(i),
            "close" => close_idx = Some(i),
            "volume" => volume_idx = Some(i),
            _ => {}
        }
    }

    let missing = |field: &str| CoreError::Data(format!("Missing required field '{}'", field));
    let t_idx = time_idx.ok_or_else(|| missing("time"))?;
    let o_idx = open_idx.ok_or_else(|| missing("open"))?;
    let h_idx = high_idx.ok_or_else(|| missing("high"))?;
    let l_idx = low_idx.ok_or_else(|| missing("low"))?;
    let c_idx = close_idx.ok_or_else(|| missing("close"))?;

    let mut candles = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let time = required_field(&record, t_idx, "time", row)?
            .parse::<i64>()
            .map_err(|_| CoreError::Data(format!("Invalid time value at index {}", row)))?;
        let volume = match volume_idx.and_then(|idx| record.get(idx)).filter(|v| !v.is_empty()) {
            Some(v) => v
                .parse::<f64>()
                .map_err(|_| CoreError::Data(format!("Invalid volume value at index {}", row)))?,
            None => 0.0,
        };

        candles.push(CandleData {
            time,
            open: number_field(&record, o_idx, "open", row)?,
            high: number_field(&record, h_idx, "high", row)?,
            low: number_field(&record, l_idx, "low", row)?,
            close: number_field(&record, c_idx, "close", row)?,
            volume,
        });
    }

    debug!("Loaded {} candles from CSV", candles.len());
    validate_candles(&candles)?;
    Ok(candles)
}

fn required_field<'a>(
    record: &'a StringRecord,
    idx: usize,
    name: &str,
    row: usize,
) -> Result<&'a str> {
    record.get(idx).filter(|v| !v.is_empty()).ok_or_else(|| {
        CoreError::Data(format!("Missing required field '{}' at index {}", name, row))
    })
}

fn number_field(record: &StringRecord, idx: usize, name: &str, row: usize) -> Result<f64> {
    required_field(record, idx, name, row)?
        .parse::<f64>()
        .map_err(|_| CoreError::Data(format!("Invalid {} value at index {}", name, row)))
}

/// Parses a JSON array of candle objects and validates the result.
pub fn load_candles_json<R: Read>(reader: R) -> Result<Vec<CandleData>> {
    let candles: Vec<CandleData> = serde_json::from_reader(reader)?;
    debug!("Loaded {} candles from JSON", candles.len());
    validate_candles(&candles)?;
    Ok(candles)
}

/// Picks the parser from the file extension; anything other than `.json` is
/// read as CSV.
pub fn load_candles_from_path(path: &Path) -> Result<Vec<CandleData>> {
    let file = File::open(path)
        .map_err(|e| CoreError::Data(format!("Cannot open {}: {}", path.display(), e)))?;
    let reader = BufReader::new(file);

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        load_candles_json(reader)
    } else {
        load_candles_csv(reader)
    }
}
