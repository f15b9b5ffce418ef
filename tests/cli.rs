// tests/cli.rs
mod common;

use common::ascending;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use strategy_lab::CandleData;
use tempfile::TempDir;

fn write_csv(dir: &TempDir, candles: &[CandleData]) -> PathBuf {
    let mut text = String::from("time,open,high,low,close,volume\n");
    for c in candles {
        text.push_str(&format!(
            "{},{},{},{},{},{}\n",
            c.time, c.open, c.high, c.low, c.close, c.volume
        ));
    }
    let path = dir.path().join("candles.csv");
    fs::write(&path, text).unwrap();
    path
}

fn run(args: &[&str], data: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_strategy_lab"))
        .args(args)
        .arg("--data")
        .arg(data)
        .env("RUST_LOG", "debug")
        .output()
        .unwrap()
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({}): {}",
            e,
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

#[test]
fn logs_stay_off_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_csv(&dir, &ascending(20));
    let output = run(&["--debug", "indicators", "--spec", "SMA_5", "FOO"], &data);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Engine config"));
    let json = stdout_json(&output);
    assert_eq!(json["SMA_5"].as_array().map(Vec::len), Some(16));
    assert_eq!(json["FOO"]["success"], false);
}

#[test]
fn backtest_prints_a_result() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_csv(&dir, &ascending(20));
    let output = run(&["backtest", "--indicator", "SMA_5"], &data);

    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["total_trades"], 0);
    assert_eq!(json["final_capital"], json["initial_capital"]);
}

#[test]
fn missing_data_file_is_a_data_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&["patterns"], &dir.path().join("missing.csv"));

    assert_eq!(output.status.code(), Some(1));
    let json = stdout_json(&output);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "DATA_ERROR");
}

#[test]
fn unreadable_strategy_file_is_a_validation_error() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_csv(&dir, &ascending(20));
    let strategy = dir.path().join("missing.json");
    let output = run(&["backtest", "--strategy", strategy.to_str().unwrap()], &data);

    assert_eq!(output.status.code(), Some(1));
    let json = stdout_json(&output);
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("Cannot read strategy file"));
}
