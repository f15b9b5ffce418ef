// tests/data_loader.rs
use std::io::Cursor;
use strategy_lab::{load_candles_csv, load_candles_json, validate_candles, CandleData, CoreError};

#[test]
fn loads_csv_in_any_column_order() {
    let csv = "close,time,open,low,high,volume,symbol\n\
               10.5,100,10,9.5,11,1200,EURUSD\n\
               11,200,10.5,10.4,11.2,,EURUSD\n";
    let candles = load_candles_csv(Cursor::new(csv)).unwrap();
    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0], CandleData::new(100, 10.0, 11.0, 9.5, 10.5, 1200.0));
    assert_eq!(candles[1].volume, 0.0);
}

#[test]
fn missing_column_is_named() {
    let csv = "time,open,high,close\n1,1,2,1\n";
    let err = load_candles_csv(Cursor::new(csv)).unwrap_err();
    assert_eq!(err, CoreError::Data("Missing required field 'low'".to_string()));
}

#[test]
fn unparseable_price_reports_row() {
    let csv = "time,open,high,low,close\n1,1,2,0.5,1\n2,1,abc,0.5,1\n";
    let err = load_candles_csv(Cursor::new(csv)).unwrap_err();
    assert_eq!(err, CoreError::Data("Invalid high value at index 1".to_string()));
}

#[test]
fn csv_rows_are_validated() {
    let csv = "time,open,high,low,close\n1,10,9,8,10\n";
    let err = load_candles_csv(Cursor::new(csv)).unwrap_err();
    assert_eq!(
        err,
        CoreError::Data("High value is less than open or close value at index 0".to_string())
    );
}

#[test]
fn loads_json_with_optional_volume() {
    let json = r#"[{"time":1,"open":1.0,"high":2.0,"low":0.5,"close":1.5},
                   {"time":2,"open":1.5,"high":2.5,"low":1.0,"close":2.0,"volume":10}]"#;
    let candles = load_candles_json(Cursor::new(json)).unwrap();
    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0].volume, 0.0);
    assert_eq!(candles[1].volume, 10.0);
}

#[test]
fn validation_catches_each_violation() {
    let ok = CandleData::new(1, 10.0, 11.0, 9.0, 10.5, 0.0);
    assert!(validate_candles(&[ok]).is_ok());

    let cases = [
        (vec![], "Data is empty"),
        (
            vec![CandleData::new(1, 10.0, 9.0, 11.0, 10.0, 0.0)],
            "High value is less than low value at index 0",
        ),
        (
            vec![ok, CandleData::new(2, 10.0, 11.0, 10.2, 10.5, 0.0)],
            "Low value is greater than open or close value at index 1",
        ),
        (vec![ok, ok], "Time value is not strictly increasing at index 1"),
        (vec![CandleData::new(1, f64::NAN, 11.0, 9.0, 10.0, 0.0)], "Invalid open value at index 0"),
    ];
    for (candles, message) in cases {
        assert_eq!(validate_candles(&candles), Err(CoreError::Data(message.to_string())));
    }
}
