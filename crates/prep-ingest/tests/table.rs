//! Integration tests for table loading and saving.

use std::fs;

use polars::prelude::*;
use prep_ingest::{load_table, save_table};

#[test]
fn blank_index_header_becomes_unnamed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raw.csv");
    fs::write(
        &path,
        ",Booking_ID,lead_time,booking_status\n0,INN00001,224,Not_Canceled\n1,INN00002,5,Canceled\n",
    )
    .unwrap();

    let df = load_table(&path).unwrap();

    assert!(df.column("Unnamed: 0").is_ok());
    assert!(df.column("Booking_ID").is_ok());
    assert_eq!(df.height(), 2);
}

#[test]
fn generated_looking_header_keeps_its_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raw.csv");
    fs::write(&path, "lead_time,column_2\n224,1\n5,2\n").unwrap();

    let df = load_table(&path).unwrap();

    assert!(df.column("column_2").is_ok());
    assert!(df.column("Unnamed: 1").is_err());
}

#[test]
fn save_creates_missing_directories_and_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("processed").join("processed_train.csv");
    let first = df!(
        "lead_time" => [1.5f64, 2.0],
        "booking_status" => [0i64, 1],
    )
    .unwrap();
    let second = df!(
        "lead_time" => [9.0f64],
        "booking_status" => [1i64],
    )
    .unwrap();

    save_table(&first, &path).unwrap();
    save_table(&second, &path).unwrap();

    let loaded = load_table(&path).unwrap();
    assert_eq!(loaded.height(), 1);
    let lead = loaded.column("lead_time").unwrap().f64().unwrap();
    assert_eq!(lead.get(0), Some(9.0));
    let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}
