use std::collections::HashSet;

use polars::prelude::*;
use prep_transform::{
    BalanceOptions, CleanOptions, ForestOptions, align_columns, balance_table, clean_table,
    correct_skew, encode_table, select_features, skewness,
};
use proptest::prelude::*;

fn column_f64(df: &DataFrame, name: &str) -> Vec<f64> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap())
        .collect()
}

proptest! {
    #[test]
    fn dedupe_keeps_first_occurrence_of_each_row(rows in prop::collection::vec((0i64..4, 0i64..3), 1..40)) {
        let a: Vec<i64> = rows.iter().map(|r| r.0).collect();
        let b: Vec<i64> = rows.iter().map(|r| r.1).collect();
        let df = df!("a" => a, "b" => b).unwrap();

        let (out, report) = clean_table(df, &CleanOptions::new(Vec::new())).unwrap();

        let mut seen = HashSet::new();
        let expected: Vec<(i64, i64)> = rows.iter().copied().filter(|row| seen.insert(*row)).collect();
        let a_out = out.column("a").unwrap().i64().unwrap();
        let b_out = out.column("b").unwrap().i64().unwrap();
        let actual: Vec<(i64, i64)> = a_out
            .into_iter()
            .zip(b_out)
            .map(|(a, b)| (a.unwrap(), b.unwrap()))
            .collect();
        prop_assert_eq!(actual, expected);
        prop_assert_eq!(report.duplicates_removed, rows.len() - out.height());
    }

    #[test]
    fn skew_threshold_decides_between_identity_and_log1p(
        values in prop::collection::vec(0.0f64..1000.0, 3..30),
        threshold in -1.0f64..3.0,
    ) {
        let input = values.clone();
        let df = df!("x" => values).unwrap();

        let (out, report) = correct_skew(df, &["x".to_string()], threshold).unwrap();

        let skew = skewness(&input.iter().copied().map(Some).collect::<Vec<_>>());
        let output = column_f64(&out, "x");
        if skew > threshold {
            prop_assert_eq!(report.transformed_columns(), vec!["x"]);
            let expected: Vec<f64> = input.iter().map(|v| v.ln_1p()).collect();
            prop_assert_eq!(output, expected);
        } else {
            prop_assert!(report.transformed_columns().is_empty());
            prop_assert_eq!(output, input);
        }
    }
}

#[test]
fn second_skew_pass_leaves_corrected_columns_alone() {
    // skew 2.34 before, 0.15 after log1p
    let doubling: Vec<i64> = (0..12).map(|i| 1 << i).collect();
    let df = df!("price" => doubling).unwrap();
    let columns = vec!["price".to_string()];

    let (once, first) = correct_skew(df, &columns, 1.0).unwrap();
    assert_eq!(first.transformed_columns(), vec!["price"]);
    let (twice, second) = correct_skew(once.clone(), &columns, 1.0).unwrap();
    assert!(second.transformed_columns().is_empty());
    assert_eq!(column_f64(&once, "price"), column_f64(&twice, "price"));
}

#[test]
fn heavy_tail_is_transformed_again_on_a_second_pass() {
    // skew 4.94 before, still 4.23 after log1p
    let mut lead = vec![1i64; 95];
    lead.extend([200, 300, 400, 500, 600]);
    let df = df!("lead_time" => lead).unwrap();
    let columns = vec!["lead_time".to_string()];

    let (once, _) = correct_skew(df, &columns, 2.0).unwrap();
    let (_, second) = correct_skew(once, &columns, 2.0).unwrap();
    assert_eq!(second.transformed_columns(), vec!["lead_time"]);
}

/// 100 encoded rows, 90 of class 0, with `lead_time` tracking the class.
fn encoded_bookings() -> DataFrame {
    let rooms = ["A", "B", "C"];
    let room: Vec<&str> = (0..100).map(|i| rooms[i % 3]).collect();
    let lead_time: Vec<f64> = (0..100)
        .map(|i| if i < 90 { i as f64 } else { 200.0 + i as f64 })
        .collect();
    let adults: Vec<i64> = (0..100).map(|i| (i % 2) as i64 + 1).collect();
    let status: Vec<i64> = (0..100).map(|i| i64::from(i >= 90)).collect();
    let df = df!(
        "room" => room,
        "lead_time" => lead_time,
        "adults" => adults,
        "booking_status" => status,
    )
    .unwrap();
    encode_table(df, &["room".to_string()]).unwrap().0
}

#[test]
fn balanced_table_starts_with_the_original_rows() {
    let df = encoded_bookings();
    let (balanced, report) =
        balance_table(df.clone(), "booking_status", &BalanceOptions::default()).unwrap();

    assert_eq!(balanced.height(), 180);
    assert_eq!(report.after.iter().map(|c| c.count).collect::<Vec<_>>(), vec![90, 90]);
    for name in ["room", "lead_time", "adults", "booking_status"] {
        let original = column_f64(&df, name);
        let prefix = column_f64(&balanced, name);
        assert_eq!(&prefix[..100], original.as_slice(), "column {name}");
    }
}

#[test]
fn selection_on_train_aligns_test() {
    let train = encoded_bookings();
    let test = train.slice(0, 30);
    let options = ForestOptions::default().with_trees(10);

    let (selected, ranking) = select_features(train, "booking_status", 2, &options).unwrap();
    assert_eq!(selected.width(), 3);
    assert_eq!(ranking.scores()[0].feature, "lead_time");

    let columns: Vec<String> = selected
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let aligned = align_columns(test, &columns).unwrap();
    assert_eq!(aligned.get_column_names(), selected.get_column_names());
    assert_eq!(aligned.height(), 30);
}
