//! Sorted label encoding of categorical columns.
//!
//! Missing values are encoded as the empty label `""`, which sorts first.
//!
//! Labels are compared as text, including those of integer columns, so `"10"`
//! receives a lower code than `"2"`. Codes are stable for a given vocabulary
//! but do not follow numeric order.

use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};
use tracing::{debug, info};

use prep_model::{ColumnEncoding, EncodingMap, PrepError, Result, UnseenLabelPolicy};

use crate::frame::{require_column, string_values};

/// Build the label vocabulary of every listed column from `df`.
pub fn fit_encoding(df: &DataFrame, columns: &[String]) -> Result<EncodingMap> {
    let mut map = EncodingMap::new();
    for name in columns {
        let column = require_column(df, name, "categorical column")?;
        let labels = string_values(column)?
            .into_iter()
            .map(Option::unwrap_or_default);
        let encoding = ColumnEncoding::from_labels(labels);
        debug!(column = %name, labels = encoding.len(), "encoding fitted");
        map.insert(name.as_str(), encoding);
    }
    Ok(map)
}

/// Replace every encoded column in `df` with its `Int64` codes.
pub fn apply_encoding(
    mut df: DataFrame,
    map: &EncodingMap,
    policy: UnseenLabelPolicy,
) -> Result<DataFrame> {
    for (name, encoding) in map.iter() {
        let column = require_column(&df, name, "categorical column")?;
        let labels = string_values(column)?;
        let mut codes = Vec::with_capacity(labels.len());
        let mut unseen = 0usize;
        for label in labels {
            let label = label.unwrap_or_default();
            match encoding.code(&label) {
                Some(code) => codes.push(code),
                None => match policy {
                    UnseenLabelPolicy::Error => {
                        return Err(PrepError::UnseenLabel {
                            column: name.to_string(),
                            label,
                        });
                    }
                    UnseenLabelPolicy::Sentinel => {
                        unseen += 1;
                        codes.push(encoding.sentinel());
                    }
                },
            }
        }
        if unseen > 0 {
            info!(
                column = %name,
                unseen,
                code = encoding.sentinel(),
                "unseen labels mapped to sentinel code"
            );
        }
        df.with_column(Series::new(name.into(), codes).into_column())?;
    }
    Ok(df)
}

/// Fit an encoding on `df` and apply it to the same table.
pub fn encode_table(df: DataFrame, columns: &[String]) -> Result<(DataFrame, EncodingMap)> {
    let map = fit_encoding(&df, columns)?;
    let df = apply_encoding(df, &map, UnseenLabelPolicy::Error)?;
    Ok((df, map))
}

/// Log each column's label to code mapping.
pub fn log_encoding_map(map: &EncodingMap) {
    for (name, encoding) in map.iter() {
        info!(column = %name, mapping = ?encoding.mapping(), "label mapping");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn codes(df: &DataFrame, name: &str) -> Vec<Option<i64>> {
        df.column(name).unwrap().i64().unwrap().into_iter().collect()
    }

    #[test]
    fn codes_follow_lexicographic_order() {
        let df = df!(
            "room" => ["C", "A", "B", "A"],
            "lead_time" => [1i64, 2, 3, 4],
        )
        .unwrap();
        let (encoded, map) = encode_table(df, &["room".to_string()]).unwrap();
        assert_eq!(codes(&encoded, "room"), vec![Some(2), Some(0), Some(1), Some(0)]);
        assert_eq!(map.get("room").unwrap().labels(), ["A", "B", "C"]);
        // untouched columns keep their position and type
        assert_eq!(
            encoded.get_column_names()[1].as_str(),
            "lead_time"
        );
    }

    #[test]
    fn numeric_categories_are_encoded_by_text() {
        let df = df!("parking" => [1i64, 0, 1]).unwrap();
        let (encoded, map) = encode_table(df, &["parking".to_string()]).unwrap();
        assert_eq!(codes(&encoded, "parking"), vec![Some(1), Some(0), Some(1)]);
        assert_eq!(map.get("parking").unwrap().labels(), ["0", "1"]);
    }

    #[test]
    fn nulls_become_the_empty_label() {
        let df = df!("meal" => [Some("Meal Plan 1"), None]).unwrap();
        let (encoded, map) = encode_table(df, &["meal".to_string()]).unwrap();
        assert_eq!(codes(&encoded, "meal"), vec![Some(1), Some(0)]);
        assert_eq!(map.get("meal").unwrap().labels(), ["", "Meal Plan 1"]);
    }

    #[test]
    fn integer_labels_sort_as_text() {
        let df = df!("nights" => [2i64, 10, 1]).unwrap();
        let (encoded, map) = encode_table(df, &["nights".to_string()]).unwrap();
        assert_eq!(map.get("nights").unwrap().labels(), ["1", "10", "2"]);
        assert_eq!(codes(&encoded, "nights"), vec![Some(2), Some(1), Some(0)]);
    }

    #[test]
    fn frozen_map_rejects_unseen_labels() {
        let train = df!("room" => ["A", "B"]).unwrap();
        let test = df!("room" => ["B", "Z"]).unwrap();
        let map = fit_encoding(&train, &["room".to_string()]).unwrap();
        let error = apply_encoding(test, &map, UnseenLabelPolicy::Error).unwrap_err();
        assert!(matches!(error, PrepError::UnseenLabel { ref label, .. } if label == "Z"));
    }

    #[test]
    fn frozen_map_sentinel_policy() {
        let train = df!("room" => ["A", "B"]).unwrap();
        let test = df!("room" => ["B", "Z"]).unwrap();
        let map = fit_encoding(&train, &["room".to_string()]).unwrap();
        let encoded = apply_encoding(test, &map, UnseenLabelPolicy::Sentinel).unwrap();
        assert_eq!(codes(&encoded, "room"), vec![Some(1), Some(2)]);
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let df = df!("room" => ["A"]).unwrap();
        let error = encode_table(df, &["meal".to_string()]).unwrap_err();
        assert!(matches!(error, PrepError::Schema { .. }));
    }
}
