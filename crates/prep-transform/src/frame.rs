//! DataFrame value extraction shared by the transformation steps.

use ndarray::Array2;
use polars::prelude::*;

use prep_model::{PrepError, Result};

/// Look up a column, reporting `context` when it is absent.
pub fn require_column<'a>(df: &'a DataFrame, name: &str, context: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| PrepError::schema(name, context))
}

/// Column names in table order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

/// Every value of a column rendered as text; `None` for nulls.
pub fn string_values(column: &Column) -> Result<Vec<Option<String>>> {
    let rendered = column.as_materialized_series().cast(&DataType::String)?;
    let values = rendered
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect();
    Ok(values)
}

/// Whether a column can be read as `f64` without losing its meaning.
pub fn is_numeric_column(column: &Column) -> bool {
    let dtype = column.dtype();
    dtype.is_numeric() || dtype.is_bool()
}

/// Every value of a numeric column as `f64`; `None` for nulls.
pub fn numeric_values(column: &Column) -> Result<Vec<Option<f64>>> {
    if !is_numeric_column(column) {
        return Err(PrepError::numeric(
            column.name().as_str(),
            format!("expected a numeric column, found {}", column.dtype()),
        ));
    }
    let cast = column.as_materialized_series().cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().collect())
}

/// Row-major `f64` matrix of the given columns. Nulls and NaN are rejected
/// because distance and impurity computations are undefined for them.
pub fn feature_matrix(df: &DataFrame, features: &[String]) -> Result<Array2<f64>> {
    let rows = df.height();
    let mut data = vec![0.0; rows * features.len()];
    for (col_idx, name) in features.iter().enumerate() {
        let column = require_column(df, name, "feature matrix")?;
        let values = numeric_values(column)?;
        for (row_idx, value) in values.into_iter().enumerate() {
            match value {
                Some(v) if !v.is_nan() => data[row_idx * features.len() + col_idx] = v,
                _ => {
                    return Err(PrepError::numeric(
                        name.as_str(),
                        format!("missing value at row {row_idx}"),
                    ));
                }
            }
        }
    }
    Array2::from_shape_vec((rows, features.len()), data)
        .map_err(|e| PrepError::numeric("feature matrix", e.to_string()))
}

/// Target values rendered as class labels. Missing targets are rejected.
pub fn class_labels(df: &DataFrame, target: &str) -> Result<Vec<String>> {
    let column = require_column(df, target, "target column")?;
    string_values(column)?
        .into_iter()
        .enumerate()
        .map(|(row_idx, value)| {
            value.ok_or_else(|| {
                PrepError::numeric(target, format!("missing target value at row {row_idx}"))
            })
        })
        .collect()
}

/// Every column except `target`, in table order.
pub fn feature_names(df: &DataFrame, target: &str) -> Result<Vec<String>> {
    require_column(df, target, "target column")?;
    Ok(column_names(df)
        .into_iter()
        .filter(|name| name != target)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_matrix_is_row_major() {
        let df = df!(
            "a" => [1i64, 2, 3],
            "b" => [0.5f64, 1.5, 2.5],
            "y" => ["x", "y", "x"],
        )
        .unwrap();
        let matrix = feature_matrix(&df, &["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(matrix.shape(), &[3, 2]);
        assert_eq!(matrix[[1, 0]], 2.0);
        assert_eq!(matrix[[2, 1]], 2.5);
    }

    #[test]
    fn feature_matrix_rejects_text() {
        let df = df!("a" => ["x", "y"]).unwrap();
        let error = feature_matrix(&df, &["a".to_string()]).unwrap_err();
        assert!(matches!(error, PrepError::Numeric { .. }));
    }

    #[test]
    fn feature_matrix_rejects_nulls() {
        let df = df!("a" => [Some(1.0f64), None]).unwrap();
        let error = feature_matrix(&df, &["a".to_string()]).unwrap_err();
        assert!(error.to_string().contains("row 1"));
    }

    #[test]
    fn feature_names_exclude_target() {
        let df = df!("a" => [1i64], "y" => [0i64], "b" => [2i64]).unwrap();
        assert_eq!(feature_names(&df, "y").unwrap(), vec!["a", "b"]);
        assert!(matches!(
            feature_names(&df, "missing"),
            Err(PrepError::Schema { .. })
        ));
    }
}
