//! Skewness measurement and `log1p` correction of numeric columns.

use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};
use tracing::debug;

use prep_model::{PrepError, Result, SkewDecision, SkewReport};

use crate::frame::{numeric_values, require_column};

/// Sample skewness (adjusted Fisher-Pearson, the estimator pandas uses).
///
/// Nulls and NaN are ignored. Returns NaN for fewer than three values and 0
/// for a constant column.
pub fn skewness(values: &[Option<f64>]) -> f64 {
    let present: Vec<f64> = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| !v.is_nan())
        .collect();
    let n = present.len() as f64;
    if present.len() < 3 {
        return f64::NAN;
    }
    let mean = present.iter().sum::<f64>() / n;
    let (m2, m3) = present.iter().fold((0.0, 0.0), |(m2, m3), v| {
        let d = v - mean;
        (m2 + d * d, m3 + d * d * d)
    });
    let m2 = m2 / n;
    let m3 = m3 / n;
    // relative tolerance so float noise on a constant column is not read as skew
    if m2 <= (f64::EPSILON * mean).powi(2) {
        return 0.0;
    }
    (n * (n - 1.0)).sqrt() / (n - 2.0) * m3 / m2.powf(1.5)
}

/// Replace each listed column with `ln(1 + x)`.
///
/// Fails when a value is at or below -1, where the transform is undefined.
pub fn apply_log1p(mut df: DataFrame, columns: &[&str]) -> Result<DataFrame> {
    for &name in columns {
        let column = require_column(&df, name, "numerical column")?;
        let values = numeric_values(column)?;
        let mut transformed = Vec::with_capacity(values.len());
        for (row_idx, value) in values.into_iter().enumerate() {
            match value {
                Some(v) if v <= -1.0 => {
                    return Err(PrepError::numeric(
                        name,
                        format!("log1p undefined for value {v} at row {row_idx}"),
                    ));
                }
                other => transformed.push(other.map(f64::ln_1p)),
            }
        }
        df.with_column(Series::new(name.into(), transformed).into_column())?;
    }
    Ok(df)
}

/// Measure every listed column and `log1p` those whose skew exceeds `threshold`.
///
/// Columns at or below the threshold are left untouched.
pub fn correct_skew(
    df: DataFrame,
    columns: &[String],
    threshold: f64,
) -> Result<(DataFrame, SkewReport)> {
    let mut report = SkewReport {
        threshold,
        decisions: Vec::with_capacity(columns.len()),
    };
    for name in columns {
        let column = require_column(&df, name, "numerical column")?;
        let skew = skewness(&numeric_values(column)?);
        let transformed = skew > threshold;
        debug!(column = %name, skew, transformed, "skew measured");
        report.decisions.push(SkewDecision {
            column: name.clone(),
            skew,
            transformed,
        });
    }
    let targets = report.transformed_columns();
    let df = apply_log1p(df, &targets)?;
    Ok((df, report))
}
