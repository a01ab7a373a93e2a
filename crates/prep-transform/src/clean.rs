//! Identifier column and duplicate row removal.

use std::collections::HashSet;

use polars::prelude::{BooleanChunked, Column, DataFrame, NewChunkedArray};
use tracing::{debug, warn};

use prep_model::{CleanReport, PrepError, Result};

use crate::frame::{numeric_values, string_values};

/// Which columns the cleaner drops and how strictly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanOptions {
    pub drop_columns: Vec<String>,
    /// Fail with a schema error when a drop column is absent instead of skipping it.
    pub require_drop_columns: bool,
}

impl CleanOptions {
    pub fn new(drop_columns: Vec<String>) -> Self {
        Self {
            drop_columns,
            require_drop_columns: true,
        }
    }

    #[must_use]
    pub fn lenient(mut self) -> Self {
        self.require_drop_columns = false;
        self
    }
}

/// Drop identifier columns, then exact-duplicate rows (first occurrence wins).
pub fn clean_table(df: DataFrame, options: &CleanOptions) -> Result<(DataFrame, CleanReport)> {
    let rows_before = df.height();
    let mut df = df;
    let mut report = CleanReport {
        rows_before,
        ..CleanReport::default()
    };

    for name in &options.drop_columns {
        if df.column(name).is_err() {
            if options.require_drop_columns {
                return Err(PrepError::schema(name, "identifier column to drop"));
            }
            warn!(column = %name, "identifier column not present, skipping");
            report.missing_columns.push(name.clone());
            continue;
        }
        df = df.drop(name)?;
        report.dropped_columns.push(name.clone());
    }

    let before_dedupe = df.height();
    dedupe_rows(&mut df)?;
    report.duplicates_removed = before_dedupe - df.height();
    report.rows_after = df.height();

    debug!(
        dropped = ?report.dropped_columns,
        duplicates_removed = report.duplicates_removed,
        rows_after = report.rows_after,
        "clean complete"
    );
    Ok((df, report))
}

/// Column values as comparable keys. Float columns compare by value, so
/// `-0.0` and `0.0` are the same key.
fn row_key_values(column: &Column) -> Result<Vec<Option<String>>> {
    if !column.dtype().is_float() {
        return string_values(column);
    }
    let keys = numeric_values(column)?
        .into_iter()
        // -0.0 + 0.0 is 0.0
        .map(|value| value.map(|v| (v + 0.0).to_string()))
        .collect();
    Ok(keys)
}

/// Remove rows identical to an earlier row across every column.
fn dedupe_rows(df: &mut DataFrame) -> Result<()> {
    if df.height() == 0 || df.width() == 0 {
        return Ok(());
    }
    let columns = df
        .get_columns()
        .iter()
        .map(row_key_values)
        .collect::<Result<Vec<_>>>()?;

    let mut seen = HashSet::with_capacity(df.height());
    let mut keep = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let key: Vec<Option<&str>> = columns
            .iter()
            .map(|values| values[idx].as_deref())
            .collect();
        keep.push(seen.insert(key));
    }
    if keep.iter().all(|kept| *kept) {
        return Ok(());
    }
    let mask = BooleanChunked::from_slice("dedupe".into(), &keep);
    *df = df.filter(&mask)?;
    Ok(())
}
