//! CSV table loading and saving.

use std::fs::File;
use std::io::{BufWriter, ErrorKind};
use std::path::Path;

use polars::prelude::*;
use tracing::{debug, info};

use prep_model::{PrepError, Result};

use crate::fs::{StagedOutputs, write_atomic};

/// Rows sampled when inferring column types.
const INFER_SCHEMA_ROWS: usize = 10_000;

/// Load a CSV file with a header row into a DataFrame.
///
/// Blank header cells are named `Unnamed: <position>`, the convention of files
/// that were exported together with their row index.
pub fn load_table(path: &Path) -> Result<DataFrame> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => {
            return Err(PrepError::Format {
                path: path.to_path_buf(),
                message: "not a regular file".to_string(),
            });
        }
        Err(error) => {
            let operation = if error.kind() == ErrorKind::NotFound {
                "find"
            } else {
                "read"
            };
            return Err(PrepError::io(operation, path, error));
        }
    }

    let format_error = |e: PolarsError| PrepError::Format {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(format_error)?
        .finish()
        .map_err(format_error)?;

    if df.width() == 0 || df.height() == 0 {
        return Err(PrepError::Format {
            path: path.to_path_buf(),
            message: "table has no rows".to_string(),
        });
    }

    name_blank_headers(&mut df, path)?;
    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "table loaded"
    );
    Ok(df)
}

/// Positions of header cells that are empty in the raw file.
///
/// Polars gives such cells a generated name, which a real header could share,
/// so the raw header row is the only reliable source.
fn blank_header_positions(path: &Path) -> Result<Vec<usize>> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| PrepError::Format {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    let headers = reader.headers().map_err(|e| PrepError::Format {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(headers
        .iter()
        .enumerate()
        .filter(|(_, name)| name.trim().is_empty())
        .map(|(idx, _)| idx)
        .collect())
}

fn name_blank_headers(df: &mut DataFrame, path: &Path) -> Result<()> {
    let blank = blank_header_positions(path)?;
    if blank.is_empty() {
        return Ok(());
    }
    let renamed: Vec<String> = df
        .get_column_names()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            if blank.contains(&idx) {
                format!("Unnamed: {idx}")
            } else {
                name.to_string()
            }
        })
        .collect();
    df.set_column_names(renamed)?;
    Ok(())
}

/// Write a DataFrame as CSV with a header row, replacing any existing file.
pub fn save_table(df: &DataFrame, path: &Path) -> Result<()> {
    let mut df = df.clone();
    write_atomic(path, |writer| write_csv(writer, &mut df))?;
    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "table saved"
    );
    Ok(())
}

fn write_csv(writer: &mut BufWriter<File>, df: &mut DataFrame) -> Result<()> {
    CsvWriter::new(writer).include_header(true).finish(df)?;
    Ok(())
}

impl StagedOutputs {
    /// Stage `df` as CSV at `path`; it appears on [`StagedOutputs::commit`].
    pub fn stage_table(&mut self, df: &DataFrame, path: &Path) -> Result<()> {
        let mut df = df.clone();
        self.stage(path, |writer| write_csv(writer, &mut df))
    }
}
