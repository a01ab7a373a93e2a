//! JSON side outputs that let a scoring job reproduce the preparation.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use prep_model::{PrepError, Result};

use crate::fs::{StagedOutputs, write_atomic};

/// Serialize `value` as pretty JSON to `path`.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    write_atomic(path, |writer| write_json(writer, value, path))
}

fn write_json<T: Serialize>(writer: &mut BufWriter<File>, value: &T, path: &Path) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value).map_err(|e| PrepError::Format {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    writer
        .write_all(b"\n")
        .map_err(|e| PrepError::io("write", path, e))
}

impl StagedOutputs {
    /// Stage `value` as pretty JSON at `path`.
    pub fn stage_json<T: Serialize>(&mut self, value: &T, path: &Path) -> Result<()> {
        self.stage(path, |writer| write_json(writer, value, path))
    }
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).map_err(|e| PrepError::io("read", path, e))?;
    serde_json::from_str(&text).map_err(|e| PrepError::Format {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
