//! Error taxonomy for the preparation pipeline.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

use crate::processing::{Split, Stage};

/// Errors raised by individual preparation steps and their I/O collaborators.
#[derive(Debug, Error)]
pub enum PrepError {
    /// An expected column is absent from the table.
    #[error("column '{column}' not found ({context})")]
    Schema { column: String, context: String },

    /// A column holds values the requested transform is undefined for.
    #[error("numeric error in column '{column}': {message}")]
    Numeric { column: String, message: String },

    /// A class has too few members to synthesize new samples from.
    #[error("class '{class}' has {found} samples, at least {required} required for resampling")]
    InsufficientSamples {
        class: String,
        found: usize,
        required: usize,
    },

    /// More features were requested than the table provides.
    #[error("requested {requested} features but only {available} are available")]
    InsufficientFeatures { requested: usize, available: usize },

    /// A label was not seen when the encoding was fitted.
    #[error("label '{label}' in column '{column}' was not seen when the encoding was fitted")]
    UnseenLabel { column: String, label: String },

    /// Filesystem failure while reading or writing.
    #[error("failed to {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed or empty input content.
    #[error("invalid content in {path}: {message}")]
    Format { path: PathBuf, message: String },

    /// Missing or malformed configuration.
    #[error("invalid configuration: {message}")]
    Config { message: String },

    /// Failure inside a DataFrame operation.
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl PrepError {
    pub fn schema(column: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Schema {
            column: column.into(),
            context: context.into(),
        }
    }

    pub fn numeric(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Numeric {
            column: column.into(),
            message: message.into(),
        }
    }

    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PrepError>;

/// A step failure tagged with the pipeline stage and split it happened in.
#[derive(Debug, Error)]
#[error("stage '{stage}' failed{}: {source}", split_suffix(.split))]
pub struct PipelineError {
    pub stage: Stage,
    pub split: Option<Split>,
    #[source]
    pub source: PrepError,
}

impl PipelineError {
    pub fn new(stage: Stage, split: Option<Split>, source: PrepError) -> Self {
        Self {
            stage,
            split,
            source,
        }
    }
}

fn split_suffix(split: &Option<Split>) -> String {
    match split {
        Some(split) => format!(" on {split} split"),
        None => String::new(),
    }
}
