//! Booking data preparation: orchestration, logging and reporting.

pub mod logging;
pub mod pipeline;
pub mod summary;

pub use pipeline::{DataProcessor, PipelineError, PipelinePaths};
