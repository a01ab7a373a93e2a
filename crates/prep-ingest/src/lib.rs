//! Loading and persisting everything the preparation pipeline reads or writes.
//!
//! - **config**: the `[data_processing]` TOML configuration
//! - **table**: CSV tables as Polars DataFrames
//! - **artifact**: JSON side outputs (encodings, selected features)
//!
//! Every write goes to a temporary sibling file first and is renamed into
//! place, so a failed run never leaves a truncated output behind.
//! [`StagedOutputs`] extends this to a group of files that must appear together.

pub mod artifact;
pub mod config;
mod fs;
pub mod table;

pub use artifact::{load_json, save_json};
pub use config::{load_config, parse_config};
pub use fs::StagedOutputs;
pub use table::{load_table, save_table};
