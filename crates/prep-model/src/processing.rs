//! Stage identities and per-stage reports produced while preparing a split.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::features::SelectedFeatures;

/// One of the two datasets flowing through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Split {
    Train,
    Test,
}

impl Split {
    pub const ALL: [Self; 2] = [Self::Train, Self::Test];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Load,
    Clean,
    Encode,
    Skew,
    Balance,
    Select,
    Align,
    Persist,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Clean => "clean",
            Self::Encode => "encode",
            Self::Skew => "skew",
            Self::Balance => "balance",
            Self::Select => "select",
            Self::Align => "align",
            Self::Persist => "persist",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of dropping identifier columns and duplicate rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanReport {
    /// Identifier columns that were present and removed.
    pub dropped_columns: Vec<String>,
    /// Configured identifier columns that were absent (lenient mode only).
    pub missing_columns: Vec<String>,
    pub duplicates_removed: usize,
    pub rows_before: usize,
    pub rows_after: usize,
}

/// Measured skew for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkewDecision {
    pub column: String,
    pub skew: f64,
    pub transformed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkewReport {
    pub threshold: f64,
    pub decisions: Vec<SkewDecision>,
}

impl SkewReport {
    /// Names of the columns that received the `log1p` transform.
    pub fn transformed_columns(&self) -> Vec<&str> {
        self.decisions
            .iter()
            .filter(|decision| decision.transformed)
            .map(|decision| decision.column.as_str())
            .collect()
    }
}

/// Row count of one target class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCount {
    pub class: String,
    pub count: usize,
}

/// Class distribution before and after synthetic oversampling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceReport {
    pub before: Vec<ClassCount>,
    pub after: Vec<ClassCount>,
    pub synthetic_rows: usize,
}

/// What happened to one split on its way through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitSummary {
    pub split: Split,
    pub rows_loaded: usize,
    pub clean: CleanReport,
    pub skew: SkewReport,
    pub balance: Option<BalanceReport>,
    pub rows_written: usize,
    pub columns_written: usize,
    pub output: PathBuf,
}

/// Result of a completed pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub output_dir: PathBuf,
    pub splits: Vec<SplitSummary>,
    pub selected: SelectedFeatures,
    pub encodings_path: PathBuf,
    pub features_path: PathBuf,
    pub duration: Duration,
}

impl RunSummary {
    pub fn split(&self, split: Split) -> Option<&SplitSummary> {
        self.splits.iter().find(|summary| summary.split == split)
    }
}
