//! Configuration options for booking data preparation.
//!
//! The configuration is read from the `[data_processing]` table of a TOML file
//! and passed explicitly to the pipeline; there is no process-wide state.

use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};

/// Top-level layout of the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    pub data_processing: ProcessingConfig,
}

/// What to do with a test label that the train split never contained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnseenLabelPolicy {
    /// Fail the encode stage.
    #[default]
    Error,
    /// Map the label to one past the largest known code.
    Sentinel,
}

/// SMOTE settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalancerConfig {
    /// Neighbours considered when interpolating a synthetic sample.
    pub k_neighbors: usize,
    /// Target size of every class relative to the majority class.
    pub sampling_ratio: f64,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            k_neighbors: 5,
            sampling_ratio: 1.0,
        }
    }
}

/// Bagged tree settings used to rank features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

/// Options controlling the preparation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    pub categorical_columns: Vec<String>,
    pub numerical_columns: Vec<String>,

    /// Columns with skew strictly above this value receive `log1p`.
    #[serde(alias = "skewness_treshold")]
    pub skewness_threshold: f64,

    /// Number of features retained by the selector (target excluded).
    #[serde(rename = "no_of_features", alias = "feature_count")]
    pub feature_count: usize,

    #[serde(default = "default_target_column")]
    pub target_column: String,

    /// Identifier columns removed by the cleaner.
    #[serde(default = "default_drop_columns")]
    pub drop_columns: Vec<String>,

    /// Fail when a configured identifier column is absent.
    #[serde(default = "default_true")]
    pub strict_drop_columns: bool,

    #[serde(default)]
    pub unseen_label_policy: UnseenLabelPolicy,

    /// Oversample the test split as well as the train split.
    #[serde(default = "default_true")]
    pub balance_test: bool,

    /// Seed shared by the balancer and the selector.
    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default)]
    pub balancer: BalancerConfig,

    #[serde(default)]
    pub selector: SelectorConfig,
}

fn default_target_column() -> String {
    "booking_status".to_string()
}

fn default_drop_columns() -> Vec<String> {
    vec!["Unnamed: 0".to_string(), "Booking_ID".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_seed() -> u64 {
    42
}

impl ProcessingConfig {
    /// Build a configuration with every optional setting at its default.
    pub fn new(
        categorical_columns: Vec<String>,
        numerical_columns: Vec<String>,
        skewness_threshold: f64,
        feature_count: usize,
    ) -> Self {
        Self {
            categorical_columns,
            numerical_columns,
            skewness_threshold,
            feature_count,
            target_column: default_target_column(),
            drop_columns: default_drop_columns(),
            strict_drop_columns: true,
            unseen_label_policy: UnseenLabelPolicy::default(),
            balance_test: true,
            seed: default_seed(),
            balancer: BalancerConfig::default(),
            selector: SelectorConfig::default(),
        }
    }

    #[must_use]
    pub fn with_target_column(mut self, target: impl Into<String>) -> Self {
        self.target_column = target.into();
        self
    }

    #[must_use]
    pub fn with_drop_columns(mut self, columns: Vec<String>, strict: bool) -> Self {
        self.drop_columns = columns;
        self.strict_drop_columns = strict;
        self
    }

    #[must_use]
    pub fn with_unseen_label_policy(mut self, policy: UnseenLabelPolicy) -> Self {
        self.unseen_label_policy = policy;
        self
    }

    #[must_use]
    pub fn with_selector(mut self, selector: SelectorConfig) -> Self {
        self.selector = selector;
        self
    }

    #[must_use]
    pub fn with_balancer(mut self, balancer: BalancerConfig) -> Self {
        self.balancer = balancer;
        self
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.feature_count == 0 {
            return Err(PrepError::config("no_of_features must be at least 1"));
        }
        if !self.skewness_threshold.is_finite() {
            return Err(PrepError::config("skewness_threshold must be a finite number"));
        }
        if self.target_column.trim().is_empty() {
            return Err(PrepError::config("target_column must not be empty"));
        }
        let ratio = self.balancer.sampling_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(PrepError::config(format!(
                "balancer.sampling_ratio must be in (0, 1], got {ratio}"
            )));
        }
        if self.balancer.k_neighbors == 0 {
            return Err(PrepError::config("balancer.k_neighbors must be at least 1"));
        }
        if self.selector.n_trees == 0 {
            return Err(PrepError::config("selector.n_trees must be at least 1"));
        }
        if self.selector.min_samples_split < 2 {
            return Err(PrepError::config("selector.min_samples_split must be at least 2"));
        }
        if let Some(column) = self
            .numerical_columns
            .iter()
            .find(|name| self.categorical_columns.contains(name))
        {
            return Err(PrepError::config(format!(
                "column '{column}' is listed as both categorical and numerical"
            )));
        }
        if self.numerical_columns.contains(&self.target_column) {
            return Err(PrepError::config(format!(
                "target column '{}' cannot be a numerical column",
                self.target_column
            )));
        }
        Ok(())
    }
}
