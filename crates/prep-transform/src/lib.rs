//! Transformation steps of the booking data preparation pipeline.
//!
//! - **clean**: identifier column removal and exact-duplicate row removal
//! - **encode**: sorted label encoding of categorical columns
//! - **skew**: `log1p` correction of highly skewed numeric columns
//! - **balance**: SMOTE oversampling of minority target classes
//! - **forest**: bagged decision trees used to score features
//! - **select**: importance-ranked feature selection and column alignment
//! - **frame**: DataFrame value extraction shared by the steps above

pub mod balance;
pub mod clean;
pub mod encode;
pub mod forest;
pub mod frame;
pub mod select;
pub mod skew;

pub use balance::{BalanceOptions, balance_table};
pub use clean::{CleanOptions, clean_table};
pub use encode::{apply_encoding, encode_table, fit_encoding, log_encoding_map};
pub use forest::{BaggedForest, DecisionTree, ForestOptions, TreeOptions};
pub use select::{align_columns, rank_features, select_features};
pub use skew::{apply_log1p, correct_skew, skewness};
