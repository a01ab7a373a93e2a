//! Shared types for the booking data preparation pipeline.

pub mod config;
pub mod encoding;
pub mod error;
pub mod features;
pub mod processing;

pub use config::{
    BalancerConfig, ConfigFile, ProcessingConfig, SelectorConfig, UnseenLabelPolicy,
};
pub use encoding::{ColumnEncoding, EncodingMap};
pub use error::{PipelineError, PrepError, Result};
pub use features::{FeatureRanking, FeatureScore, SelectedFeatures};
pub use processing::{
    BalanceReport, CleanReport, ClassCount, RunSummary, SkewDecision, SkewReport, Split,
    SplitSummary, Stage,
};
