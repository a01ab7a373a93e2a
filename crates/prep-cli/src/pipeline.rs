//! Train/test preparation pipeline with explicit stages.
//!
//! Stages run in this order:
//! 1. **Load**: read both raw CSV tables
//! 2. **Clean**: drop identifier columns and duplicate rows
//! 3. **Encode**: fit label codes on train, apply them frozen to test
//! 4. **Skew**: `log1p` numeric columns whose skew exceeds the threshold
//! 5. **Balance**: SMOTE oversampling of minority target classes
//! 6. **Select**: rank features on train and keep the top K
//! 7. **Align**: project test onto the train columns
//! 8. **Persist**: write both tables and the JSON artifacts
//!
//! Nothing is written until every earlier stage has succeeded for both splits,
//! and the four outputs are renamed into place together or not at all.

use std::path::{Path, PathBuf};
use std::time::Instant;

use polars::prelude::DataFrame;
use tracing::{info, info_span};

use prep_ingest::{StagedOutputs, load_table};
use prep_model::{
    BalanceReport, CleanReport, EncodingMap, ProcessingConfig, RunSummary, SelectedFeatures,
    SkewReport, Split, SplitSummary, Stage, UnseenLabelPolicy,
};
use prep_transform::{
    BalanceOptions, CleanOptions, ForestOptions, align_columns, apply_encoding, balance_table,
    clean_table, correct_skew, fit_encoding, log_encoding_map, select_features,
};

pub use prep_model::PipelineError;

pub const PROCESSED_TRAIN_FILE: &str = "processed_train.csv";
pub const PROCESSED_TEST_FILE: &str = "processed_test.csv";
pub const ENCODINGS_FILE: &str = "encodings.json";
pub const SELECTED_FEATURES_FILE: &str = "selected_features.json";

type StageResult<T> = std::result::Result<T, PipelineError>;

/// Attach stage and split context to a step result.
trait StageContext<T> {
    fn stage(self, stage: Stage, split: Option<Split>) -> StageResult<T>;
}

impl<T> StageContext<T> for prep_model::Result<T> {
    fn stage(self, stage: Stage, split: Option<Split>) -> StageResult<T> {
        self.map_err(|source| PipelineError::new(stage, split, source))
    }
}

/// Where the pipeline reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelinePaths {
    pub train: PathBuf,
    pub test: PathBuf,
    pub output_dir: PathBuf,
}

impl PipelinePaths {
    pub fn new(
        train: impl Into<PathBuf>,
        test: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            train: train.into(),
            test: test.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn source(&self, split: Split) -> &Path {
        match split {
            Split::Train => &self.train,
            Split::Test => &self.test,
        }
    }

    pub fn processed(&self, split: Split) -> PathBuf {
        let name = match split {
            Split::Train => PROCESSED_TRAIN_FILE,
            Split::Test => PROCESSED_TEST_FILE,
        };
        self.output_dir.join(name)
    }

    pub fn encodings(&self) -> PathBuf {
        self.output_dir.join(ENCODINGS_FILE)
    }

    pub fn selected_features(&self) -> PathBuf {
        self.output_dir.join(SELECTED_FEATURES_FILE)
    }
}

/// A split after the stages shared by train and test.
#[derive(Debug)]
struct PreparedSplit {
    split: Split,
    frame: DataFrame,
    rows_loaded: usize,
    clean: CleanReport,
    skew: SkewReport,
    balance: Option<BalanceReport>,
}

impl PreparedSplit {
    fn summary(&self, frame: &DataFrame, output: PathBuf) -> SplitSummary {
        SplitSummary {
            split: self.split,
            rows_loaded: self.rows_loaded,
            clean: self.clean.clone(),
            skew: self.skew.clone(),
            balance: self.balance.clone(),
            rows_written: frame.height(),
            columns_written: frame.width(),
            output,
        }
    }
}

/// Runs the preparation stages over one train/test pair.
pub struct DataProcessor {
    config: ProcessingConfig,
    paths: PipelinePaths,
}

impl DataProcessor {
    /// `config` is expected to have passed [`ProcessingConfig::validate`].
    pub fn new(config: ProcessingConfig, paths: PipelinePaths) -> Self {
        Self { config, paths }
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    pub fn paths(&self) -> &PipelinePaths {
        &self.paths
    }

    /// Run every stage and persist the outputs.
    pub fn process(&self) -> StageResult<RunSummary> {
        let started = Instant::now();
        let train_raw = self.load(Split::Train)?;
        let test_raw = self.load(Split::Test)?;

        let mut encodings = None;
        let train = self.prepare_split(Split::Train, train_raw, &mut encodings)?;
        let test = self.prepare_split(Split::Test, test_raw, &mut encodings)?;
        let encodings = encodings.unwrap_or_default();

        let (train_frame, selected) = self.select(train.frame.clone())?;
        let test_frame = {
            let _span = info_span!("stage", stage = %Stage::Align, split = %Split::Test).entered();
            let aligned = align_columns(test.frame.clone(), &selected.columns())
                .stage(Stage::Align, Some(Split::Test))?;
            info!(columns = aligned.width(), "test aligned to train columns");
            aligned
        };

        self.persist(&train_frame, &test_frame, &encodings, &selected)?;

        let summary = RunSummary {
            output_dir: self.paths.output_dir.clone(),
            splits: vec![
                train.summary(&train_frame, self.paths.processed(Split::Train)),
                test.summary(&test_frame, self.paths.processed(Split::Test)),
            ],
            selected,
            encodings_path: self.paths.encodings(),
            features_path: self.paths.selected_features(),
            duration: started.elapsed(),
        };
        let duration_ms = u64::try_from(summary.duration.as_millis()).unwrap_or(u64::MAX);
        info!(duration_ms, "pipeline complete");
        Ok(summary)
    }

    fn load(&self, split: Split) -> StageResult<DataFrame> {
        let _span = info_span!("stage", stage = %Stage::Load, split = %split).entered();
        load_table(self.paths.source(split)).stage(Stage::Load, Some(split))
    }

    /// Clean, encode, correct skew and balance one split.
    ///
    /// The first call fits the label encoding and stores it in `encodings`;
    /// later calls apply the stored encoding unchanged.
    fn prepare_split(
        &self,
        split: Split,
        raw: DataFrame,
        encodings: &mut Option<EncodingMap>,
    ) -> StageResult<PreparedSplit> {
        let _split_span = info_span!("split", split = %split).entered();
        let rows_loaded = raw.height();
        let config = &self.config;

        let (frame, clean) = {
            let _span = info_span!("stage", stage = %Stage::Clean).entered();
            let mut options = CleanOptions::new(config.drop_columns.clone());
            if !config.strict_drop_columns {
                options = options.lenient();
            }
            let (frame, report) = clean_table(raw, &options).stage(Stage::Clean, Some(split))?;
            info!(
                rows = frame.height(),
                duplicates_removed = report.duplicates_removed,
                "split cleaned"
            );
            (frame, report)
        };

        let frame = {
            let _span = info_span!("stage", stage = %Stage::Encode).entered();
            let frozen = encodings.is_some();
            if !frozen {
                let fitted = fit_encoding(&frame, &config.categorical_columns)
                    .stage(Stage::Encode, Some(split))?;
                log_encoding_map(&fitted);
                *encodings = Some(fitted);
            }
            // train is encoded with its own vocabulary, so nothing can be unseen there
            let policy = if frozen {
                config.unseen_label_policy
            } else {
                UnseenLabelPolicy::Error
            };
            let map = encodings.get_or_insert_default();
            let frame = apply_encoding(frame, map, policy).stage(Stage::Encode, Some(split))?;
            info!(columns = map.len(), "categorical columns encoded");
            frame
        };

        let (frame, skew) = {
            let _span = info_span!("stage", stage = %Stage::Skew).entered();
            let (frame, report) = correct_skew(
                frame,
                &config.numerical_columns,
                config.skewness_threshold,
            )
            .stage(Stage::Skew, Some(split))?;
            info!(transformed = ?report.transformed_columns(), "skew corrected");
            (frame, report)
        };

        let balance_split = split == Split::Train || config.balance_test;
        let (frame, balance) = if balance_split {
            let _span = info_span!("stage", stage = %Stage::Balance).entered();
            let options = BalanceOptions::from_config(&config.balancer, config.seed);
            let (frame, report) = balance_table(frame, &config.target_column, &options)
                .stage(Stage::Balance, Some(split))?;
            (frame, Some(report))
        } else {
            info!("balancing skipped");
            (frame, None)
        };

        Ok(PreparedSplit {
            split,
            frame,
            rows_loaded,
            clean,
            skew,
            balance,
        })
    }

    fn select(&self, train: DataFrame) -> StageResult<(DataFrame, SelectedFeatures)> {
        let _span = info_span!("stage", stage = %Stage::Select, split = %Split::Train).entered();
        let options = ForestOptions::from_config(&self.config.selector, self.config.seed);
        let (frame, ranking) = select_features(
            train,
            &self.config.target_column,
            self.config.feature_count,
            &options,
        )
        .stage(Stage::Select, Some(Split::Train))?;
        let selected = SelectedFeatures {
            features: ranking.top(self.config.feature_count),
            target: self.config.target_column.clone(),
            ranking,
        };
        Ok((frame, selected))
    }

    fn persist(
        &self,
        train: &DataFrame,
        test: &DataFrame,
        encodings: &EncodingMap,
        selected: &SelectedFeatures,
    ) -> StageResult<()> {
        let _span = info_span!("stage", stage = %Stage::Persist).entered();
        let mut outputs = StagedOutputs::new();
        for (split, frame) in [(Split::Train, train), (Split::Test, test)] {
            outputs
                .stage_table(frame, &self.paths.processed(split))
                .stage(Stage::Persist, Some(split))?;
        }
        outputs
            .stage_json(encodings, &self.paths.encodings())
            .stage(Stage::Persist, None)?;
        outputs
            .stage_json(selected, &self.paths.selected_features())
            .stage(Stage::Persist, None)?;
        let written = outputs.commit().stage(Stage::Persist, None)?;
        for path in &written {
            info!(path = %path.display(), "output written");
        }
        info!(output_dir = %self.paths.output_dir.display(), "artifacts written");
        Ok(())
    }
}
