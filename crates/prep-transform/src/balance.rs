//! SMOTE oversampling of minority target classes.
//!
//! A synthetic row is an interpolation `x + gap * (neighbour - x)` between a
//! randomly chosen class member `x` and one of its `k` nearest same-class
//! neighbours, with `gap` drawn uniformly from `[0, 1)`. Original rows are kept
//! in order and synthetic rows are appended after them.

use std::collections::BTreeMap;

use ndarray::{Array2, ArrayView1};
use polars::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use prep_model::{BalanceReport, BalancerConfig, ClassCount, PrepError, Result};

use crate::frame::{class_labels, feature_matrix, feature_names, require_column};

/// Placeholder class name when the target holds a single class.
const MISSING_CLASS: &str = "<minority>";

/// SMOTE settings.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceOptions {
    pub k_neighbors: usize,
    /// Every class is grown to `floor(majority * sampling_ratio)` rows.
    pub sampling_ratio: f64,
    pub seed: u64,
}

impl Default for BalanceOptions {
    fn default() -> Self {
        Self {
            k_neighbors: 5,
            sampling_ratio: 1.0,
            seed: 42,
        }
    }
}

impl BalanceOptions {
    pub fn from_config(config: &BalancerConfig, seed: u64) -> Self {
        Self {
            k_neighbors: config.k_neighbors.max(1),
            sampling_ratio: config.sampling_ratio,
            seed,
        }
    }

    #[must_use]
    pub fn with_k_neighbors(mut self, k: usize) -> Self {
        self.k_neighbors = k.max(1);
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

fn squared_distance(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Positions (within `members`) of the `k` nearest members to `members[pos]`.
/// Ties are broken by position so the result is deterministic.
fn nearest_members(x: &Array2<f64>, members: &[usize], pos: usize, k: usize) -> Vec<usize> {
    let point = x.row(members[pos]);
    let mut distances: Vec<(f64, usize)> = members
        .iter()
        .enumerate()
        .filter(|&(other, _)| other != pos)
        .map(|(other, &row)| (squared_distance(point, x.row(row)), other))
        .collect();
    let by_distance = |a: &(f64, usize), b: &(f64, usize)| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1));
    if distances.len() > k {
        distances.select_nth_unstable_by(k - 1, by_distance);
        distances.truncate(k);
    }
    distances.sort_by(by_distance);
    distances.into_iter().map(|(_, other)| other).collect()
}

/// Rows grouped by class label, in label order.
fn class_members(labels: &[String]) -> BTreeMap<&str, Vec<usize>> {
    let mut members: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (row, label) in labels.iter().enumerate() {
        members.entry(label.as_str()).or_default().push(row);
    }
    members
}

fn counts(members: &BTreeMap<&str, Vec<usize>>, extra: &BTreeMap<&str, usize>) -> Vec<ClassCount> {
    members
        .iter()
        .map(|(class, rows)| ClassCount {
            class: (*class).to_string(),
            count: rows.len() + extra.get(class).copied().unwrap_or(0),
        })
        .collect()
}

/// Oversample minority classes of `target` until each reaches the configured
/// share of the majority class.
///
/// Every non-target column must be numeric; they come back as `Float64`. The
/// target column keeps its type and position.
pub fn balance_table(
    df: DataFrame,
    target: &str,
    options: &BalanceOptions,
) -> Result<(DataFrame, BalanceReport)> {
    let features = feature_names(&df, target)?;
    if features.is_empty() {
        return Err(PrepError::InsufficientFeatures {
            requested: 1,
            available: 0,
        });
    }
    let x = feature_matrix(&df, &features)?;
    let labels = class_labels(&df, target)?;
    let members = class_members(&labels);
    let k = options.k_neighbors.max(1);

    if members.len() < 2 {
        return Err(PrepError::InsufficientSamples {
            class: MISSING_CLASS.to_string(),
            found: 0,
            required: k + 1,
        });
    }

    let majority = members.values().map(Vec::len).max().unwrap_or(0);
    let goal = (majority as f64 * options.sampling_ratio).floor() as usize;

    let mut rng = ChaCha8Rng::seed_from_u64(options.seed);
    let mut synthetic: Vec<Vec<f64>> = Vec::new();
    // row of the sample each synthetic row was interpolated from
    let mut origins: Vec<IdxSize> = Vec::new();
    let mut generated: BTreeMap<&str, usize> = BTreeMap::new();

    for (&class, rows) in &members {
        let needed = goal.saturating_sub(rows.len());
        if needed == 0 {
            continue;
        }
        if rows.len() <= k {
            return Err(PrepError::InsufficientSamples {
                class: class.to_string(),
                found: rows.len(),
                required: k + 1,
            });
        }
        let mut neighbours: Vec<Option<Vec<usize>>> = vec![None; rows.len()];
        for _ in 0..needed {
            let pos = rng.gen_range(0..rows.len());
            let near = neighbours[pos].get_or_insert_with(|| nearest_members(&x, rows, pos, k));
            let other = near[rng.gen_range(0..near.len())];
            let gap: f64 = rng.r#gen();
            let base = x.row(rows[pos]);
            let neighbour = x.row(rows[other]);
            synthetic.push(
                base.iter()
                    .zip(neighbour.iter())
                    .map(|(b, n)| b + gap * (n - b))
                    .collect(),
            );
            origins.push(rows[pos] as IdxSize);
        }
        generated.insert(class, needed);
        debug!(class, before = rows.len(), synthetic = needed, "class oversampled");
    }

    let report = BalanceReport {
        before: counts(&members, &BTreeMap::new()),
        after: counts(&members, &generated),
        synthetic_rows: synthetic.len(),
    };
    let balanced = assemble(&df, target, &features, &x, &synthetic, origins)?;
    info!(
        rows_before = df.height(),
        rows_after = balanced.height(),
        synthetic = report.synthetic_rows,
        "balance complete"
    );
    Ok((balanced, report))
}

/// Original rows followed by synthetic rows, in the input's column order.
fn assemble(
    df: &DataFrame,
    target: &str,
    features: &[String],
    x: &Array2<f64>,
    synthetic: &[Vec<f64>],
    origins: Vec<IdxSize>,
) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        let name = column.name().as_str();
        if name == target {
            let original = require_column(df, target, "target column")?.as_materialized_series();
            let origins = IdxCa::from_vec("origins".into(), origins.clone());
            let mut values = original.clone();
            values.append(&original.take(&origins)?)?;
            columns.push(values.into_column());
            continue;
        }
        let col_idx = features
            .iter()
            .position(|feature| feature == name)
            .ok_or_else(|| PrepError::schema(name, "feature matrix"))?;
        let values: Vec<f64> = x
            .column(col_idx)
            .iter()
            .copied()
            .chain(synthetic.iter().map(|row| row[col_idx]))
            .collect();
        columns.push(Series::new(name.into(), values).into_column());
    }
    Ok(DataFrame::new(columns)?)
}
