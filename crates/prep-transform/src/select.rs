//! Importance-ranked feature selection and column alignment.

use polars::prelude::DataFrame;
use tracing::{debug, info};

use prep_model::{FeatureRanking, FeatureScore, PrepError, Result};

use crate::forest::{BaggedForest, ForestOptions};
use crate::frame::{class_labels, feature_matrix, feature_names, require_column};

/// Score every non-target column of `df` with a bagged forest.
pub fn rank_features(df: &DataFrame, target: &str, options: &ForestOptions) -> Result<FeatureRanking> {
    let features = feature_names(df, target)?;
    let x = feature_matrix(df, &features)?;
    let labels = class_labels(df, target)?;
    let forest = BaggedForest::fit(&x, &labels, options)?;
    let scores = features
        .into_iter()
        .zip(forest.feature_importances())
        .map(|(feature, &importance)| FeatureScore {
            feature,
            importance,
        })
        .collect();
    let ranking = FeatureRanking::from_scores(scores);
    for score in ranking.scores() {
        debug!(feature = %score.feature, importance = score.importance, "feature scored");
    }
    Ok(ranking)
}

/// Keep the `k` most important features plus the target, in rank order.
pub fn select_features(
    df: DataFrame,
    target: &str,
    k: usize,
    options: &ForestOptions,
) -> Result<(DataFrame, FeatureRanking)> {
    let available = feature_names(&df, target)?.len();
    if k == 0 || k > available {
        return Err(PrepError::InsufficientFeatures {
            requested: k,
            available,
        });
    }
    let ranking = rank_features(&df, target, options)?;
    let mut columns = ranking.top(k);
    info!(selected = ?columns, "features selected");
    columns.push(target.to_string());
    let selected = df.select(columns)?;
    Ok((selected, ranking))
}

/// Project `df` onto `columns`, in that order.
pub fn align_columns(df: DataFrame, columns: &[String]) -> Result<DataFrame> {
    for name in columns {
        require_column(&df, name, "selected feature")?;
    }
    Ok(df.select(columns.iter().map(String::as_str))?)
}
