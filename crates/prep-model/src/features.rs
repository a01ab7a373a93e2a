//! Feature importance rankings and the selected feature set.

use serde::{Deserialize, Serialize};

/// Importance score of one feature column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScore {
    pub feature: String,
    pub importance: f64,
}

/// Features ordered by descending importance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureRanking {
    scores: Vec<FeatureScore>,
}

impl FeatureRanking {
    /// Rank features by importance. The sort is stable, so equal scores keep
    /// the order in which the features were given.
    pub fn from_scores(mut scores: Vec<FeatureScore>) -> Self {
        scores.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        Self { scores }
    }

    pub fn scores(&self) -> &[FeatureScore] {
        &self.scores
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Names of the `k` most important features.
    pub fn top(&self, k: usize) -> Vec<String> {
        self.scores
            .iter()
            .take(k)
            .map(|score| score.feature.clone())
            .collect()
    }
}

/// Features chosen on the train split, imposed verbatim on the test split.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectedFeatures {
    pub features: Vec<String>,
    pub target: String,
    #[serde(default)]
    pub ranking: FeatureRanking,
}

impl SelectedFeatures {
    /// Output column order: features in rank order, then the target.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = self.features.clone();
        columns.push(self.target.clone());
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(feature: &str, importance: f64) -> FeatureScore {
        FeatureScore {
            feature: feature.to_string(),
            importance,
        }
    }

    #[test]
    fn ranking_sorts_descending_and_keeps_ties_stable() {
        let ranking = FeatureRanking::from_scores(vec![
            score("lead_time", 0.2),
            score("no_of_adults", 0.1),
            score("avg_price_per_room", 0.4),
            score("arrival_month", 0.1),
        ]);
        assert_eq!(
            ranking.top(4),
            vec!["avg_price_per_room", "lead_time", "no_of_adults", "arrival_month"]
        );
        assert_eq!(ranking.top(10).len(), 4);
    }

    #[test]
    fn columns_end_with_target() {
        let selected = SelectedFeatures {
            features: vec!["lead_time".to_string(), "avg_price_per_room".to_string()],
            target: "booking_status".to_string(),
            ranking: FeatureRanking::default(),
        };
        assert_eq!(
            selected.columns(),
            vec!["lead_time", "avg_price_per_room", "booking_status"]
        );
    }
}
