use prep_model::{
    ColumnEncoding, ConfigFile, FeatureRanking, FeatureScore, SelectedFeatures, UnseenLabelPolicy,
};
use proptest::prelude::*;

#[test]
fn config_file_parses_with_defaults() {
    let text = r#"
[data_processing]
categorical_columns = ["type_of_meal_plan", "room_type_reserved", "booking_status"]
numerical_columns = ["lead_time", "avg_price_per_room"]
skewness_treshold = 5
no_of_features = 10
"#;
    let file: ConfigFile = toml::from_str(text).expect("parse config");
    let config = file.data_processing;
    assert_eq!(config.categorical_columns.len(), 3);
    assert_eq!(config.skewness_threshold, 5.0);
    assert_eq!(config.feature_count, 10);
    assert_eq!(config.target_column, "booking_status");
    assert!(config.strict_drop_columns);
    assert!(config.balance_test);
    assert_eq!(config.unseen_label_policy, UnseenLabelPolicy::Error);
    assert_eq!(config.selector.n_trees, 100);
    assert!(config.validate().is_ok());
}

#[test]
fn config_file_accepts_overrides() {
    let text = r#"
[data_processing]
categorical_columns = []
numerical_columns = ["lead_time"]
skewness_threshold = 2.5
feature_count = 3
target_column = "label"
drop_columns = ["id"]
strict_drop_columns = false
unseen_label_policy = "sentinel"
balance_test = false
seed = 7

[data_processing.balancer]
k_neighbors = 3

[data_processing.selector]
n_trees = 20
max_depth = 8
"#;
    let file: ConfigFile = toml::from_str(text).expect("parse config");
    let config = file.data_processing;
    assert_eq!(config.feature_count, 3);
    assert_eq!(config.target_column, "label");
    assert_eq!(config.drop_columns, vec!["id"]);
    assert!(!config.strict_drop_columns);
    assert_eq!(config.unseen_label_policy, UnseenLabelPolicy::Sentinel);
    assert!(!config.balance_test);
    assert_eq!(config.seed, 7);
    assert_eq!(config.balancer.k_neighbors, 3);
    assert_eq!(config.balancer.sampling_ratio, 1.0);
    assert_eq!(config.selector.n_trees, 20);
    assert_eq!(config.selector.max_depth, Some(8));
    assert_eq!(config.selector.min_samples_split, 2);
}

#[test]
fn config_file_requires_core_keys() {
    let text = r#"
[data_processing]
categorical_columns = []
numerical_columns = []
"#;
    assert!(toml::from_str::<ConfigFile>(text).is_err());
}

#[test]
fn selected_features_json_layout() {
    let selected = SelectedFeatures {
        features: vec!["lead_time".to_string(), "avg_price_per_room".to_string()],
        target: "booking_status".to_string(),
        ranking: FeatureRanking::from_scores(vec![
            FeatureScore {
                feature: "avg_price_per_room".to_string(),
                importance: 0.25,
            },
            FeatureScore {
                feature: "lead_time".to_string(),
                importance: 0.75,
            },
        ]),
    };
    let json = serde_json::to_string_pretty(&selected).expect("serialize");
    insta::assert_snapshot!(json, @r#"
    {
      "features": [
        "lead_time",
        "avg_price_per_room"
      ],
      "target": "booking_status",
      "ranking": {
        "scores": [
          {
            "feature": "lead_time",
            "importance": 0.75
          },
          {
            "feature": "avg_price_per_room",
            "importance": 0.25
          }
        ]
      }
    }
    "#);
}

proptest! {
    #[test]
    fn encoding_is_a_bijection_onto_code_range(labels in proptest::collection::vec("[a-z]{1,4}", 1..40)) {
        let encoding = ColumnEncoding::from_labels(labels.iter().cloned());
        let n = encoding.len() as i64;
        for label in &labels {
            let code = encoding.code(label).expect("observed label has a code");
            prop_assert!((0..n).contains(&code));
            prop_assert_eq!(encoding.label(code), Some(label.as_str()));
        }
        for code in 0..n {
            let label = encoding.label(code).expect("every code has a label");
            prop_assert_eq!(encoding.code(label), Some(code));
        }
    }
}
