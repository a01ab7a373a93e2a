//! Configuration provider.

use std::fs;
use std::path::Path;

use prep_model::{ConfigFile, PrepError, ProcessingConfig, Result};
use tracing::debug;

/// Read and validate the `[data_processing]` table of a TOML config file.
pub fn load_config(path: &Path) -> Result<ProcessingConfig> {
    let text = fs::read_to_string(path).map_err(|e| PrepError::io("read", path, e))?;
    let config = parse_config(&text).map_err(|error| match error {
        PrepError::Config { message } => {
            PrepError::config(format!("{}: {message}", path.display()))
        }
        other => other,
    })?;
    debug!(
        path = %path.display(),
        categorical = config.categorical_columns.len(),
        numerical = config.numerical_columns.len(),
        feature_count = config.feature_count,
        "configuration loaded"
    );
    Ok(config)
}

/// Parse and validate configuration text.
pub fn parse_config(text: &str) -> Result<ProcessingConfig> {
    let file: ConfigFile =
        toml::from_str(text).map_err(|e| PrepError::config(e.message().to_string()))?;
    file.data_processing.validate()?;
    Ok(file.data_processing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_section_is_a_config_error() {
        let error = parse_config("[other]\nkey = 1\n").unwrap_err();
        assert!(matches!(error, PrepError::Config { .. }));
        assert!(error.to_string().contains("data_processing"));
    }

    #[test]
    fn invalid_values_fail_validation() {
        let text = r#"
[data_processing]
categorical_columns = []
numerical_columns = []
skewness_threshold = 5.0
no_of_features = 0
"#;
        let error = parse_config(text).unwrap_err();
        assert!(error.to_string().contains("no_of_features"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let error = load_config(Path::new("does/not/exist.toml")).unwrap_err();
        assert!(matches!(error, PrepError::Io { .. }));
    }
}
