//! Configuration validation with range checks.

use crate::discovery::LogFormat;
use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.vocabulary.path.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "vocabulary.path must not be empty".into(),
            ));
        }
        if LogFormat::parse(&self.discovery_log.format).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "discovery_log.format must be \"text\" or \"jsonl\", got \"{}\"",
                self.discovery_log.format
            )));
        }
        if self.detection.max_results == 0 {
            return Err(ConfigError::ValidationError(
                "detection.max_results must be > 0".into(),
            ));
        }
        if self.image.max_size == 0 {
            return Err(ConfigError::ValidationError(
                "image.max_size must be > 0".into(),
            ));
        }
        if self.image.quality == 0 || self.image.quality > 100 {
            return Err(ConfigError::ValidationError(
                "image.quality must be between 1 and 100".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.detection_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.detection_timeout_ms must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_log_format() {
        let mut config = Config::default();
        config.discovery_log.format = "xml".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("discovery_log.format"));
    }

    #[test]
    fn test_validate_accepts_log_format_aliases() {
        let mut config = Config::default();
        for format in ["txt", "TEXT", "jsonlines", "ndjson"] {
            config.discovery_log.format = format.into();
            assert!(config.validate().is_ok(), "{format} should be accepted");
        }
    }

    #[test]
    fn test_validate_rejects_zero_max_results() {
        let mut config = Config::default();
        config.detection.max_results = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_results"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.decode_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("decode_timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_invalid_quality() {
        let mut config = Config::default();
        config.image.quality = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("image.quality"));

        config.image.quality = 101;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("image.quality"));
    }

    #[test]
    fn test_validate_rejects_empty_vocabulary_path() {
        let mut config = Config::default();
        config.vocabulary.path = "  ".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("vocabulary.path"));
    }
}
