use super::{
    types::{Config, PipelineConfig},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Pipeline settings, see [`validate_pipeline`]
/// - Log timeout is not 0
/// - Log URL is an http(s) URL
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    validate_pipeline(&config.pipeline)?;

    if config.log.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "log.timeout_secs cannot be 0".to_string(),
        ));
    }

    let url = reqwest::Url::parse(&config.log.url)
        .map_err(|e| ConfigError::ValidationError(format!("log.url is invalid: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::ValidationError(format!(
            "log.url must use http or https, got {}",
            url.scheme()
        )));
    }

    Ok(())
}

/// Validate pipeline settings
/// - Workers, page size, buffers and stats interval are not 0
/// - Initial chain ID is not negative
pub fn validate_pipeline(pipeline: &PipelineConfig) -> Result<(), ConfigError> {
    let non_zero = [
        ("pipeline.workers", pipeline.workers as u64),
        ("pipeline.page_size", pipeline.page_size as u64),
        ("pipeline.batch_buffer", pipeline.batch_buffer as u64),
        ("pipeline.submission_buffer", pipeline.submission_buffer as u64),
        ("pipeline.stats_interval_secs", pipeline.stats_interval_secs),
    ];
    for (name, value) in non_zero {
        if value == 0 {
            return Err(ConfigError::ValidationError(format!("{} cannot be 0", name)));
        }
    }

    if pipeline.initial_chain_id < 0 {
        return Err(ConfigError::ValidationError(
            "pipeline.initial_chain_id cannot be negative".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_zero_workers_fails() {
        let mut config = Config::default();
        config.pipeline.workers = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m.contains("workers")));
    }

    #[test]
    fn test_validate_zero_page_size_fails() {
        let mut config = Config::default();
        config.pipeline.page_size = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_negative_offset_fails() {
        let mut config = Config::default();
        config.pipeline.initial_chain_id = -1;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let mut config = Config::default();
        config.log.timeout_secs = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m.contains("timeout")));
    }

    #[test]
    fn test_validate_pipeline_zero_buffers_fail() {
        let pipeline = PipelineConfig {
            submission_buffer: 0,
            ..PipelineConfig::default()
        };
        assert!(validate_pipeline(&pipeline).is_err());

        let pipeline = PipelineConfig {
            stats_interval_secs: 0,
            ..PipelineConfig::default()
        };
        assert!(validate_pipeline(&pipeline).is_err());
        assert!(validate_pipeline(&PipelineConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_bad_url_fails() {
        let mut config = Config::default();
        config.log.url = "not a url".to_string();
        assert!(validate_config(&config).is_err());

        config.log.url = "ftp://example.com/add-chain".to_string();
        assert!(validate_config(&config).is_err());
    }
}
