use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix for environment variable overrides, e.g. `CTFEEDER_PIPELINE__WORKERS=8`
pub const ENV_PREFIX: &str = "CTFEEDER_";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    base_figment()
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from defaults and environment variables only
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    base_figment()
        .merge(env_provider())
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

fn base_figment() -> Figment {
    Figment::from(Serialized::defaults(Config::default()))
}

fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).split("__")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[pipeline]
workers = 12
dry_run = true
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.pipeline.workers, 12);
        assert!(config.pipeline.dry_run);
        assert_eq!(config.pipeline.page_size, 1000);
    }

    #[test]
    fn test_load_config_from_str_empty_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.pipeline.workers, 5);
        assert_eq!(config.database.path.to_str().unwrap(), "ctfeeder.db");
    }

    #[test]
    fn test_load_config_from_str_bad_type() {
        let toml = r#"
[pipeline]
workers = "many"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/ctfeeder.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[database]
path = "/var/lib/ctfeeder/chains.db"

[pipeline]
initial_chain_id = 4200
stats_interval_secs = 30
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(
            config.database.path.to_str().unwrap(),
            "/var/lib/ctfeeder/chains.db"
        );
        assert_eq!(config.pipeline.initial_chain_id, 4200);
        assert_eq!(config.pipeline.stats_interval_secs, 30);
        // untouched sections keep their defaults
        assert_eq!(config.log.timeout_secs, 30);
    }
}
