use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default log endpoint chains are submitted to.
pub const DEFAULT_LOG_URL: &str = "https://ct.googleapis.com/rocketeer/ct/v1/add-chain";

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("ctfeeder.db")
}

/// Target log configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    /// Full `add-chain` URL of the log
    #[serde(default = "default_log_url")]
    pub url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            url: default_log_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_log_url() -> String {
    DEFAULT_LOG_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Pipeline sizing and behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Simulate submissions instead of contacting the log.
    #[serde(default)]
    pub dry_run: bool,

    /// Pagination offset to start reading chains from.
    /// Use the last reported chain ID of a previous run to resume.
    #[serde(default)]
    pub initial_chain_id: i64,

    /// Number of concurrent submission workers.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// How often progress is reported (seconds).
    #[serde(default = "default_stats_interval")]
    pub stats_interval_secs: u64,

    /// Chains requested per store page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Pages buffered between the source and the assembly loop.
    #[serde(default = "default_batch_buffer")]
    pub batch_buffer: usize,

    /// Assembled chains buffered ahead of the workers.
    #[serde(default = "default_submission_buffer")]
    pub submission_buffer: usize,

    /// Simulated latency of a dry-run submission (milliseconds).
    #[serde(default = "default_dry_run_delay")]
    pub dry_run_delay_ms: u64,
}

fn default_workers() -> usize {
    5
}

fn default_stats_interval() -> u64 {
    15
}

fn default_page_size() -> usize {
    1000
}

fn default_batch_buffer() -> usize {
    100
}

fn default_submission_buffer() -> usize {
    100_000
}

fn default_dry_run_delay() -> u64 {
    500
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            initial_chain_id: 0,
            workers: default_workers(),
            stats_interval_secs: default_stats_interval(),
            page_size: default_page_size(),
            batch_buffer: default_batch_buffer(),
            submission_buffer: default_submission_buffer(),
            dry_run_delay_ms: default_dry_run_delay(),
        }
    }
}

impl PipelineConfig {
    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs)
    }

    pub fn dry_run_delay(&self) -> Duration {
        Duration::from_millis(self.dry_run_delay_ms)
    }

    /// Sets the worker count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets the store page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Enables or disables dry-run submission.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Sets the starting pagination offset.
    pub fn with_initial_chain_id(mut self, id: i64) -> Self {
        self.initial_chain_id = id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pipeline_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.workers, 5);
        assert_eq!(config.page_size, 1000);
        assert_eq!(config.batch_buffer, 100);
        assert_eq!(config.submission_buffer, 100_000);
        assert_eq!(config.stats_interval(), Duration::from_secs(15));
        assert_eq!(config.dry_run_delay(), Duration::from_millis(500));
        assert!(!config.dry_run);
    }

    #[test]
    fn test_deserialize_log_section() {
        let toml = r#"
[log]
url = "http://localhost:6962/ct/v1/add-chain"
timeout_secs = 5
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.log.url, "http://localhost:6962/ct/v1/add-chain");
        assert_eq!(config.log.timeout_secs, 5);
    }

    #[test]
    fn test_deserialize_with_default_log() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.log.url, DEFAULT_LOG_URL);
    }

    #[test]
    fn test_pipeline_builder() {
        let config = PipelineConfig::default()
            .with_workers(16)
            .with_page_size(250)
            .with_dry_run(true)
            .with_initial_chain_id(77);

        assert_eq!(config.workers, 16);
        assert_eq!(config.page_size, 250);
        assert!(config.dry_run);
        assert_eq!(config.initial_chain_id, 77);
    }
}
