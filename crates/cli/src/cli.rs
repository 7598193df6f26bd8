use std::path::PathBuf;

use clap::Parser;

use ctfeeder_core::Config;

/// Command line arguments for the `ctfeeder` binary.
///
/// Flags override values from the config file and `CTFEEDER_*`
/// environment variables.
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "ctfeeder",
    version,
    about = "Submit stored certificate chains to a Certificate Transparency log"
)]
pub struct CliArgs {
    /// Path to a TOML config file.
    ///
    /// Environment variable: `CTFEEDER_CONFIG`
    #[arg(long, env = "CTFEEDER_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database holding the chains.
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Simulate submissions instead of contacting the log.
    #[arg(long)]
    pub dry_run: bool,

    /// Number of valid chains to skip before the first submission.
    #[arg(long)]
    pub initial_chain_id: Option<i64>,

    /// Number of concurrent submission workers.
    #[arg(long)]
    pub workers: Option<usize>,

    /// Seconds between two stats lines.
    #[arg(long)]
    pub stats_interval: Option<u64>,

    /// Full `add-chain` URL of the log.
    #[arg(long)]
    pub log_url: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub log_json: bool,
}

impl CliArgs {
    /// Apply the flags that were given on top of `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(db) = &self.db {
            config.database.path = db.clone();
        }
        if self.dry_run {
            config.pipeline.dry_run = true;
        }
        if let Some(id) = self.initial_chain_id {
            config.pipeline.initial_chain_id = id;
        }
        if let Some(workers) = self.workers {
            config.pipeline.workers = workers;
        }
        if let Some(secs) = self.stats_interval {
            config.pipeline.stats_interval_secs = secs;
        }
        if let Some(url) = &self.log_url {
            config.log.url = url.clone();
        }
    }
}
