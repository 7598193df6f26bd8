pub mod chain;
pub mod config;
pub mod pipeline;
pub mod sink;
pub mod store;
pub mod testing;

pub use chain::{
    AssembleError, AssembledChain, CertRecord, CertReport, ChainAssembler, ChainIdentity,
    Fingerprint, ValidationError,
};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, validate_pipeline,
    Config, ConfigError, DatabaseConfig, LogConfig, PipelineConfig,
};
pub use pipeline::{
    ChainSource, ExitHook, Orchestrator, PipelineError, ProgressSnapshot, ProgressState,
    RunSummary, Shutdown, StatsReporter, WorkerPool, WorkerStats,
};
pub use sink::{
    create_sink, DryRunSink, LiveSink, SubmissionError, SubmissionOutcome, SubmissionSink,
};
pub use store::{ChainStore, SqliteChainStore, StoreError};
