mod cli;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ctfeeder_core::{
    create_sink, load_config, load_config_from_env, validate_config, ChainStore, Orchestrator,
    SqliteChainStore,
};

use cli::CliArgs;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    if let Err(e) = run(args).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

async fn run(args: CliArgs) -> Result<()> {
    // Load configuration
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(path).with_context(|| format!("Failed to load config from {:?}", path))?
        }
        None => load_config_from_env().context("Failed to load config from environment")?,
    };
    args.apply(&mut config);

    validate_config(&config).context("Configuration validation failed")?;

    info!("Database path: {:?}", config.database.path);
    info!("Dry run: {}", config.pipeline.dry_run);

    let store: Arc<dyn ChainStore> = Arc::new(
        SqliteChainStore::new(&config.database.path).context("Failed to open chain store")?,
    );

    let sink = create_sink(&config.log, &config.pipeline).context("Failed to create sink")?;
    info!("Using sink: {}", sink.name());

    let orchestrator = Orchestrator::new(config.pipeline.clone(), store, sink);
    let shutdown = orchestrator.shutdown_handle();

    let run = orchestrator.run();
    tokio::pin!(run);
    let finished = tokio::select! {
        result = &mut run => Some(result),
        _ = shutdown_signal() => None,
    };
    let result = match finished {
        Some(result) => result,
        None => {
            warn!("Interrupted, waiting for in-flight submissions");
            shutdown.trigger();
            run.await
        }
    };
    let summary = result.context("Chain submission failed")?;

    info!(
        pages = summary.source.pages,
        chains = summary.source.identities,
        skipped = summary.assembly.skipped,
        attempted = summary.submissions.attempted,
        submitted = summary.submissions.succeeded,
        failed = summary.submissions.failed,
        new = summary.progress.new_count,
        next_offset = summary.source.next_offset,
        "Run complete"
    );

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
