#![forbid(unsafe_code)]

//! `shellgeist` — AI code-editing daemon binary.
//!
//! Bootstraps configuration, starts the IPC server, and runs until a
//! shutdown signal arrives.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use shellgeist::config::Config;
use shellgeist::ipc::server::{spawn_ipc_server, ServerState};
use shellgeist::llm::{HttpModelFactory, ModelFactory};
use shellgeist::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "shellgeist", about = "AI code-editing daemon", version, long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file.
    ///
    /// Environment variables override file values; without a file the
    /// daemon runs on defaults plus the environment.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the IPC socket name.
    #[arg(long)]
    ipc_name: Option<String>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("shellgeist daemon bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    let mut config = match args.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::from_env(),
    };
    if let Some(name) = args.ipc_name {
        config.ipc_name = name;
    }
    info!(ipc_name = %config.ipc_name, model_smart = %config.model_smart, "configuration loaded");

    let factory: Arc<dyn ModelFactory> = Arc::new(HttpModelFactory::new(config.clone()));
    let state = Arc::new(ServerState { config, factory });

    let ct = CancellationToken::new();
    let server_handle = spawn_ipc_server(Arc::clone(&state), ct.clone())?;
    info!("daemon ready");

    shutdown_signal().await;
    info!("shutdown signal received — stopping");
    ct.cancel();
    let _ = server_handle.await;

    info!("shellgeist shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
