//! Operator CLI for panel-deployer
//!
//! Wires the SSH transport, the config file and the Cloudflare backends into
//! the core services and exposes one subcommand per operation. Results are
//! printed to stdout as JSON; logs go to stderr (`RUST_LOG` to filter).

mod cli;
mod commands;
mod config;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use panel_deployer_core::traits::{InMemoryConfigService, ProbingBackendFactory};
use panel_deployer_core::utils::CancelFlag;
use panel_deployer_core::{ModuleRegistry, ServiceContext};
use panel_deployer_ssh::SshConnector;

use cli::Cli;
use commands::Runner;

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    let app_config = config::load_config(cli.config.as_deref())?;

    // One read connection per concurrent analysis read
    let connector = SshConnector::new().with_read_lanes(app_config.analysis.concurrency);

    let ctx = Arc::new(ServiceContext::new(
        Arc::new(connector),
        Arc::new(InMemoryConfigService::new(app_config)),
        Arc::new(ModuleRegistry::builtin()),
        Arc::new(ProbingBackendFactory::new()),
    ));

    // Ctrl-C stops new items from starting; running commands finish
    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, finishing the current item");
                cancel.cancel();
            }
        });
    }

    Runner::new(ctx, cancel, cli.compact).run(cli.command).await
}
