use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use shipwright_http::{CancellationToken, ExecutorConfig, HttpExecutor, ReqwestTransport};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::cli::{App, Commands};

mod cli;
mod ui;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app = App::parse();
    init_tracing(app.verbose);

    let config = match &app.config {
        Some(path) => ExecutorConfig::from_toml_file(path)
            .await
            .with_context(|| format!("cannot load config {}", path.display()))?,
        None => ExecutorConfig::default(),
    };

    let transport = ReqwestTransport::new().context("cannot build HTTP client")?;
    let executor = Arc::new(HttpExecutor::with_config(transport, config));

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    match app.cmd {
        Commands::Download(arg) => arg.run(executor.as_ref(), cancel).await,
        Commands::Publish(arg) => arg.run(executor, cancel).await,
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "info,shipwright_http=debug,shipwright_release=debug",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_target(false)
        .init();
}
