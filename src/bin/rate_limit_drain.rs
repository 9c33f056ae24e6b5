//! Rate Limit Drain
//!
//! Probes the API until the rate window is exhausted, waits for the reset and
//! repeats until Ctrl+C or SIGTERM.

use anyhow::{Context, Result};
use octowire::drain::{CancellationToken, DrainLoopOutcome, MetadataProbe, RateLimitDrain};
use octowire::{package_info, ConfigLoader, GitHubClient, ServiceCollection};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    if let Err(e) = octowire::logging::init(octowire::logging::DEFAULT_DIRECTIVE) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    match run().await {
        Ok(DrainLoopOutcome::Cancelled { probes, waits }) => {
            info!(probes, waits, "Rate limit drain stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Rate limit drain failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<DrainLoopOutcome> {
    let settings = ConfigLoader::new()
        .context("Failed to load configuration")?
        .into_settings();

    let mut services = ServiceCollection::new();
    services
        .add_github_from_settings(&settings, &package_info!())
        .context("Failed to register GitHub services")?;
    let provider = services.build_provider();

    let github = provider
        .get_required::<dyn GitHubClient>()
        .context("Failed to construct the GitHub client")?;
    // The loop paces itself; a transport timeout would only cut probes short
    github.set_request_timeout(None);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = shutdown_signal().await {
            warn!("Error while waiting for shutdown signal: {e}");
            return;
        }
        on_signal.cancel();
    });

    let drain = RateLimitDrain::new(Arc::new(MetadataProbe::new(github)), cancel);
    drain.run().await.context("Rate limit probe failed")
}

async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => res?,
        res = terminate => res?,
    }

    info!("Shutdown signal received");
    Ok(())
}
