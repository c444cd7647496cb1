//! QuoteSync server entry point.

use std::sync::Arc;

use anyhow::Context;
use quotesync_api::utils::{init_logging, shutdown_signal};
use quotesync_api::{router, AppContext};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();
    init_logging()?;
    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(err) => warn!(error = %err, "no .env file loaded"),
    }

    let config = quotesync_infra::config::load().context("failed to load configuration")?;
    let bind_address = config.server.bind_address.clone();
    let scheduler_enabled = config.sync.scheduler_enabled;

    let ctx = Arc::new(AppContext::new(config).context("failed to build application context")?);
    ctx.seed_reps().await.context("failed to seed reps")?;

    let mut scheduler = ctx.sweep_scheduler();
    if scheduler_enabled {
        scheduler.start().await.context("failed to start sweep scheduler")?;
    } else {
        info!("sweep scheduler disabled");
    }

    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    info!(address = %bind_address, "QuoteSync listening");

    axum::serve(listener, router(Arc::clone(&ctx)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if scheduler.is_running() {
        scheduler.stop().await.context("failed to stop sweep scheduler")?;
    }
    info!("QuoteSync stopped");
    Ok(())
}
