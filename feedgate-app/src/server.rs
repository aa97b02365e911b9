use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;
use feedgate_api::{AppState, StreamFeedService, app};
use feedgate_config::FeedgateConfig;
use feedgate_stream::{StreamClient, StreamCredentials};
use tokio::net::TcpListener;

pub fn credentials(cfg: &FeedgateConfig) -> StreamCredentials {
    StreamCredentials {
        api_key: cfg.api_key.clone(),
        api_secret: cfg.api_secret.clone(),
        region: cfg.region.clone(),
        base_url: cfg.api_url.clone(),
        timeout: None,
    }
}

/// Wire provider client, service and router. A client that cannot be built
/// is fatal for the process.
pub fn build_router(cfg: &FeedgateConfig) -> Result<Router> {
    let client = StreamClient::new(&credentials(cfg)).context("failed to build stream client")?;
    Ok(app(AppState::new(StreamFeedService::new(client))))
}

pub async fn serve(router: Router, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(addr = %listener.local_addr()?, "feedgate.listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("feedgate.stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("feedgate.shutdown_requested");
}
