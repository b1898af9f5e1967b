//! Calculator server process.
//!
//! Serves the calculator registry over HTTP on `PORT` (default 3000) and,
//! when `TCP_PORT` is set, over the bincode TCP transport as well.

use anyhow::Context;
use calc_server::ServerConfig;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use typedrpc::net::server::{router, serve_tcp};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::load().context("loading server configuration")?;
    let registry = Arc::new(calc_server::registry()?);
    info!(?registry, "calculator registry ready");

    let http_addr = config.http_addr();
    let listener = TcpListener::bind(http_addr)
        .await
        .with_context(|| format!("binding http listener on {http_addr}"))?;
    info!(addr = %http_addr, "serving http");
    let app = router(Arc::clone(&registry));
    let http = async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("http server")
    };

    match config.tcp_addr() {
        Some(tcp_addr) => {
            let listener = TcpListener::bind(tcp_addr)
                .await
                .with_context(|| format!("binding tcp listener on {tcp_addr}"))?;
            tokio::select! {
                result = http => result?,
                result = serve_tcp(registry, listener) => result.context("tcp server")?,
            }
        }
        None => http.await?,
    }

    info!("calculator server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for ctrl-c");
        return;
    }
    info!("shutdown requested");
}
