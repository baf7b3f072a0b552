//! rumahsubsidi proxy server entry point.
//!
//! Boots the HTTP proxy that lets browser pages reach the PKP eligibility
//! service and Sikumbang listing pages without CORS restrictions.

use anyhow::{Context, Result};
use rumahsubsidi_core::AppConfig;
use tokio::net::TcpListener;

mod error;
mod handler;
mod routes;
mod telemetry;

#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init(telemetry::LogFormat::from_env());

    let config = AppConfig::load_or_default();
    let address = config.server.bind_addr();

    let state = handler::AppState::new(config.clone()).context("failed to build upstream clients")?;
    let app = handler::router(state);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    tracing::info!(%address, "proxy server running");
    tracing::info!("endpoints: POST {}, GET {}/:id", routes::CEK_SUBSIDI, routes::DETAIL_PERUMAHAN);
    tracing::info!(sikumbang = %config.sikumbang.base_url, pkp = %config.pkp.url, "upstreams");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("proxy server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        tracing::info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                tracing::info!("received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install terminate handler");
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
