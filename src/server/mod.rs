use crate::config::HEALTH_PATH;
use crate::server::state::AppState;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;

pub mod handler;
pub mod state;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(handler::health_check))
        .route(&state.configuration.metrics_path, get(handler::metrics))
        .with_state(state)
}

pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    state.configuration.validate()?;

    let addr = SocketAddr::from(([0, 0, 0, 0], state.configuration.port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(
        "Multipass Exporter is running on {}{}",
        addr,
        state.configuration.metrics_path
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for the shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }

    tracing::info!("Shutting down");
}
