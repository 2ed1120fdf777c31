//! songchain-back binary entrypoint wiring REST, WebSocket, and the
//! song-generation gateway together.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tokio::time::sleep;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use songchain_back::config::AppConfig;
use songchain_back::gateway::client::SongApiClient;
use songchain_back::gateway::config::GatewayConfig;
use songchain_back::routes;
use songchain_back::state::{AppState, SharedState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let gateway =
        SongApiClient::new(GatewayConfig::from_env()).context("building song API client")?;

    let app_state = AppState::new(config, Arc::new(gateway));

    tokio::spawn(run_lobby_sweeper(app_state.clone()));
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Periodically evict finished lobbies past their retention window and
/// collecting lobbies abandoned by their players. All lobby state is
/// process-memory only, so the sweep is the sole reclamation path.
async fn run_lobby_sweeper(state: SharedState) {
    let retention = state.config().done_retention;
    let idle_timeout = state.config().idle_timeout;
    let interval = state.config().sweep_interval;

    loop {
        sleep(interval).await;
        let removed = state.lobbies().remove_expired(retention, idle_timeout);
        if removed > 0 {
            info!(removed, remaining = state.lobbies().len(), "swept expired lobbies");
        }
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
/// CORS is permissive: the original service accepted connections from any
/// origin and clients are plain browsers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
