use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    Res, api,
    config::Config,
    management::{MemoryTokenStore, TokenManager, TokenStore},
    spotify::SpotifyClient,
};

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub spotify: SpotifyClient,
    pub tokens: TokenManager,
}

impl AppState {
    /// Wires the Spotify client and token manager around `store`.
    pub fn new(config: Config, store: Arc<dyn TokenStore>) -> Self {
        let config = Arc::new(config);
        let spotify = SpotifyClient::new(Arc::clone(&config));
        let tokens = TokenManager::new(store, spotify.clone());
        Self {
            config,
            spotify,
            tokens,
        }
    }

    /// State backed by a fresh in-memory token store.
    pub fn in_memory(config: Config) -> Self {
        Self::new(config, Arc::new(MemoryTokenStore::new()))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::root))
        .route("/health", get(api::health))
        .route("/auth/login", get(api::login))
        .route("/auth/callback", get(api::callback))
        .route("/api/{user_id}/top", get(api::top))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves requests on `listener` until Ctrl-C.
pub async fn start_api_server(listener: TcpListener, state: AppState) -> Res<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

/// Binds a listener on the address derived from `config`.
pub async fn bind(config: &Config) -> Res<TcpListener> {
    let addr = SocketAddr::from_str(&config.server_addr())?;
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "listening");
    Ok(listener)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
