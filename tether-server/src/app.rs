use crate::config::ServerConfig;
use crate::room::{RoomCommand, RoomManager, request_stats, spawn_stats_logger};
use crate::signaling::{SignalingService, ws_handler};
use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc};
use tracing::info;

/// Shared by every HTTP and WebSocket handler.
pub struct AppState {
    pub signaling: SignalingService,
    pub commands: mpsc::Sender<RoomCommand>,
    pub config: ServerConfig,
    connection_slots: Arc<Semaphore>,
}

impl AppState {
    /// Start a room manager wired to a fresh [`SignalingService`].
    pub fn start(config: ServerConfig) -> Arc<Self> {
        let signaling = SignalingService::new();
        let commands = RoomManager::spawn(&config, Arc::new(signaling.clone()));

        let slots = config.max_connections.min(Semaphore::MAX_PERMITS);

        Arc::new(Self {
            signaling,
            commands,
            config,
            connection_slots: Arc::new(Semaphore::new(slots)),
        })
    }

    /// Claim one of the `max_connections` session slots. The slot is held
    /// until the returned permit is dropped.
    pub fn try_reserve_slot(&self) -> Option<OwnedSemaphorePermit> {
        self.connection_slots.clone().try_acquire_owned().ok()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .route("/stats", get(stats))
        .with_state(state)
}

async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "connections": state.signaling.connection_count(),
    }))
}

async fn stats(State(state): State<Arc<AppState>>) -> Response {
    match request_stats(&state.commands).await {
        Some(stats) => Json(stats).into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "room manager stopped").into_response(),
    }
}

/// Bind, serve until `shutdown` resolves, then return.
pub async fn serve<F>(config: ServerConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Signaling server listening on ws://{}", addr);
    info!("Room timeout: {:?}", config.room_timeout);
    info!("Max connections: {}", config.max_connections);

    let state = AppState::start(config);
    let stats_logger = spawn_stats_logger(state.commands.clone(), state.config.stats_interval);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("server error")?;

    if let Some(handle) = stats_logger {
        handle.abort();
    }
    info!("Server stopped");
    Ok(())
}
