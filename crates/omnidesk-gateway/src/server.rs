// SPDX-FileCopyrightText: 2026 OmniDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, shared state, and static file serving for the
//! uploads directory. Authentication is out of scope for this surface; CORS
//! is permissive like the source desk.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use omnidesk_bus::EventBus;
use omnidesk_core::{ChannelSession, DeskError};
use omnidesk_media::DiskMediaStore;
use omnidesk_storage::SqliteStorage;

use crate::handlers;
use crate::ws;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Narrow send/status capability of the channel session manager.
    pub channel: Arc<dyn ChannelSession>,
    /// Persistence gateway, including the operator-only listing surface.
    pub storage: Arc<SqliteStorage>,
    /// Disk-backed media store (also served statically under /uploads).
    pub media: Arc<DiskMediaStore>,
    /// Live notification bus fanned out over /ws.
    pub bus: EventBus,
}

/// Gateway server configuration (mirrors GatewayConfig from omnidesk-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Maximum accepted upload body size in bytes.
    pub max_upload_bytes: u64,
}

/// Builds the full application router.
pub fn build_router(state: GatewayState, config: &ServerConfig) -> Router {
    let uploads_dir = state.media.root().to_path_buf();

    let api_routes = Router::new()
        // Channel lifecycle + manual agent actions.
        .route("/whatsapp/status", get(handlers::channel::get_status))
        .route("/whatsapp/logout", post(handlers::channel::post_logout))
        .route("/whatsapp/reset", post(handlers::channel::post_reset))
        .route("/send", post(handlers::channel::post_send))
        .route("/typing", post(handlers::channel::post_typing))
        // Ticket board.
        .route("/tickets", get(handlers::tickets::get_tickets))
        .route("/tickets/{id}/assign", post(handlers::tickets::post_assign))
        .route("/tickets/{id}/close", post(handlers::tickets::post_close))
        .route("/tickets/{id}/transfer", post(handlers::tickets::post_transfer))
        .route("/tickets/{id}", put(handlers::tickets::put_ticket))
        // Contacts and conversation history.
        .route("/contacts", get(handlers::contacts::get_contacts))
        .route(
            "/contacts/{id}",
            put(handlers::contacts::put_contact).delete(handlers::contacts::delete_contact),
        )
        .route(
            "/contacts/{id}/toggle-ai",
            post(handlers::contacts::post_toggle_ai),
        )
        // GET takes a contact id, PUT/DELETE take a message id.
        .route(
            "/messages/{id}",
            get(handlers::contacts::get_messages)
                .put(handlers::contacts::put_message)
                .delete(handlers::contacts::delete_message),
        )
        // Operator uploads.
        .route("/upload", post(handlers::uploads::post_upload))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes as usize));

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(ws::ws_handler))
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the gateway HTTP/WebSocket server. Runs until the process exits.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), DeskError> {
    let app = build_router(state, config);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| DeskError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| DeskError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
