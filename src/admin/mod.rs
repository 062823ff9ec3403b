//! Read-only admin API.
//!
//! # Endpoints
//! - `GET /admin/status`: lifecycle state, table version, last cycle
//! - `GET /admin/routes`: committed route table
//! - `GET /admin/certs`: certificate state per routed host
//!
//! # Design Decisions
//! - Disabled by default; bearer key required when enabled
//! - Handlers only read snapshots; nothing here mutates controller state

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;

use crate::certs::CertificateManager;
use crate::lifecycle::Shutdown;
use crate::routing::RouteStore;
use crate::scheduler::StatusBoard;

use self::auth::admin_auth_middleware;
use self::handlers::*;

/// Shared handles the admin handlers read from.
#[derive(Clone)]
pub struct AdminState {
    pub store: Arc<RouteStore>,
    pub certs: Arc<CertificateManager>,
    pub status: Arc<StatusBoard>,
    pub api_key: Arc<str>,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/routes", get(get_routes))
        .route("/admin/certs", get(get_certs))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}

/// Serve the admin API until shutdown.
pub async fn serve(
    listener: TcpListener,
    state: AdminState,
    shutdown: Arc<Shutdown>,
) -> std::io::Result<()> {
    let mut shutdown_rx = shutdown.subscribe();
    tracing::info!(address = %listener.local_addr()?, "Admin API listening");

    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(async move {
            if !shutdown.is_triggered() {
                let _ = shutdown_rx.recv().await;
            }
        })
        .await
}
