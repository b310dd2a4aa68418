use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
/// There is no other cross-request state: every handler loads, mutates, and
/// persists fresh rows.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: civica_db::DbPool,
    /// Immutable server configuration (JWT secrets, upload dir, admin setup
    /// secret).
    pub config: Arc<ServerConfig>,
}
