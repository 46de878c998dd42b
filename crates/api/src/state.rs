use std::sync::Arc;

use crate::config::ServerConfig;
use crate::notifications::Notifier;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool is reference counted and the rest sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: pulse_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Persists notifications and mirrors them to email.
    pub notifier: Arc<Notifier>,
}
