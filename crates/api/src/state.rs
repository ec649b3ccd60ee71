use std::sync::Arc;

use devwatch_core::engine::AlertEngine;
use devwatch_db::store::PgStore;
use devwatch_events::MailNotifier;
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;

/// The alert engine as wired in production: Postgres for rules and logs,
/// email for notifications.
pub type Engine = AlertEngine<PgStore, PgStore, MailNotifier>;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: devwatch_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Alert engine shared by every request.
    pub engine: Arc<Engine>,
    /// Cancelled when the server begins shutting down; in-flight alert
    /// evaluations stop between rules.
    pub shutdown: CancellationToken,
}
