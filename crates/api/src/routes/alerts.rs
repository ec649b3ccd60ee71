//! Route definitions for alert rules.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::alerts;
use crate::state::AppState;

/// Alert rule routes mounted at `/alerts`.
///
/// ```text
/// GET    /         -> list_alerts
/// POST   /         -> create_alert
/// DELETE /{id}     -> delete_alert
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(alerts::list_alerts).post(alerts::create_alert))
        .route("/{id}", delete(alerts::delete_alert))
}
