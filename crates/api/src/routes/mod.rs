pub mod alerts;
pub mod devices;
pub mod health;
pub mod logs;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /alerts                          list, create
/// /alerts/{id}                     delete
///
/// /devices                         list, register
/// /devices/{id}                    get
/// /devices/{id}/status             update status (PUT)
/// /devices/{id}/alerts/check       evaluate alert rules (POST)
/// /devices/{id}/logs               device log records (GET)
///
/// /logs                            most recent log records (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/alerts", alerts::router())
        .nest("/devices", devices::router())
        .nest("/logs", logs::router())
}
