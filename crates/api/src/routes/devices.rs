//! Route definitions for monitored devices.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::devices;
use crate::state::AppState;

/// Device routes mounted at `/devices`.
///
/// ```text
/// GET  /                       -> list_devices
/// POST /                       -> create_device
/// GET  /{id}                   -> get_device
/// PUT  /{id}/status            -> update_status
/// POST /{id}/alerts/check      -> check_alerts
/// GET  /{id}/logs              -> list_device_logs
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(devices::list_devices).post(devices::create_device))
        .route("/{id}", get(devices::get_device))
        .route("/{id}/status", put(devices::update_status))
        .route("/{id}/alerts/check", post(devices::check_alerts))
        .route("/{id}/logs", get(devices::list_device_logs))
}
