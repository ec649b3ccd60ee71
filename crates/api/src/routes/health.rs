//! Root-level readiness probe for the alerting service.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// What `/health` reports about the service's ability to raise alerts.
#[derive(Debug, Serialize)]
pub struct Readiness {
    /// `ok`, `degraded` (database unreachable) or `draining` (shutting down).
    pub status: &'static str,
    pub version: &'static str,
    /// Rules and log records can be read and written.
    pub db_healthy: bool,
    /// Alerts are emailed; `false` means they are only logged.
    pub email_enabled: bool,
    /// New evaluations still run every matching rule.
    pub accepting_evaluations: bool,
}

/// GET /health
async fn readiness(State(state): State<AppState>) -> Json<Readiness> {
    let db_healthy = devwatch_db::health_check(&state.pool).await.is_ok();
    let accepting_evaluations = !state.shutdown.is_cancelled();

    let status = match (db_healthy, accepting_evaluations) {
        (_, false) => "draining",
        (false, true) => "degraded",
        (true, true) => "ok",
    };

    Json(Readiness {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        email_enabled: state.engine.notifier().is_enabled(),
        accepting_evaluations,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(readiness))
}
