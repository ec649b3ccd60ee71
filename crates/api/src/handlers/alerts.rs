//! Handlers for alert rule CRUD.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use devwatch_core::alert::NewAlertRule;
use devwatch_core::error::CoreError;
use devwatch_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /alerts
pub async fn list_alerts(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let rules = state.engine.list_rules().await?;
    Ok(Json(DataResponse { data: rules }))
}

/// POST /alerts
pub async fn create_alert(
    State(state): State<AppState>,
    Json(input): Json<NewAlertRule>,
) -> AppResult<impl IntoResponse> {
    let rule = state.engine.create_rule(input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: rule })))
}

/// DELETE /alerts/{id}
///
/// Returns 404 when the rule does not exist; the engine itself treats that
/// case as a no-op.
pub async fn delete_alert(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !state.engine.delete_rule(id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "AlertRule",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
