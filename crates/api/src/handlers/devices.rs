//! Handlers for monitored devices and on-demand alert evaluation.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use devwatch_core::alert::Device;
use devwatch_core::error::CoreError;
use devwatch_core::types::DbId;
use devwatch_db::models::device::{CreateDevice, DeviceRow, UpdateDeviceStatus};
use devwatch_db::repositories::{DeviceLogRepo, DeviceRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::logs::into_records;
use crate::query::LimitParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Fetch a device or fail with 404.
async fn find_device(state: &AppState, id: DbId) -> AppResult<DeviceRow> {
    DeviceRepo::get_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Device",
            id,
        }))
}

/// GET /devices
pub async fn list_devices(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let devices = DeviceRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: devices }))
}

/// POST /devices
pub async fn create_device(
    State(state): State<AppState>,
    Json(input): Json<CreateDevice>,
) -> AppResult<impl IntoResponse> {
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("Device name must not be empty".into()));
    }
    let device = DeviceRepo::create(&state.pool, &input).await?;
    tracing::info!(device_id = device.id, status = %device.status, "Device registered");
    Ok((StatusCode::CREATED, Json(DataResponse { data: device })))
}

/// GET /devices/{id}
pub async fn get_device(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let device = find_device(&state, id).await?;
    Ok(Json(DataResponse { data: device }))
}

/// PUT /devices/{id}/status
///
/// Records the status only; alert rules are evaluated when
/// `/alerts/check` is called.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDeviceStatus>,
) -> AppResult<impl IntoResponse> {
    let device = DeviceRepo::update_status(&state.pool, id, &input.status)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Device",
            id,
        }))?;
    tracing::info!(device_id = id, status = %device.status, "Device status updated");
    Ok(Json(DataResponse { data: device }))
}

/// POST /devices/{id}/alerts/check
///
/// Evaluates every alert rule against the device's current status and
/// returns how many alerts were triggered.
///
/// The evaluation runs on its own task: a request timeout or client
/// disconnect detaches it rather than cutting a dispatch between the log
/// write and the email. Only the shutdown token stops it early.
pub async fn check_alerts(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let device: Device = find_device(&state, id).await?.into();
    let report = state
        .engine
        .spawn_evaluation(device, state.shutdown.clone())
        .await??;
    Ok(Json(DataResponse { data: report }))
}

/// GET /devices/{id}/logs?limit=
pub async fn list_device_logs(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<LimitParams>,
) -> AppResult<impl IntoResponse> {
    find_device(&state, id).await?;
    let rows = DeviceLogRepo::list_by_device(&state.pool, id, params.clamped()).await?;
    Ok(Json(DataResponse {
        data: into_records(rows)?,
    }))
}
