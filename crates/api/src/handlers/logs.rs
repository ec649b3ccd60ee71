use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use devwatch_core::alert::LogRecord;
use devwatch_db::models::device_log::DeviceLogRow;
use devwatch_db::repositories::DeviceLogRepo;

use crate::error::AppResult;
use crate::query::LimitParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Convert stored log rows into domain records.
pub(crate) fn into_records(rows: Vec<DeviceLogRow>) -> AppResult<Vec<LogRecord>> {
    Ok(rows
        .into_iter()
        .map(LogRecord::try_from)
        .collect::<Result<Vec<_>, _>>()?)
}

/// GET /logs?limit=
pub async fn list_recent_logs(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> AppResult<impl IntoResponse> {
    let rows = DeviceLogRepo::list_recent(&state.pool, params.clamped()).await?;
    Ok(Json(DataResponse {
        data: into_records(rows)?,
    }))
}
