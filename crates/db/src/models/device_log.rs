//! Device log entity model.

use devwatch_core::alert::{Level, LogRecord};
use devwatch_core::error::CoreError;
use devwatch_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `device_logs` table.
#[derive(Debug, Clone, FromRow)]
pub struct DeviceLogRow {
    pub id: DbId,
    pub device_id: DbId,
    pub level: String,
    pub message: String,
    pub created_at: Timestamp,
}

impl TryFrom<DeviceLogRow> for LogRecord {
    type Error = CoreError;

    fn try_from(row: DeviceLogRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            device_id: row.device_id,
            level: row.level.parse::<Level>()?,
            message: row.message,
            created_at: row.created_at,
        })
    }
}
