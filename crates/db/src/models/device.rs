//! Device entity model and DTOs.

use devwatch_core::alert::{Device, DeviceStatus};
use devwatch_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `devices` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DeviceRow {
    pub id: DbId,
    pub name: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<DeviceRow> for Device {
    fn from(row: DeviceRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            status: DeviceStatus::from(row.status),
        }
    }
}

/// DTO for registering a device.
#[derive(Debug, Deserialize)]
pub struct CreateDevice {
    pub name: String,
    /// Defaults to `ACTIVE` when omitted.
    pub status: Option<DeviceStatus>,
}

/// DTO for reporting a new device status.
#[derive(Debug, Deserialize)]
pub struct UpdateDeviceStatus {
    pub status: DeviceStatus,
}
