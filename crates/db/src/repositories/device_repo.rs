//! Repository for the `devices` table.

use devwatch_core::alert::DeviceStatus;
use devwatch_core::types::DbId;
use sqlx::PgPool;

use crate::models::device::{CreateDevice, DeviceRow};

/// Column list for `devices` queries.
const COLUMNS: &str = "id, name, status, created_at, updated_at";

/// Provides query operations for monitored devices.
pub struct DeviceRepo;

impl DeviceRepo {
    /// Register a device. Status defaults to `ACTIVE`.
    pub async fn create(pool: &PgPool, input: &CreateDevice) -> Result<DeviceRow, sqlx::Error> {
        let status = input.status.clone().unwrap_or(DeviceStatus::Active);
        let query = format!(
            "INSERT INTO devices (name, status) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DeviceRow>(&query)
            .bind(&input.name)
            .bind(status.as_str())
            .fetch_one(pool)
            .await
    }

    /// Get a single device by ID.
    pub async fn get_by_id(pool: &PgPool, id: DbId) -> Result<Option<DeviceRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM devices WHERE id = $1");
        sqlx::query_as::<_, DeviceRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all devices, ordered by name.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<DeviceRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM devices ORDER BY name, id");
        sqlx::query_as::<_, DeviceRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Record a new status for a device.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &DeviceStatus,
    ) -> Result<Option<DeviceRow>, sqlx::Error> {
        let query = format!(
            "UPDATE devices SET status = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DeviceRow>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }
}
