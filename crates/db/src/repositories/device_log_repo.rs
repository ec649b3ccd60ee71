//! Repository for the `device_logs` table. Rows are never updated.

use devwatch_core::alert::NewLogRecord;
use devwatch_core::types::DbId;
use sqlx::PgPool;

use crate::models::device_log::DeviceLogRow;

/// Column list for `device_logs` queries.
const COLUMNS: &str = "id, device_id, level, message, created_at";

/// Provides append and read operations for device logs.
pub struct DeviceLogRepo;

impl DeviceLogRepo {
    /// Append a log record.
    pub async fn create(pool: &PgPool, record: &NewLogRecord) -> Result<DeviceLogRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO device_logs (device_id, level, message, created_at) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DeviceLogRow>(&query)
            .bind(record.device_id)
            .bind(record.level.as_str())
            .bind(&record.message)
            .bind(record.created_at)
            .fetch_one(pool)
            .await
    }

    /// List logs for one device, most recent first.
    pub async fn list_by_device(
        pool: &PgPool,
        device_id: DbId,
        limit: i64,
    ) -> Result<Vec<DeviceLogRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM device_logs \
             WHERE device_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, DeviceLogRow>(&query)
            .bind(device_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// List the most recent logs across all devices.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<DeviceLogRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM device_logs \
             ORDER BY created_at DESC, id DESC \
             LIMIT $1"
        );
        sqlx::query_as::<_, DeviceLogRow>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
