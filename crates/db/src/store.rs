//! PostgreSQL-backed alert and log stores for the alert engine.

use devwatch_core::alert::{AlertRule, LogRecord, NewAlertRule, NewLogRecord};
use devwatch_core::engine::{AlertStore, BoxError, LogStore};
use devwatch_core::error::CoreError;
use devwatch_core::types::DbId;

use crate::repositories::{AlertRuleRepo, DeviceLogRepo};
use crate::DbPool;

/// Errors raised while reading or writing through [`PgStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be mapped onto its domain type.
    #[error("Invalid stored row: {0}")]
    InvalidRow(#[from] CoreError),
}

/// Alert and log storage over a shared connection pool.
///
/// Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn create_rule(&self, rule: &NewAlertRule) -> Result<AlertRule, StoreError> {
        let row = AlertRuleRepo::create(&self.pool, rule).await?;
        Ok(AlertRule::try_from(row)?)
    }

    async fn list_rules(&self) -> Result<Vec<AlertRule>, StoreError> {
        let rows = AlertRuleRepo::list_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(AlertRule::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn save_log(&self, record: &NewLogRecord) -> Result<LogRecord, StoreError> {
        let row = DeviceLogRepo::create(&self.pool, record).await?;
        Ok(LogRecord::try_from(row)?)
    }
}

impl AlertStore for PgStore {
    async fn create(&self, rule: &NewAlertRule) -> Result<AlertRule, BoxError> {
        Ok(self.create_rule(rule).await?)
    }

    async fn list_all(&self) -> Result<Vec<AlertRule>, BoxError> {
        Ok(self.list_rules().await?)
    }

    async fn delete_by_id(&self, id: DbId) -> Result<bool, BoxError> {
        let deleted = AlertRuleRepo::delete(&self.pool, id)
            .await
            .map_err(StoreError::from)?;
        Ok(deleted)
    }
}

impl LogStore for PgStore {
    async fn save(&self, record: &NewLogRecord) -> Result<LogRecord, BoxError> {
        Ok(self.save_log(record).await?)
    }
}
