//! Alert rule entity model.

use devwatch_core::alert::{AlertRule, Level};
use devwatch_core::error::CoreError;
use devwatch_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `alert_rules` table.
#[derive(Debug, Clone, FromRow)]
pub struct AlertRuleRow {
    pub id: DbId,
    pub level: String,
    pub message: String,
    pub created_at: Timestamp,
}

impl TryFrom<AlertRuleRow> for AlertRule {
    type Error = CoreError;

    fn try_from(row: AlertRuleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            level: row.level.parse::<Level>()?,
            message: row.message,
            created_at: row.created_at,
        })
    }
}
