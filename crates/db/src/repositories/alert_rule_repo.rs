//! Repository for the `alert_rules` table.

use devwatch_core::alert::NewAlertRule;
use devwatch_core::types::DbId;
use sqlx::PgPool;

use crate::models::alert_rule::AlertRuleRow;

/// Column list for `alert_rules` queries.
const COLUMNS: &str = "id, level, message, created_at";

/// Provides CRUD operations for alert rules.
pub struct AlertRuleRepo;

impl AlertRuleRepo {
    /// Insert a new rule, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewAlertRule) -> Result<AlertRuleRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO alert_rules (level, message) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AlertRuleRow>(&query)
            .bind(input.level.as_str())
            .bind(&input.message)
            .fetch_one(pool)
            .await
    }

    /// List all rules, oldest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<AlertRuleRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM alert_rules ORDER BY id");
        sqlx::query_as::<_, AlertRuleRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Get a single rule by ID.
    pub async fn get_by_id(pool: &PgPool, id: DbId) -> Result<Option<AlertRuleRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM alert_rules WHERE id = $1");
        sqlx::query_as::<_, AlertRuleRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a rule by ID. Returns true if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM alert_rules WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
