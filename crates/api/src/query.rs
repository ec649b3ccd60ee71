//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Default page size for log listings.
const DEFAULT_LIMIT: i64 = 50;

/// Upper bound on any requested page size.
const MAX_LIMIT: i64 = 500;

/// `?limit=` for listing endpoints.
#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

impl LimitParams {
    /// Requested limit clamped to `1..=500`, defaulting to 50.
    pub fn clamped(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}
