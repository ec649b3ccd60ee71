//! Database row structs and their conversions into `devwatch_core` types.
//!
//! - `alert_rule`, `device_log`: `FromRow` rows with a fallible conversion
//!   (the stored level text is parsed back into `Level`). Inserts take the
//!   core `NewAlertRule` / `NewLogRecord` directly.
//! - `device`: a `FromRow` + `Serialize` row returned by the API as-is,
//!   plus the `CreateDevice` and `UpdateDeviceStatus` request DTOs.

pub mod alert_rule;
pub mod device;
pub mod device_log;
