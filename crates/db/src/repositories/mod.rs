//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod alert_rule_repo;
pub mod device_log_repo;
pub mod device_repo;

pub use alert_rule_repo::AlertRuleRepo;
pub use device_log_repo::DeviceLogRepo;
pub use device_repo::DeviceRepo;
