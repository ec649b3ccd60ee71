//! Request handlers.
//!
//! Alert rule operations go through the shared alert engine; device and log
//! reads go straight to the repositories in `devwatch_db`. Errors are mapped
//! via [`AppError`](crate::error::AppError).

pub mod alerts;
pub mod devices;
pub mod logs;
