//! Device alerting domain.
//!
//! Holds the data model shared by every other crate in the workspace, the
//! status classifier, and the [`engine::AlertEngine`] that matches devices
//! against alert rules. Nothing in here talks to a database or an SMTP
//! server directly; those live behind the capability traits in [`engine`].

pub mod alert;
pub mod engine;
pub mod error;
pub mod types;
