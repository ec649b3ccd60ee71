//! Alert notification delivery.
//!
//! - [`delivery::email`] — SMTP delivery through `lettre`.
//! - [`MailNotifier`] — the [`Notifier`](devwatch_core::engine::Notifier)
//!   handed to the alert engine, either backed by SMTP or disabled when no
//!   mail server is configured.

pub mod delivery;
pub mod notifier;

pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use notifier::MailNotifier;
