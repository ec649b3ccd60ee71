//! The notifier wired into the alert engine.

use devwatch_core::alert::NotificationMessage;
use devwatch_core::engine::{BoxError, Notifier};

use crate::delivery::email::{EmailConfig, EmailDelivery, EmailError};

/// Notification channel selected at startup.
pub enum MailNotifier {
    /// Deliver over SMTP.
    Smtp(EmailDelivery),
    /// No SMTP server configured; alerts are only logged.
    Disabled,
}

impl MailNotifier {
    /// Pick SMTP delivery when configured, otherwise the disabled notifier.
    pub fn from_config(config: Option<EmailConfig>) -> Result<Self, EmailError> {
        match config {
            Some(config) => Ok(Self::Smtp(EmailDelivery::new(config)?)),
            None => Ok(Self::Disabled),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Smtp(_))
    }
}

impl Notifier for MailNotifier {
    async fn send(&self, message: &NotificationMessage) -> Result<(), BoxError> {
        match self {
            Self::Smtp(delivery) => Ok(delivery.send(message).await?),
            Self::Disabled => {
                tracing::warn!(
                    to = %message.recipient,
                    subject = %message.subject,
                    "SMTP not configured, alert email not sent"
                );
                Ok(())
            }
        }
    }
}
