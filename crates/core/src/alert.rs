//! Alert rule, device, and log record types plus the status classifier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Maximum length of an alert rule message, in characters.
pub const MAX_MESSAGE_LEN: usize = 1000;

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// Severity level shared by alert rules and log records.
///
/// Serializes as the uppercase name; parsing accepts any case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Level {
    Normal,
    Error,
    Critical,
}

impl Level {
    /// Canonical text form, as stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NORMAL" => Ok(Self::Normal),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" => Ok(Self::Critical),
            other => Err(CoreError::Validation(format!(
                "Unknown alert level '{other}', expected one of NORMAL, ERROR, CRITICAL"
            ))),
        }
    }
}

impl TryFrom<String> for Level {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, <Level as TryFrom<String>>::Error> {
        s.parse()
    }
}

// ---------------------------------------------------------------------------
// DeviceStatus
// ---------------------------------------------------------------------------

/// Operational status reported by the monitoring side for a device.
///
/// Statuses this crate does not know about are kept verbatim in
/// [`DeviceStatus::Unknown`] instead of being rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeviceStatus {
    Active,
    Failing,
    Inactive,
    Unknown(String),
}

impl DeviceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "ACTIVE",
            Self::Failing => "FAILING",
            Self::Inactive => "INACTIVE",
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<&str> for DeviceStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Self::Active,
            "FAILING" => Self::Failing,
            "INACTIVE" => Self::Inactive,
            _ => Self::Unknown(s.to_string()),
        }
    }
}

impl From<String> for DeviceStatus {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<DeviceStatus> for String {
    fn from(status: DeviceStatus) -> Self {
        match status {
            DeviceStatus::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a device status onto the severity level alert rules are matched on.
///
/// Total: anything that is neither failing nor inactive is `Normal`.
pub fn classify_status(status: &DeviceStatus) -> Level {
    match status {
        DeviceStatus::Failing => Level::Error,
        DeviceStatus::Inactive => Level::Critical,
        _ => Level::Normal,
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A monitored device. Owned by the monitoring side; alerting only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DbId,
    pub name: String,
    pub status: DeviceStatus,
}

/// A persisted (level, message) pair that fires when a device classifies
/// to the same level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertRule {
    pub id: DbId,
    pub level: Level,
    pub message: String,
    pub created_at: Timestamp,
}

/// Input for creating an alert rule. The store assigns the identity.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAlertRule {
    pub level: Level,
    pub message: String,
}

impl NewAlertRule {
    /// Reject blank or oversized messages.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.message.trim().is_empty() {
            return Err(CoreError::Validation(
                "Alert message must not be empty".to_string(),
            ));
        }
        let len = self.message.chars().count();
        if len > MAX_MESSAGE_LEN {
            return Err(CoreError::Validation(format!(
                "Alert message is {len} characters, maximum is {MAX_MESSAGE_LEN}"
            )));
        }
        Ok(())
    }
}

/// A log record that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLogRecord {
    pub device_id: DbId,
    pub level: Level,
    pub message: String,
    pub created_at: Timestamp,
}

impl NewLogRecord {
    /// Build the record written when `rule` matched `device`.
    pub fn for_match(device: &Device, rule: &AlertRule, now: Timestamp) -> Self {
        Self {
            device_id: device.id,
            level: rule.level,
            message: rule.message.clone(),
            created_at: now,
        }
    }
}

/// A persisted log record. Never updated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    pub id: DbId,
    pub device_id: DbId,
    pub level: Level,
    pub message: String,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// NotificationMessage
// ---------------------------------------------------------------------------

/// An outbound notification. Built per dispatch, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl NotificationMessage {
    /// Format the notification for a rule that matched a device.
    pub fn for_alert(recipient: &str, device: &Device, rule: &AlertRule) -> Self {
        Self {
            recipient: recipient.to_string(),
            subject: format!("Alert for Device {}", device.id),
            body: format!("Alert message: {}\nDevice: {}", rule.message, device.name),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
