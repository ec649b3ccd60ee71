//! Alert engine: matches a device against every alert rule and dispatches
//! a log record plus a notification for each rule at the device's level.
//!
//! Storage and delivery are reached through three capability traits
//! ([`AlertStore`], [`LogStore`], [`Notifier`]) so the engine itself holds
//! no state beyond its configuration and can be shared freely between
//! concurrent requests.
//!
//! Failure policy: the first failing store or notifier call aborts the
//! rest of the invocation and is returned to the caller. A record that was
//! already persisted stays persisted, even if its notification fails.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::alert::{
    classify_status, AlertRule, Device, Level, LogRecord, NewAlertRule, NewLogRecord,
    NotificationMessage,
};
use crate::error::CoreError;
use crate::types::DbId;

/// Boxed error returned by store and notifier implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// Durable storage for alert rules.
pub trait AlertStore: Send + Sync {
    /// Persist a new rule and return it with its generated identity.
    fn create(
        &self,
        rule: &NewAlertRule,
    ) -> impl Future<Output = Result<AlertRule, BoxError>> + Send;

    /// Every stored rule, in the store's own order.
    fn list_all(&self) -> impl Future<Output = Result<Vec<AlertRule>, BoxError>> + Send;

    /// Delete a rule. Returns `false` if no rule had that identity.
    fn delete_by_id(&self, id: DbId) -> impl Future<Output = Result<bool, BoxError>> + Send;
}

/// Append-only storage for log records.
pub trait LogStore: Send + Sync {
    fn save(
        &self,
        record: &NewLogRecord,
    ) -> impl Future<Output = Result<LogRecord, BoxError>> + Send;
}

/// Outbound notification delivery.
pub trait Notifier: Send + Sync {
    fn send(
        &self,
        message: &NotificationMessage,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors returned by [`AlertEngine`] operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Input rejected before reaching any store.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The alert store or log store failed.
    #[error("Persistence failure: {0}")]
    Persistence(#[source] BoxError),

    /// The notifier failed after the log record was persisted.
    #[error("Notification for log record {log_id} failed: {source}")]
    Notification {
        log_id: DbId,
        #[source]
        source: BoxError,
    },
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Static alerting configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AlertConfig {
    /// Address every alert notification is sent to.
    pub recipient: String,
}

/// Outcome of one evaluation of a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationReport {
    pub device_id: DbId,
    /// Level the device's status classified to.
    pub level: Level,
    /// Log records created, one per triggered rule, in rule order.
    pub log_ids: Vec<DbId>,
    /// Whether evaluation stopped early on cancellation.
    pub cancelled: bool,
}

impl EvaluationReport {
    /// Number of alerts triggered (persisted and notified).
    pub fn triggered(&self) -> usize {
        self.log_ids.len()
    }
}

/// Stateless alert orchestrator.
pub struct AlertEngine<A, L, N> {
    alerts: A,
    logs: L,
    notifier: N,
    config: AlertConfig,
}

impl<A, L, N> AlertEngine<A, L, N>
where
    A: AlertStore,
    L: LogStore,
    N: Notifier,
{
    pub fn new(alerts: A, logs: L, notifier: N, config: AlertConfig) -> Self {
        Self {
            alerts,
            logs,
            notifier,
            config,
        }
    }

    /// The notification channel this engine delivers through.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Evaluate every rule against `device` and dispatch each match.
    pub async fn evaluate(&self, device: &Device) -> Result<EvaluationReport, EngineError> {
        self.evaluate_until_cancelled(device, &CancellationToken::new())
            .await
    }

    /// Like [`evaluate`](Self::evaluate), but stops between rules once
    /// `cancel` fires. A rule already being dispatched always completes its
    /// notification attempt.
    pub async fn evaluate_until_cancelled(
        &self,
        device: &Device,
        cancel: &CancellationToken,
    ) -> Result<EvaluationReport, EngineError> {
        let rules = self
            .alerts
            .list_all()
            .await
            .map_err(EngineError::Persistence)?;
        let level = classify_status(&device.status);

        let mut report = EvaluationReport {
            device_id: device.id,
            level,
            log_ids: Vec::new(),
            cancelled: false,
        };

        for rule in rules.iter().filter(|rule| rule.level == level) {
            if cancel.is_cancelled() {
                tracing::info!(
                    device_id = device.id,
                    triggered = report.log_ids.len(),
                    "Alert evaluation cancelled"
                );
                report.cancelled = true;
                break;
            }
            let log_id = self.dispatch(device, rule).await?;
            report.log_ids.push(log_id);
        }

        tracing::debug!(
            device_id = device.id,
            status = %device.status,
            %level,
            rules = rules.len(),
            triggered = report.triggered(),
            "Evaluated alert rules"
        );
        Ok(report)
    }

    /// Persist the log record for one matched rule, then notify.
    async fn dispatch(&self, device: &Device, rule: &AlertRule) -> Result<DbId, EngineError> {
        let record = NewLogRecord::for_match(device, rule, Utc::now());
        let saved = self
            .logs
            .save(&record)
            .await
            .map_err(EngineError::Persistence)?;

        tracing::error!(
            device_id = device.id,
            rule_id = rule.id,
            log_id = saved.id,
            alert_message = %rule.message,
            "Triggering alert for device"
        );

        let message = NotificationMessage::for_alert(&self.config.recipient, device, rule);
        self.notifier
            .send(&message)
            .await
            .map_err(|source| EngineError::Notification {
                log_id: saved.id,
                source,
            })?;

        Ok(saved.id)
    }

    /// Validate and persist a new rule.
    pub async fn create_rule(&self, input: NewAlertRule) -> Result<AlertRule, EngineError> {
        input.validate()?;
        let rule = self
            .alerts
            .create(&input)
            .await
            .map_err(EngineError::Persistence)?;
        tracing::info!(rule_id = rule.id, level = %rule.level, "Alert rule created");
        Ok(rule)
    }

    /// All rules, in the store's order.
    pub async fn list_rules(&self) -> Result<Vec<AlertRule>, EngineError> {
        self.alerts
            .list_all()
            .await
            .map_err(EngineError::Persistence)
    }

    /// Delete a rule. An unknown id is not an error: returns `Ok(false)`.
    pub async fn delete_rule(&self, id: DbId) -> Result<bool, EngineError> {
        let deleted = self
            .alerts
            .delete_by_id(id)
            .await
            .map_err(EngineError::Persistence)?;
        if deleted {
            tracing::info!(rule_id = id, "Alert rule deleted");
        } else {
            tracing::debug!(rule_id = id, "Alert rule to delete was not found");
        }
        Ok(deleted)
    }
}

impl<A, L, N> AlertEngine<A, L, N>
where
    A: AlertStore + 'static,
    L: LogStore + 'static,
    N: Notifier + 'static,
{
    /// Run [`evaluate_until_cancelled`](Self::evaluate_until_cancelled) on
    /// its own task.
    ///
    /// Dropping the returned handle detaches the task instead of stopping
    /// it, so a caller that goes away mid-dispatch never leaves a saved
    /// record without its notification attempt. Only `cancel` ends the
    /// evaluation early.
    pub fn spawn_evaluation(
        self: &Arc<Self>,
        device: Device,
        cancel: CancellationToken,
    ) -> JoinHandle<Result<EvaluationReport, EngineError>> {
        let engine = Arc::clone(self);
        tokio::spawn(async move { engine.evaluate_until_cancelled(&device, &cancel).await })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use assert_matches::assert_matches;

    use super::*;
    use crate::alert::DeviceStatus;

    #[derive(Debug)]
    struct TestFailure(&'static str);

    impl std::fmt::Display for TestFailure {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.0)
        }
    }

    impl std::error::Error for TestFailure {}

    #[derive(Clone, Default)]
    struct MemoryRules {
        rules: Arc<Mutex<Vec<AlertRule>>>,
        next_id: Arc<Mutex<DbId>>,
        fail_list: bool,
    }

    impl AlertStore for MemoryRules {
        async fn create(&self, rule: &NewAlertRule) -> Result<AlertRule, BoxError> {
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            let created = AlertRule {
                id: *next_id,
                level: rule.level,
                message: rule.message.clone(),
                created_at: Utc::now(),
            };
            self.rules.lock().unwrap().push(created.clone());
            Ok(created)
        }

        async fn list_all(&self) -> Result<Vec<AlertRule>, BoxError> {
            if self.fail_list {
                return Err(Box::new(TestFailure("rule store unavailable")));
            }
            Ok(self.rules.lock().unwrap().clone())
        }

        async fn delete_by_id(&self, id: DbId) -> Result<bool, BoxError> {
            let mut rules = self.rules.lock().unwrap();
            let before = rules.len();
            rules.retain(|r| r.id != id);
            Ok(rules.len() < before)
        }
    }

    #[derive(Clone, Default)]
    struct MemoryLogs {
        records: Arc<Mutex<Vec<LogRecord>>>,
        /// Fail the save call with this zero-based index.
        fail_at: Option<usize>,
        /// Delay the acknowledgement after the record is stored.
        ack_delay: Option<Duration>,
    }

    impl LogStore for MemoryLogs {
        async fn save(&self, record: &NewLogRecord) -> Result<LogRecord, BoxError> {
            let saved = {
                let mut records = self.records.lock().unwrap();
                if self.fail_at == Some(records.len()) {
                    return Err(Box::new(TestFailure("log store write failed")));
                }
                let saved = LogRecord {
                    id: records.len() as DbId + 100,
                    device_id: record.device_id,
                    level: record.level,
                    message: record.message.clone(),
                    created_at: record.created_at,
                };
                records.push(saved.clone());
                saved
            };
            if let Some(delay) = self.ack_delay {
                tokio::time::sleep(delay).await;
            }
            Ok(saved)
        }
    }

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        sent: Arc<Mutex<Vec<NotificationMessage>>>,
        fail: bool,
        /// Cancel this token after the first send.
        cancel_after_send: Option<CancellationToken>,
    }

    impl Notifier for RecordingNotifier {
        async fn send(&self, message: &NotificationMessage) -> Result<(), BoxError> {
            if self.fail {
                return Err(Box::new(TestFailure("smtp relay refused")));
            }
            self.sent.lock().unwrap().push(message.clone());
            if let Some(token) = &self.cancel_after_send {
                token.cancel();
            }
            Ok(())
        }
    }

    type TestEngine = AlertEngine<MemoryRules, MemoryLogs, RecordingNotifier>;

    fn config() -> AlertConfig {
        AlertConfig {
            recipient: "noc@example.com".to_string(),
        }
    }

    fn engine(rules: &MemoryRules, logs: &MemoryLogs, notifier: &RecordingNotifier) -> TestEngine {
        AlertEngine::new(rules.clone(), logs.clone(), notifier.clone(), config())
    }

    fn device(status: DeviceStatus) -> Device {
        Device {
            id: 42,
            name: "edge-router".to_string(),
            status,
        }
    }

    async fn seed(rules: &MemoryRules, entries: &[(Level, &str)]) {
        for (level, message) in entries {
            rules
                .create(&NewAlertRule {
                    level: *level,
                    message: message.to_string(),
                })
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn failing_device_triggers_only_error_rules() {
        let (rules, logs, notifier) = Default::default();
        seed(&rules, &[(Level::Error, "Port flapping"), (Level::Critical, "Down")]).await;
        let engine = engine(&rules, &logs, &notifier);

        let report = engine.evaluate(&device(DeviceStatus::Failing)).await.unwrap();

        assert_eq!(report.level, Level::Error);
        assert_eq!(report.triggered(), 1);
        let records = logs.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Level::Error);
        assert_eq!(records[0].message, "Port flapping");
        assert_eq!(records[0].device_id, 42);

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, "noc@example.com");
        assert_eq!(sent[0].subject, "Alert for Device 42");
        assert_eq!(sent[0].body, "Alert message: Port flapping\nDevice: edge-router");
    }

    #[tokio::test]
    async fn active_device_without_normal_rules_triggers_nothing() {
        let (rules, logs, notifier) = Default::default();
        seed(&rules, &[(Level::Error, "a"), (Level::Critical, "b")]).await;
        let engine = engine(&rules, &logs, &notifier);

        let report = engine.evaluate(&device(DeviceStatus::Active)).await.unwrap();

        assert_eq!(report.level, Level::Normal);
        assert_eq!(report.triggered(), 0);
        assert!(logs.records.lock().unwrap().is_empty());
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn every_matching_rule_fires_in_store_order() {
        let (rules, logs, notifier) = Default::default();
        seed(
            &rules,
            &[
                (Level::Critical, "Offline"),
                (Level::Normal, "Heartbeat"),
                (Level::Critical, "Escalate to on-call"),
            ],
        )
        .await;
        let engine = engine(&rules, &logs, &notifier);

        let report = engine.evaluate(&device(DeviceStatus::Inactive)).await.unwrap();

        assert_eq!(report.triggered(), 2);
        let messages: Vec<_> = logs
            .records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.message.clone())
            .collect();
        assert_eq!(messages, vec!["Offline", "Escalate to on-call"]);
        assert_eq!(notifier.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_status_matches_normal_rules() {
        let (rules, logs, notifier) = Default::default();
        seed(&rules, &[(Level::Normal, "Status report")]).await;
        let engine = engine(&rules, &logs, &notifier);

        let report = engine
            .evaluate(&device(DeviceStatus::from("REBOOTING")))
            .await
            .unwrap();

        assert_eq!(report.level, Level::Normal);
        assert_eq!(report.triggered(), 1);
    }

    #[tokio::test]
    async fn log_failure_aborts_without_notifying() {
        let rules = MemoryRules::default();
        let logs = MemoryLogs {
            fail_at: Some(1),
            ..Default::default()
        };
        let notifier = RecordingNotifier::default();
        seed(
            &rules,
            &[(Level::Error, "one"), (Level::Error, "two"), (Level::Error, "three")],
        )
        .await;
        let engine = engine(&rules, &logs, &notifier);

        let result = engine.evaluate(&device(DeviceStatus::Failing)).await;

        assert_matches!(result, Err(EngineError::Persistence(_)));
        assert_eq!(logs.records.lock().unwrap().len(), 1);
        // Only the rule whose record was saved got a notification.
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn notifier_failure_keeps_persisted_record() {
        let rules = MemoryRules::default();
        let logs = MemoryLogs::default();
        let notifier = RecordingNotifier {
            fail: true,
            ..Default::default()
        };
        seed(&rules, &[(Level::Critical, "one"), (Level::Critical, "two")]).await;
        let engine = engine(&rules, &logs, &notifier);

        let result = engine.evaluate(&device(DeviceStatus::Inactive)).await;

        assert_matches!(result, Err(EngineError::Notification { log_id: 100, .. }));
        assert_eq!(logs.records.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rule_store_failure_is_reported() {
        let rules = MemoryRules {
            fail_list: true,
            ..Default::default()
        };
        let (logs, notifier) = Default::default();
        let engine = engine(&rules, &logs, &notifier);

        let result = engine.evaluate(&device(DeviceStatus::Failing)).await;
        assert_matches!(result, Err(EngineError::Persistence(_)));
    }

    #[tokio::test]
    async fn cancellation_stops_between_rules() {
        let token = CancellationToken::new();
        let rules = MemoryRules::default();
        let logs = MemoryLogs::default();
        let notifier = RecordingNotifier {
            cancel_after_send: Some(token.clone()),
            ..Default::default()
        };
        seed(&rules, &[(Level::Error, "first"), (Level::Error, "second")]).await;
        let engine = engine(&rules, &logs, &notifier);

        let report = engine
            .evaluate_until_cancelled(&device(DeviceStatus::Failing), &token)
            .await
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.triggered(), 1);
        assert_eq!(logs.records.lock().unwrap().len(), 1);
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn spawned_evaluation_finishes_dispatch_after_caller_gives_up() {
        let rules = MemoryRules::default();
        let logs = MemoryLogs {
            ack_delay: Some(Duration::from_millis(200)),
            ..Default::default()
        };
        let notifier = RecordingNotifier::default();
        seed(&rules, &[(Level::Error, "Link down")]).await;
        let engine = Arc::new(engine(&rules, &logs, &notifier));

        let handle =
            engine.spawn_evaluation(device(DeviceStatus::Failing), CancellationToken::new());
        let waited = tokio::time::timeout(Duration::from_millis(50), handle).await;
        assert!(waited.is_err());
        assert_eq!(logs.records.lock().unwrap().len(), 1);

        tokio::time::sleep(Duration::from_millis(400)).await;
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].body, "Alert message: Link down\nDevice: edge-router");
    }

    #[tokio::test]
    async fn spawned_evaluation_returns_report() {
        let (rules, logs, notifier) = Default::default();
        seed(&rules, &[(Level::Critical, "Offline")]).await;
        let engine = Arc::new(engine(&rules, &logs, &notifier));

        let report = engine
            .spawn_evaluation(device(DeviceStatus::Inactive), CancellationToken::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(report.level, Level::Critical);
        assert_eq!(report.log_ids, vec![100]);
    }

    #[tokio::test]
    async fn create_rule_assigns_fresh_ids() {
        let (rules, logs, notifier) = Default::default();
        let engine = engine(&rules, &logs, &notifier);

        let first = engine
            .create_rule(NewAlertRule {
                level: Level::Error,
                message: "CPU high".to_string(),
            })
            .await
            .unwrap();
        let second = engine
            .create_rule(NewAlertRule {
                level: Level::Critical,
                message: "Unreachable".to_string(),
            })
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        let listed = engine.list_rules().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed
            .iter()
            .any(|r| r.id == second.id && r.level == Level::Critical && r.message == "Unreachable"));
    }

    #[tokio::test]
    async fn create_rule_rejects_empty_message() {
        let (rules, logs, notifier) = Default::default();
        let engine = engine(&rules, &logs, &notifier);

        let result = engine
            .create_rule(NewAlertRule {
                level: Level::Normal,
                message: String::new(),
            })
            .await;

        assert_matches!(result, Err(EngineError::Core(CoreError::Validation(_))));
        assert!(rules.rules.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_rule_is_idempotent() {
        let (rules, logs, notifier) = Default::default();
        seed(&rules, &[(Level::Error, "gone soon")]).await;
        let engine = engine(&rules, &logs, &notifier);
        let id = engine.list_rules().await.unwrap()[0].id;

        assert!(engine.delete_rule(id).await.unwrap());
        assert!(!engine.delete_rule(id).await.unwrap());
        assert!(engine.list_rules().await.unwrap().iter().all(|r| r.id != id));
    }
}
