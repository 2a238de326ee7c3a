//! Reconciliation of derived task status against persisted state.
//!
//! Tasks are stored with an advisory status. Each time the task list is
//! loaded, every task is run through the status resolver and the ones whose
//! stored status disagrees are collected for write-back.
//!
//! ## Usage
//! ```rust,ignore
//! use taskminder_core::task::reconciliation::ReconciliationEngine;
//!
//! let engine = ReconciliationEngine::new();
//! let pass = engine.reconcile(&tasks, now);
//! let report = engine.persist_writes(&store, &pass.writes).await;
//!
//! for failure in &report.failures {
//!     eprintln!("could not save '{}': {}", failure.id, failure.error);
//! }
//! ```
//!
//! The pass itself is pure; persistence happens afterwards, one independent
//! update per changed task, so a failing write never blocks the others.

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use serde::{Deserialize, Deserializer, Serialize};

use super::status::{resolve_with_grace, DEFAULT_OVERDUE_GRACE_HOURS};
use super::{Task, TaskPatch, TaskStatus};
use crate::error::TransportError;
use crate::store::TaskStore;

/// Maximum grace window allowed (30 days).
pub const MAX_OVERDUE_GRACE_HOURS: i64 = 720;

/// Minimum grace window allowed.
pub const MIN_OVERDUE_GRACE_HOURS: i64 = 1;

/// Configuration for reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    /// Hours past due after which a non-completed task is marked Failed.
    /// Default: 24
    #[serde(
        default = "default_overdue_grace_hours",
        deserialize_with = "deserialize_overdue_grace_hours"
    )]
    pub overdue_grace_hours: i64,
}

fn default_overdue_grace_hours() -> i64 {
    DEFAULT_OVERDUE_GRACE_HOURS
}

fn clamp_overdue_grace_hours(hours: i64) -> i64 {
    hours.clamp(MIN_OVERDUE_GRACE_HOURS, MAX_OVERDUE_GRACE_HOURS)
}

fn deserialize_overdue_grace_hours<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    i64::deserialize(deserializer).map(clamp_overdue_grace_hours)
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            overdue_grace_hours: DEFAULT_OVERDUE_GRACE_HOURS,
        }
    }
}

impl ReconciliationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grace window in hours.
    pub fn with_overdue_grace(mut self, hours: i64) -> Self {
        self.overdue_grace_hours = clamp_overdue_grace_hours(hours);
        self
    }

    /// Grace window as a Duration.
    pub fn overdue_grace(&self) -> Duration {
        Duration::hours(self.overdue_grace_hours)
    }
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Every input task with its derived status, same length and order.
    pub resolved: Vec<Task>,
    /// Only the tasks whose status changed and must be persisted.
    pub writes: Vec<Task>,
    /// Evaluation instant.
    pub reconciled_at: DateTime<Utc>,
}

impl Reconciliation {
    pub fn has_writes(&self) -> bool {
        !self.writes.is_empty()
    }

    pub fn summary(&self) -> ReconciliationSummary {
        let count = |status: TaskStatus| self.resolved.iter().filter(|t| t.status == status).count();
        ReconciliationSummary {
            total: self.resolved.len(),
            pending: count(TaskStatus::Pending),
            done: count(TaskStatus::Done),
            failed: count(TaskStatus::Failed),
            changed: self.writes.len(),
            reconciled_at: self.reconciled_at,
        }
    }
}

/// Counts over a reconciled task set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReconciliationSummary {
    pub total: usize,
    pub pending: usize,
    pub done: usize,
    pub failed: usize,
    /// Number of tasks whose status changed in this pass.
    pub changed: usize,
    pub reconciled_at: DateTime<Utc>,
}

impl ReconciliationSummary {
    /// Human-readable summary message.
    pub fn message(&self) -> String {
        if self.total == 0 {
            "No tasks found.".to_string()
        } else if self.changed == 0 {
            format!("All {} task(s) up to date.", self.total)
        } else {
            format!(
                "Updated status of {} of {} task(s).",
                self.changed, self.total
            )
        }
    }
}

/// A write that could not be persisted.
#[derive(Debug)]
pub struct WriteFailure {
    pub id: String,
    pub status: TaskStatus,
    pub error: TransportError,
}

/// Per-item outcome of persisting a reconciliation's writes.
#[derive(Debug, Default)]
pub struct WriteBackReport {
    /// Ids persisted successfully, in write order.
    pub written: Vec<String>,
    pub failures: Vec<WriteFailure>,
}

impl WriteBackReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_ids(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.id.as_str()).collect()
    }
}

/// Engine deriving task status and syncing it back to a store.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationEngine {
    config: ReconciliationConfig,
}

impl ReconciliationEngine {
    /// Create a reconciliation engine with the default 24 hour grace window.
    pub fn new() -> Self {
        Self::default()
    }

    /// The grace window is clamped even if the field was set directly.
    pub fn with_config(config: ReconciliationConfig) -> Self {
        Self {
            config: ReconciliationConfig::new().with_overdue_grace(config.overdue_grace_hours),
        }
    }

    pub fn config(&self) -> &ReconciliationConfig {
        &self.config
    }

    /// Status a task should have at `now`.
    pub fn resolve(&self, task: &Task, now: DateTime<Utc>) -> TaskStatus {
        resolve_with_grace(task, now, self.config.overdue_grace())
    }

    /// Run one pure reconciliation pass.
    ///
    /// The input is not modified. The caller persists `writes`.
    pub fn reconcile(&self, tasks: &[Task], now: DateTime<Utc>) -> Reconciliation {
        let mut resolved = Vec::with_capacity(tasks.len());
        let mut writes = Vec::new();

        for task in tasks {
            let status = self.resolve(task, now);
            if status == task.status {
                resolved.push(task.clone());
                continue;
            }

            tracing::debug!(
                task_id = %task.id,
                from = %task.status,
                to = %status,
                "task status changed"
            );
            let updated = task.with_status(status);
            writes.push(updated.clone());
            resolved.push(updated);
        }

        Reconciliation {
            resolved,
            writes,
            reconciled_at: now,
        }
    }

    /// Persist each write as an independent status update.
    ///
    /// Updates are issued concurrently; a failure is recorded for that task
    /// and does not stop the remaining writes.
    pub async fn persist_writes<S>(&self, store: &S, writes: &[Task]) -> WriteBackReport
    where
        S: TaskStore + ?Sized,
    {
        let results = join_all(writes.iter().map(|task| async move {
            let patch = TaskPatch::status(task.status);
            (task, store.update(&task.id, &patch).await)
        }))
        .await;

        let mut report = WriteBackReport::default();
        for (task, result) in results {
            match result {
                Ok(_) => report.written.push(task.id.clone()),
                Err(error) => {
                    tracing::warn!(task_id = %task.id, %error, "failed to persist derived status");
                    report.failures.push(WriteFailure {
                        id: task.id.clone(),
                        status: task.status,
                        error,
                    });
                }
            }
        }
        report
    }

    /// Fetch, reconcile and persist in one go.
    ///
    /// Only a failed fetch is returned as an error; write failures are in
    /// the report.
    pub async fn reconcile_store<S>(
        &self,
        store: &S,
        now: DateTime<Utc>,
    ) -> Result<(Reconciliation, WriteBackReport), TransportError>
    where
        S: TaskStore + ?Sized,
    {
        let tasks = store.fetch_all().await?;
        let pass = self.reconcile(&tasks, now);
        let report = self.persist_writes(store, &pass.writes).await;

        tracing::info!(
            total = pass.resolved.len(),
            changed = pass.writes.len(),
            failed_writes = report.failures.len(),
            "reconciliation finished"
        );
        Ok((pass, report))
    }
}

/// Reconcile with the default configuration.
pub fn reconcile(tasks: &[Task], now: DateTime<Utc>) -> Reconciliation {
    ReconciliationEngine::new().reconcile(tasks, now)
}
