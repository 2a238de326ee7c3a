//! Reminder scheduler bound to a notification port.

use chrono::{DateTime, Utc};
use futures::future::join_all;

use super::{
    plan, NotificationPort, PermissionStatus, ReminderFailure, ReminderOffset, ReminderPayload,
    ReminderPlan, ScheduledReminder, ScheduledSet, SchedulingOutcome, DEFAULT_CATALOG,
};
use crate::error::NotificationError;
use crate::task::Task;

/// Schedules catalog reminders through a [`NotificationPort`].
///
/// Permission is requested once, in [`ReminderScheduler::register`], and the
/// answer is kept for the scheduler's lifetime.
pub struct ReminderScheduler<N> {
    port: N,
    catalog: Vec<ReminderOffset>,
    outcome: SchedulingOutcome,
}

impl<N: NotificationPort> ReminderScheduler<N> {
    /// Register with the port, asking for notification permission.
    pub async fn register(port: N) -> Self {
        let outcome = match port.request_permission().await {
            Ok(PermissionStatus::Granted) => SchedulingOutcome::Scheduled,
            Ok(PermissionStatus::Denied) => SchedulingOutcome::PermissionDenied,
            Ok(PermissionStatus::Unavailable) => SchedulingOutcome::Unavailable,
            Err(error) => {
                tracing::warn!(%error, "notification permission request failed");
                SchedulingOutcome::Unavailable
            }
        };

        if outcome != SchedulingOutcome::Scheduled {
            tracing::info!(?outcome, "reminders will not be scheduled");
        }

        Self {
            port,
            catalog: DEFAULT_CATALOG.to_vec(),
            outcome,
        }
    }

    /// A scheduler that never touches the port.
    pub fn disabled(port: N) -> Self {
        Self {
            port,
            catalog: DEFAULT_CATALOG.to_vec(),
            outcome: SchedulingOutcome::Disabled,
        }
    }

    /// Replace the reminder catalog.
    pub fn with_catalog(mut self, catalog: Vec<ReminderOffset>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn port(&self) -> &N {
        &self.port
    }

    pub fn catalog(&self) -> &[ReminderOffset] {
        &self.catalog
    }

    /// Whether reminders will actually reach the port.
    pub fn is_active(&self) -> bool {
        self.outcome == SchedulingOutcome::Scheduled
    }

    /// Reminders that would be scheduled for `task` at `now`.
    pub fn plan(&self, task: &Task, now: DateTime<Utc>) -> ReminderPlan {
        plan(task, &self.catalog, now)
    }

    /// Schedule every catalog reminder still ahead of `now`.
    ///
    /// Does not cancel existing reminders; see [`ReminderScheduler::reschedule`].
    pub async fn schedule(&self, task: &Task, now: DateTime<Utc>) -> ScheduledSet {
        if !self.is_active() {
            return ScheduledSet::empty(task.id.clone(), self.outcome);
        }

        let plan = self.plan(task, now);
        let results = join_all(plan.entries.iter().map(|entry| async move {
            let payload = ReminderPayload::for_task(task, &entry.offset);
            (entry, self.port.schedule_one_shot(entry.fire_at, &payload).await)
        }))
        .await;

        let mut set = ScheduledSet::empty(task.id.clone(), SchedulingOutcome::Scheduled);
        for (entry, result) in results {
            match result {
                Ok(()) => set.entries.push(ScheduledReminder {
                    label: entry.offset.label.to_string(),
                    fire_at: entry.fire_at,
                }),
                Err(error) => {
                    tracing::warn!(task_id = %task.id, label = entry.offset.label, %error, "reminder not scheduled");
                    set.failures.push(ReminderFailure {
                        label: entry.offset.label.to_string(),
                        fire_at: entry.fire_at,
                        error,
                    });
                }
            }
        }

        tracing::info!(
            task_id = %task.id,
            scheduled = set.entries.len(),
            failed = set.failures.len(),
            "reminders scheduled"
        );
        set
    }

    /// Cancel existing reminders for the task, then schedule afresh.
    ///
    /// Cancellation always reaches the port, so reminders queued before the
    /// scheduler was disabled are still removed. If cancellation fails
    /// nothing new is scheduled.
    pub async fn reschedule(
        &self,
        task: &Task,
        now: DateTime<Utc>,
    ) -> Result<ScheduledSet, NotificationError> {
        let cancelled = self.port.cancel_for_task(&task.id).await?;
        tracing::debug!(task_id = %task.id, cancelled, "cancelled previous reminders");
        Ok(self.schedule(task, now).await)
    }

    /// Cancel every reminder for a task, whatever the scheduling outcome.
    pub async fn cancel(&self, task_id: &str) -> Result<usize, NotificationError> {
        self.port.cancel_for_task(task_id).await
    }
}
