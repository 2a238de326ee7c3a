//! User-facing task flows.
//!
//! [`TaskService`] ties the task store, the reconciliation engine and the
//! reminder scheduler together:
//!
//! - `load`: fetch, reconcile and write back derived status
//! - `add_task`: validate, create as Pending, schedule reminders
//! - `update_task`: validate, reset to Pending, cancel-then-schedule reminders
//! - `toggle_complete`: Pending <-> Done (Failed tasks are locked)
//! - `delete_task`: delete, then cancel reminders
//!
//! Explicit actions return errors to the caller. Background write-back
//! failures during `load` only show up in the returned report.

use chrono::{DateTime, Utc};

use crate::error::{Result, ValidationError};
use crate::reminder::{NotificationPort, ReminderScheduler, ScheduledSet, SchedulingOutcome};
use crate::store::TaskStore;
use crate::task::reconciliation::{Reconciliation, ReconciliationEngine, WriteBackReport};
use crate::task::{NewTask, Task, TaskPatch, TaskStatus};

/// Edits a user may make to an existing task.
///
/// There is no status field: status changes go through
/// [`TaskService::toggle_complete`] or reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskEdit {
    fn into_patch(self) -> TaskPatch {
        TaskPatch {
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            status: Some(TaskStatus::Pending),
        }
    }
}

/// A task after an explicit change, with its reminders.
#[derive(Debug)]
pub struct TaskChange {
    pub task: Task,
    pub reminders: ScheduledSet,
}

/// Result of loading the task list.
#[derive(Debug)]
pub struct LoadedTasks {
    pub reconciliation: Reconciliation,
    pub report: WriteBackReport,
}

impl LoadedTasks {
    /// The reconciled task set.
    pub fn tasks(&self) -> &[Task] {
        &self.reconciliation.resolved
    }
}

/// Task store + reconciliation + reminders.
pub struct TaskService<S, N> {
    store: S,
    reminders: ReminderScheduler<N>,
    engine: ReconciliationEngine,
}

impl<S: TaskStore, N: NotificationPort> TaskService<S, N> {
    pub fn new(store: S, reminders: ReminderScheduler<N>) -> Self {
        Self {
            store,
            reminders,
            engine: ReconciliationEngine::new(),
        }
    }

    pub fn with_engine(mut self, engine: ReconciliationEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn reminders(&self) -> &ReminderScheduler<N> {
        &self.reminders
    }

    pub fn engine(&self) -> &ReconciliationEngine {
        &self.engine
    }

    /// Fetch all tasks, reconcile them and persist status changes.
    ///
    /// # Errors
    ///
    /// Fails only if the task list itself cannot be fetched.
    pub async fn load(&self, now: DateTime<Utc>) -> Result<LoadedTasks> {
        let (reconciliation, report) = self.engine.reconcile_store(&self.store, now).await?;
        Ok(LoadedTasks {
            reconciliation,
            report,
        })
    }

    /// Create a task and schedule its reminders.
    pub async fn add_task(&self, draft: NewTask, now: DateTime<Utc>) -> Result<TaskChange> {
        draft.validate(now)?;

        let task = self.store.create(draft).await?;
        tracing::info!(task_id = %task.id, due = %task.due_date, "task created");

        let reminders = self.reminders.schedule(&task, now).await;
        Ok(TaskChange { task, reminders })
    }

    /// Apply user edits, reset the task to Pending and replace its reminders.
    pub async fn update_task(
        &self,
        id: &str,
        edit: TaskEdit,
        now: DateTime<Utc>,
    ) -> Result<TaskChange> {
        let patch = edit.into_patch();
        patch.validate(now)?;

        let task = self.store.update(id, &patch).await?;
        tracing::info!(task_id = %task.id, "task updated");

        let reminders = match self.reminders.reschedule(&task, now).await {
            Ok(set) => set,
            Err(error) => {
                tracing::warn!(task_id = %task.id, %error, "could not replace reminders");
                ScheduledSet::empty(task.id.clone(), SchedulingOutcome::CancelFailed)
            }
        };
        Ok(TaskChange { task, reminders })
    }

    /// Flip a task between Pending and Done.
    ///
    /// `current` is the caller's reconciled task set; the derived status there
    /// decides the transition.
    pub async fn toggle_complete(&self, id: &str, current: &[Task]) -> Result<Task> {
        let task = current
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| ValidationError::UnknownTask { id: id.to_string() })?;

        let next = match task.status {
            TaskStatus::Pending => TaskStatus::Done,
            TaskStatus::Done => TaskStatus::Pending,
            TaskStatus::Failed => {
                return Err(ValidationError::TaskLocked { id: id.to_string() }.into());
            }
        };

        let updated = self.store.update(id, &TaskPatch::status(next)).await?;
        tracing::info!(task_id = %id, status = %next, "task toggled");
        Ok(updated)
    }

    /// Delete a task and cancel its reminders.
    pub async fn delete_task(&self, id: &str) -> Result<()> {
        self.store.delete(id).await?;
        tracing::info!(task_id = %id, "task deleted");

        if let Err(error) = self.reminders.cancel(id).await {
            tracing::warn!(task_id = %id, %error, "could not cancel reminders for deleted task");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, NotificationError};
    use crate::reminder::{PermissionStatus, ReminderPayload};
    use crate::store::InMemoryTaskStore;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingPort {
        scheduled: Mutex<Vec<String>>,
        cancelled: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NotificationPort for CountingPort {
        async fn request_permission(&self) -> Result<PermissionStatus, NotificationError> {
            Ok(PermissionStatus::Granted)
        }

        async fn schedule_one_shot(
            &self,
            _fire_at: DateTime<Utc>,
            payload: &ReminderPayload,
        ) -> Result<(), NotificationError> {
            self.scheduled.lock().unwrap().push(payload.task_id.clone());
            Ok(())
        }

        async fn cancel_for_task(&self, task_id: &str) -> Result<usize, NotificationError> {
            let mut scheduled = self.scheduled.lock().unwrap();
            let before = scheduled.len();
            scheduled.retain(|id| id != task_id);
            self.cancelled.lock().unwrap().push(task_id.to_string());
            Ok(before - scheduled.len())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    async fn service() -> TaskService<InMemoryTaskStore, CountingPort> {
        let reminders = ReminderScheduler::register(CountingPort::default()).await;
        TaskService::new(InMemoryTaskStore::new(), reminders)
    }

    #[tokio::test]
    async fn add_task_creates_pending_and_schedules() {
        let svc = service().await;
        let change = svc
            .add_task(
                NewTask::new("Report", "Q2 numbers", now() + Duration::hours(20)),
                now(),
            )
            .await
            .unwrap();

        assert_eq!(change.task.status, TaskStatus::Pending);
        assert_eq!(change.reminders.len(), 3);
        assert_eq!(svc.store().snapshot().len(), 1);
    }

    #[tokio::test]
    async fn add_task_rejects_empty_title_without_touching_store() {
        let svc = service().await;
        let err = svc
            .add_task(NewTask::new(" ", "desc", now() + Duration::hours(1)), now())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::EmptyField { field: "title" })
        ));
        assert!(svc.store().snapshot().is_empty());
    }

    #[tokio::test]
    async fn update_resets_to_pending_and_replaces_reminders() {
        let svc = service().await;
        let created = svc
            .add_task(NewTask::new("a", "b", now() + Duration::hours(20)), now())
            .await
            .unwrap()
            .task;
        svc.toggle_complete(&created.id, &[created.clone()]).await.unwrap();

        let change = svc
            .update_task(
                &created.id,
                TaskEdit {
                    due_date: Some(now() + Duration::hours(5)),
                    ..TaskEdit::default()
                },
                now(),
            )
            .await
            .unwrap();

        assert_eq!(change.task.status, TaskStatus::Pending);
        assert_eq!(change.reminders.labels(), vec!["1 hour", "10 minutes"]);
        let port = svc.reminders().port();
        assert_eq!(port.scheduled.lock().unwrap().len(), 2);
        assert_eq!(port.cancelled.lock().unwrap().as_slice(), &[created.id.clone()]);
    }

    #[tokio::test]
    async fn update_rejects_past_due_date() {
        let svc = service().await;
        let err = svc
            .update_task(
                "any",
                TaskEdit {
                    due_date: Some(now() - Duration::hours(1)),
                    ..TaskEdit::default()
                },
                now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::DueDateInPast { .. })
        ));
    }

    #[tokio::test]
    async fn toggle_flips_between_pending_and_done() {
        let svc = service().await;
        let task = svc
            .add_task(NewTask::new("a", "b", now() + Duration::hours(2)), now())
            .await
            .unwrap()
            .task;

        let done = svc.toggle_complete(&task.id, &[task.clone()]).await.unwrap();
        assert_eq!(done.status, TaskStatus::Done);

        let reopened = svc.toggle_complete(&task.id, &[done]).await.unwrap();
        assert_eq!(reopened.status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn toggle_refuses_failed_tasks() {
        let svc = service().await;
        let failed = Task {
            id: "x".into(),
            title: "a".into(),
            description: "b".into(),
            due_date: now() - Duration::hours(48),
            status: TaskStatus::Failed,
        };

        let err = svc.toggle_complete("x", &[failed]).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::TaskLocked { .. })
        ));

        let err = svc.toggle_complete("missing", &[]).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::UnknownTask { .. })
        ));
    }

    #[tokio::test]
    async fn load_reconciles_and_writes_back() {
        let svc = service().await;
        let task = svc
            .add_task(NewTask::new("a", "b", now() + Duration::hours(1)), now())
            .await
            .unwrap()
            .task;

        let later = now() + Duration::hours(30);
        let loaded = svc.load(later).await.unwrap();

        assert_eq!(loaded.tasks()[0].status, TaskStatus::Failed);
        assert_eq!(loaded.report.written, vec![task.id]);
        assert_eq!(svc.store().snapshot()[0].status, TaskStatus::Failed);
    }

    #[tokio::test]
    async fn delete_cancels_reminders() {
        let svc = service().await;
        let task = svc
            .add_task(NewTask::new("a", "b", now() + Duration::hours(20)), now())
            .await
            .unwrap()
            .task;

        svc.delete_task(&task.id).await.unwrap();

        assert!(svc.store().snapshot().is_empty());
        assert!(svc.reminders().port().scheduled.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_clears_reminders_queued_before_disabling() {
        let store = InMemoryTaskStore::new();
        let task = store
            .create(NewTask::new("a", "b", now() + Duration::hours(20)))
            .await
            .unwrap();
        let port = CountingPort::default();
        port.scheduled
            .lock()
            .unwrap()
            .extend([task.id.clone(), task.id.clone()]);

        let svc = TaskService::new(store, ReminderScheduler::disabled(port));
        svc.delete_task(&task.id).await.unwrap();

        let port = svc.reminders().port();
        assert!(port.scheduled.lock().unwrap().is_empty());
        assert_eq!(port.cancelled.lock().unwrap().as_slice(), &[task.id]);
    }

    #[tokio::test]
    async fn update_clears_reminders_queued_before_disabling() {
        let store = InMemoryTaskStore::new();
        let task = store
            .create(NewTask::new("a", "b", now() + Duration::hours(20)))
            .await
            .unwrap();
        let port = CountingPort::default();
        port.scheduled.lock().unwrap().push(task.id.clone());

        let svc = TaskService::new(store, ReminderScheduler::disabled(port));
        let change = svc
            .update_task(
                &task.id,
                TaskEdit {
                    title: Some("renamed".into()),
                    ..TaskEdit::default()
                },
                now(),
            )
            .await
            .unwrap();

        assert_eq!(change.reminders.outcome, SchedulingOutcome::Disabled);
        assert!(svc.reminders().port().scheduled.lock().unwrap().is_empty());
    }
}
