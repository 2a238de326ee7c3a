//! Status resolution.
//!
//! Pure functions computing the status a task *should* have at a given
//! instant. `Done` is sticky; everything else is derived from how far past
//! its due date the task is.

use chrono::{DateTime, Duration, Utc};

use super::{Task, TaskStatus};

/// Hours past due after which a non-completed task becomes `Failed`.
pub const DEFAULT_OVERDUE_GRACE_HOURS: i64 = 24;

/// Default grace window as a Duration.
pub fn default_grace() -> Duration {
    Duration::hours(DEFAULT_OVERDUE_GRACE_HOURS)
}

/// Resolve a task's status with the default 24 hour grace window.
pub fn resolve(task: &Task, now: DateTime<Utc>) -> TaskStatus {
    resolve_with_grace(task, now, default_grace())
}

/// Resolve a task's status with a custom grace window.
///
/// The threshold is strict: a task exactly `grace` past due is still
/// `Pending`.
pub fn resolve_with_grace(task: &Task, now: DateTime<Utc>, grace: Duration) -> TaskStatus {
    if task.status == TaskStatus::Done {
        return TaskStatus::Done;
    }

    if overdue_by(task, now) > grace {
        TaskStatus::Failed
    } else {
        TaskStatus::Pending
    }
}

/// How long the task has been past due (negative if not yet due).
pub fn overdue_by(task: &Task, now: DateTime<Utc>) -> Duration {
    now.signed_duration_since(task.due_date)
}
