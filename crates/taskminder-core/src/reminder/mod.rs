//! Local reminders ahead of a task's due date.
//!
//! A fixed catalog of lead times is evaluated against the due instant; every
//! entry whose fire time is still in the future becomes one one-shot
//! notification. Elapsed entries are simply left out.
//!
//! Delivery is not handled here. [`NotificationPort`] is the boundary to
//! whatever platform service actually shows the notification.

mod scheduler;

pub use scheduler::ReminderScheduler;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::NotificationError;
use crate::task::Task;

/// Title used on every reminder notification.
pub const REMINDER_TITLE: &str = "Upcoming Task Reminder";

/// One lead time before the due instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReminderOffset {
    /// Human-readable label used in the notification body
    pub label: &'static str,
    /// Lead time in minutes
    pub lead_minutes: i64,
}

impl ReminderOffset {
    pub fn lead(&self) -> Duration {
        Duration::minutes(self.lead_minutes)
    }
}

/// Default reminder catalog.
///
/// NOTE: the "10 minutes" entry fires 15 minutes before due. Label and lead
/// are kept as shipped until the intended value is confirmed.
pub const DEFAULT_CATALOG: &[ReminderOffset] = &[
    ReminderOffset {
        label: "10 hours",
        lead_minutes: 10 * 60,
    },
    ReminderOffset {
        label: "1 hour",
        lead_minutes: 60,
    },
    ReminderOffset {
        label: "10 minutes",
        lead_minutes: 15,
    },
];

/// A catalog entry that is still due to fire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedReminder {
    pub offset: ReminderOffset,
    pub fire_at: DateTime<Utc>,
}

/// Reminders still in the future for one task. Recomputed on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderPlan {
    pub task_id: String,
    pub entries: Vec<PlannedReminder>,
}

impl ReminderPlan {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compute which catalog entries still lie ahead of `now`.
pub fn plan(task: &Task, catalog: &[ReminderOffset], now: DateTime<Utc>) -> ReminderPlan {
    let entries = catalog
        .iter()
        .filter_map(|offset| {
            let fire_at = task.due_date - offset.lead();
            (fire_at > now).then_some(PlannedReminder {
                offset: *offset,
                fire_at,
            })
        })
        .collect();

    ReminderPlan {
        task_id: task.id.clone(),
        entries,
    }
}

/// Notification content handed to the port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReminderPayload {
    /// Correlates the notification with its task
    pub task_id: String,
    pub title: String,
    pub body: String,
    pub label: String,
}

impl ReminderPayload {
    pub fn for_task(task: &Task, offset: &ReminderOffset) -> Self {
        Self {
            task_id: task.id.clone(),
            title: REMINDER_TITLE.to_string(),
            body: format!("Task \"{}\" is due in {}!", task.title, offset.label),
            label: offset.label.to_string(),
        }
    }
}

/// Result of asking the platform for notification permission.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// No notification capability on this device
    Unavailable,
}

/// Platform notification service.
#[async_trait]
pub trait NotificationPort: Send + Sync {
    /// Ask for permission to post notifications.
    async fn request_permission(&self) -> Result<PermissionStatus, NotificationError>;

    /// Schedule one non-repeating notification.
    async fn schedule_one_shot(
        &self,
        fire_at: DateTime<Utc>,
        payload: &ReminderPayload,
    ) -> Result<(), NotificationError>;

    /// Cancel every pending notification for a task. Returns how many were removed.
    async fn cancel_for_task(&self, task_id: &str) -> Result<usize, NotificationError>;
}

/// Why a [`ScheduledSet`] looks the way it does.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingOutcome {
    /// Permission granted; entries were dispatched (possibly none).
    Scheduled,
    /// The user denied notification permission.
    PermissionDenied,
    /// The platform has no notification capability.
    Unavailable,
    /// Reminders are switched off in the configuration.
    Disabled,
    /// Existing reminders could not be cancelled, so none were added.
    CancelFailed,
}

/// A reminder that the port accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledReminder {
    pub label: String,
    pub fire_at: DateTime<Utc>,
}

/// A reminder the port refused.
#[derive(Debug)]
pub struct ReminderFailure {
    pub label: String,
    pub fire_at: DateTime<Utc>,
    pub error: NotificationError,
}

/// Reminders actually dispatched for one task.
#[derive(Debug)]
pub struct ScheduledSet {
    pub task_id: String,
    pub outcome: SchedulingOutcome,
    pub entries: Vec<ScheduledReminder>,
    pub failures: Vec<ReminderFailure>,
}

impl ScheduledSet {
    /// A set with nothing dispatched.
    pub fn empty(task_id: impl Into<String>, outcome: SchedulingOutcome) -> Self {
        Self {
            task_id: task_id.into(),
            outcome,
            entries: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }
}
