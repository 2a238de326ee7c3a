//! Task types and the lifecycle rules around them.
//!
//! A [`Task`] is owned by the external store; the core only reads it and
//! derives copies. Its `status` is advisory: [`status::resolve`] decides what
//! it should be, and [`reconciliation`] syncs the difference back.
//!
//! Status lifecycle:
//!
//!   Pending ──(user completes)──> Done ──(user reopens)──> Pending
//!      │
//!      └──(more than 24h past due)──> Failed   (derived only, never user-set)

pub mod due_date;
pub mod reconciliation;
pub mod status;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use due_date::NaivePolicy;

/// Task status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum TaskStatus {
    /// Not completed and not overdue beyond the grace window (initial state)
    #[default]
    Pending,
    /// Completed by explicit user action (sticky)
    Done,
    /// Overdue beyond the grace window (derived only)
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::Done => "Done",
            TaskStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "done" => Ok(TaskStatus::Done),
            "failed" => Ok(TaskStatus::Failed),
            _ => Err(ValidationError::InvalidStatus(s.to_string())),
        }
    }
}

/// A task snapshot with a normalized due instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Opaque stable identifier
    pub id: String,
    pub title: String,
    pub description: String,
    /// Absolute due instant
    pub due_date: DateTime<Utc>,
    /// Persisted status (advisory)
    pub status: TaskStatus,
}

impl Task {
    /// Copy of this task with a different status.
    pub fn with_status(&self, status: TaskStatus) -> Task {
        Task {
            status,
            ..self.clone()
        }
    }

    /// Whether the due instant is at or before `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_date <= now
    }
}

/// Wire form of a task as stored by the task store.
///
/// `dueDate` stays a string here; [`TaskRecord::into_task`] is the single
/// normalization point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub due_date: String,
    #[serde(default)]
    pub status: TaskStatus,
}

impl TaskRecord {
    /// Normalize the record into a [`Task`].
    pub fn into_task(self, policy: NaivePolicy) -> Result<Task, ValidationError> {
        let due_date = due_date::parse(&self.due_date, policy)?;
        Ok(Task {
            id: self.id,
            title: self.title,
            description: self.description,
            due_date,
            status: self.status,
        })
    }
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: due_date::format(task.due_date),
            status: task.status,
        }
    }
}

/// Draft for a new task. New tasks always start as `Pending`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
}

impl NewTask {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            due_date,
        }
    }

    /// Check required fields and that the due date is not in the past.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        require_text("description", &self.description)?;
        require_not_past(self.due_date, now)
    }

    /// Build the stored task for a freshly assigned id.
    pub fn into_task(self, id: impl Into<String>) -> Task {
        Task {
            id: id.into(),
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            status: TaskStatus::Pending,
        }
    }
}

/// Partial update sent to the task store. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    /// Patch that only changes the status.
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.status.is_none()
    }

    /// Validate the user-editable fields present in the patch.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(description) = &self.description {
            require_text("description", description)?;
        }
        if let Some(due) = self.due_date {
            require_not_past(due, now)?;
        }
        Ok(())
    }

    /// Apply the patch to a task in place.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(due) = self.due_date {
            task.due_date = due;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
    }
}

fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(())
}

fn require_not_past(due: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), ValidationError> {
    if due < now {
        return Err(ValidationError::DueDateInPast { due });
    }
    Ok(())
}
