//! Reminder outbox.
//!
//! The CLI has no notification daemon; scheduled reminders are written to
//! `reminders.json` in the data directory for whatever delivers them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::Mutex;

use taskminder_core::{NotificationError, NotificationPort, PermissionStatus, ReminderPayload};

/// One pending reminder in the outbox.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OutboxEntry {
    pub fire_at: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: ReminderPayload,
}

pub struct FileOutbox {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileOutbox {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Pending reminders, soonest first.
    pub async fn entries(&self) -> Result<Vec<OutboxEntry>, NotificationError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read().await?;
        entries.sort_by_key(|e| e.fire_at);
        Ok(entries)
    }

    async fn read(&self) -> Result<Vec<OutboxEntry>, NotificationError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(Vec::new()),
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| NotificationError::Unavailable(format!("corrupt outbox: {e}"))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(NotificationError::Unavailable(e.to_string())),
        }
    }

    async fn write(&self, entries: &[OutboxEntry]) -> Result<(), NotificationError> {
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| NotificationError::Unavailable(e.to_string()))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| NotificationError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl NotificationPort for FileOutbox {
    async fn request_permission(&self) -> Result<PermissionStatus, NotificationError> {
        Ok(PermissionStatus::Granted)
    }

    async fn schedule_one_shot(
        &self,
        fire_at: DateTime<Utc>,
        payload: &ReminderPayload,
    ) -> Result<(), NotificationError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read().await?;
        entries.push(OutboxEntry {
            fire_at,
            payload: payload.clone(),
        });
        self.write(&entries)
            .await
            .map_err(|e| NotificationError::ScheduleFailed {
                task_id: payload.task_id.clone(),
                message: e.to_string(),
            })
    }

    async fn cancel_for_task(&self, task_id: &str) -> Result<usize, NotificationError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read().await?;
        let before = entries.len();
        entries.retain(|e| e.payload.task_id != task_id);
        let removed = before - entries.len();
        if removed > 0 {
            self.write(&entries)
                .await
                .map_err(|e| NotificationError::CancelFailed {
                    task_id: task_id.to_string(),
                    message: e.to_string(),
                })?;
        }
        Ok(removed)
    }
}
