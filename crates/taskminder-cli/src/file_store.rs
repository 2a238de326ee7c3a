//! JSON-file task store.
//!
//! Tasks live in `tasks.json` in the data directory as an array of wire
//! records. Every operation re-reads the file; a lock serializes
//! read-modify-write cycles so concurrent status write-backs do not lose
//! updates.
//!
//! Only `fetch_all` normalizes every record, and it fails on the first one
//! with an unreadable due date. Writes touch the raw records and normalize
//! just the record they change, so a bad record can still be deleted by id.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

use taskminder_core::{NaivePolicy, NewTask, Task, TaskPatch, TaskRecord, TaskStore, TransportError};

pub struct JsonFileTaskStore {
    path: PathBuf,
    policy: NaivePolicy,
    lock: Mutex<()>,
}

impl JsonFileTaskStore {
    pub fn new(path: impl Into<PathBuf>, policy: NaivePolicy) -> Self {
        Self {
            path: path.into(),
            policy,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_records(&self) -> Result<Vec<TaskRecord>, TransportError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    async fn write_records(&self, records: &[TaskRecord]) -> Result<(), TransportError> {
        let json = serde_json::to_string_pretty(records)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    fn normalize(&self, record: TaskRecord) -> Result<Task, TransportError> {
        let id = record.id.clone();
        record
            .into_task(self.policy)
            .map_err(|source| TransportError::InvalidRecord { id, source })
    }
}

#[async_trait]
impl TaskStore for JsonFileTaskStore {
    async fn fetch_all(&self) -> Result<Vec<Task>, TransportError> {
        let _guard = self.lock.lock().await;
        self.read_records()
            .await?
            .into_iter()
            .map(|record| self.normalize(record))
            .collect()
    }

    async fn create(&self, draft: NewTask) -> Result<Task, TransportError> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_records().await?;
        let task = draft.into_task(Uuid::new_v4().to_string());
        records.push(TaskRecord::from(&task));
        self.write_records(&records).await?;
        Ok(task)
    }

    async fn update(&self, id: &str, patch: &TaskPatch) -> Result<Task, TransportError> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_records().await?;
        let slot = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| TransportError::NotFound { id: id.to_string() })?;

        let mut task = self.normalize(slot.clone())?;
        patch.apply_to(&mut task);
        *slot = TaskRecord::from(&task);

        self.write_records(&records).await?;
        Ok(task)
    }

    async fn delete(&self, id: &str) -> Result<(), TransportError> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_records().await?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(TransportError::NotFound { id: id.to_string() });
        }
        self.write_records(&records).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use taskminder_core::TaskStatus;

    fn store(dir: &tempfile::TempDir) -> JsonFileTaskStore {
        JsonFileTaskStore::new(dir.path().join("tasks.json"), NaivePolicy::AssumeUtc)
    }

    #[tokio::test]
    async fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store(&dir).fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_update_delete_persist_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        let task = s
            .create(NewTask::new("File taxes", "Before deadline", Utc::now() + Duration::days(3)))
            .await
            .unwrap();

        s.update(&task.id, &TaskPatch::status(TaskStatus::Done))
            .await
            .unwrap();
        let reopened = store(&dir).fetch_all().await.unwrap();
        assert_eq!(reopened[0].status, TaskStatus::Done);

        s.delete(&task.id).await.unwrap();
        assert!(store(&dir).fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_updates_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        let due = Utc::now() + Duration::days(1);
        let a = s.create(NewTask::new("a", "a", due)).await.unwrap();
        let b = s.create(NewTask::new("b", "b", due)).await.unwrap();

        let patch = TaskPatch::status(TaskStatus::Failed);
        let (ra, rb) = tokio::join!(s.update(&a.id, &patch), s.update(&b.id, &patch));
        ra.unwrap();
        rb.unwrap();

        let tasks = s.fetch_all().await.unwrap();
        assert!(tasks.iter().all(|t| t.status == TaskStatus::Failed));
    }

    #[tokio::test]
    async fn sixteen_char_due_dates_are_normalized_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        std::fs::write(
            s.path(),
            r#"[{"id":"t1","title":"a","description":"b","dueDate":"2025-06-01T09:30","status":"Pending"}]"#,
        )
        .unwrap();

        let tasks = s.fetch_all().await.unwrap();
        assert_eq!(
            taskminder_core::task::due_date::format(tasks[0].due_date),
            "2025-06-01T09:30:00Z"
        );
    }

    #[tokio::test]
    async fn malformed_record_is_reported_with_its_id() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        std::fs::write(
            s.path(),
            r#"[{"id":"bad","title":"a","description":"b","dueDate":"someday","status":"Pending"}]"#,
        )
        .unwrap();

        let err = s.fetch_all().await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidRecord { ref id, .. } if id == "bad"));
    }

    fn write_with_bad_record(s: &JsonFileTaskStore) {
        std::fs::write(
            s.path(),
            r#"[
                {"id":"bad","title":"a","description":"b","dueDate":"someday","status":"Pending"},
                {"id":"good","title":"c","description":"d","dueDate":"2030-01-01T00:00:00Z","status":"Pending"}
            ]"#,
        )
        .unwrap();
    }

    #[tokio::test]
    async fn bad_record_can_be_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        write_with_bad_record(&s);

        s.delete("bad").await.unwrap();

        let tasks = s.fetch_all().await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "good");
    }

    #[tokio::test]
    async fn writes_to_good_records_survive_a_bad_neighbour() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        write_with_bad_record(&s);

        let updated = s
            .update("good", &TaskPatch::status(TaskStatus::Done))
            .await
            .unwrap();
        assert_eq!(updated.status, TaskStatus::Done);
        s.create(NewTask::new("e", "f", Utc::now() + Duration::days(1)))
            .await
            .unwrap();

        let err = s
            .update("bad", &TaskPatch::status(TaskStatus::Done))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidRecord { ref id, .. } if id == "bad"));

        let raw = std::fs::read_to_string(s.path()).unwrap();
        assert!(raw.contains("someday"));
        assert!(raw.contains("\"status\": \"Done\""));
    }

    #[tokio::test]
    async fn fractional_due_dates_survive_a_write() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(&dir);
        std::fs::write(
            s.path(),
            r#"[{"id":"t1","title":"a","description":"b","dueDate":"2030-06-01T09:30:00.750Z","status":"Pending"}]"#,
        )
        .unwrap();

        s.update("t1", &TaskPatch::status(TaskStatus::Done))
            .await
            .unwrap();

        let tasks = s.fetch_all().await.unwrap();
        assert_eq!(tasks[0].due_date.timestamp_subsec_millis(), 750);
    }
}
