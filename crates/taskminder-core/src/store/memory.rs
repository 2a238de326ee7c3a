//! In-memory task store.

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::TaskStore;
use crate::error::TransportError;
use crate::task::{NewTask, Task, TaskPatch};

/// Non-persistent store keeping tasks in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    tasks: Mutex<Vec<Task>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing tasks.
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
        }
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> Vec<Task> {
        match self.tasks.lock() {
            Ok(tasks) => tasks.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Task>>, TransportError> {
        self.tasks
            .lock()
            .map_err(|_| TransportError::Unavailable("in-memory store lock poisoned".into()))
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn fetch_all(&self) -> Result<Vec<Task>, TransportError> {
        Ok(self.lock()?.clone())
    }

    async fn create(&self, draft: NewTask) -> Result<Task, TransportError> {
        let task = draft.into_task(Uuid::new_v4().to_string());
        self.lock()?.push(task.clone());
        Ok(task)
    }

    async fn update(&self, id: &str, patch: &TaskPatch) -> Result<Task, TransportError> {
        let mut tasks = self.lock()?;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| TransportError::NotFound { id: id.to_string() })?;
        patch.apply_to(task);
        Ok(task.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), TransportError> {
        let mut tasks = self.lock()?;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(TransportError::NotFound { id: id.to_string() });
        }
        Ok(())
    }
}
