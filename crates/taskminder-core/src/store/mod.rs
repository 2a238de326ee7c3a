//! Task store port.
//!
//! The store owns tasks; the core only fetches them and sends partial
//! updates back. Every operation may fail with a [`TransportError`].
//!
//! Backends:
//! - [`InMemoryTaskStore`]: non-persistent, for tests and embedding
//! - anything else implements [`TaskStore`] at the edge (the CLI ships a
//!   JSON-file store)

mod memory;

pub use memory::InMemoryTaskStore;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::task::{NewTask, Task, TaskPatch};

/// Access to persisted tasks.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Fetch every task, in store order.
    async fn fetch_all(&self) -> Result<Vec<Task>, TransportError>;

    /// Create a task from a validated draft. The store assigns the id.
    async fn create(&self, draft: NewTask) -> Result<Task, TransportError>;

    /// Apply a partial update and return the stored result.
    async fn update(&self, id: &str, patch: &TaskPatch) -> Result<Task, TransportError>;

    /// Delete a task.
    async fn delete(&self, id: &str) -> Result<(), TransportError>;
}
