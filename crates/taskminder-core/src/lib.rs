//! # Taskminder Core Library
//!
//! This library provides the core business logic for Taskminder, a personal
//! task tracker. Screens and transports live elsewhere; this crate owns the
//! parts with temporal logic.
//!
//! ## Architecture
//!
//! - **Status Resolver**: pure function deriving `Pending | Done | Failed`
//!   from a task's due date and completion flag at an explicit `now`
//! - **Reconciliation**: batch pass that collects tasks whose stored status
//!   disagrees with the derived one, plus a write-back driver tolerant of
//!   per-item failures
//! - **Reminders**: fixed lead-time catalog turned into one-shot local
//!   notifications through a [`NotificationPort`]
//! - **View**: filter and pagination projection over the reconciled set
//!
//! ## Key Components
//!
//! - [`resolve`]: status resolution
//! - [`ReconciliationEngine`]: reconcile and persist derived status
//! - [`ReminderScheduler`]: schedule, reschedule and cancel reminders
//! - [`TaskService`]: add, update, toggle, delete and load flows
//! - [`TaskStore`] / [`NotificationPort`]: the two external ports
//! - [`Config`]: application configuration

pub mod error;
pub mod reminder;
pub mod service;
pub mod storage;
pub mod store;
pub mod task;
pub mod view;

pub use error::{ConfigError, CoreError, NotificationError, TransportError, ValidationError};
pub use reminder::{
    NotificationPort, PermissionStatus, ReminderPayload, ReminderPlan, ReminderScheduler,
    ScheduledSet, SchedulingOutcome, DEFAULT_CATALOG,
};
pub use service::{LoadedTasks, TaskChange, TaskEdit, TaskService};
pub use storage::{data_dir, Config};
pub use store::{InMemoryTaskStore, TaskStore};
pub use task::due_date::NaivePolicy;
pub use task::reconciliation::{
    reconcile, Reconciliation, ReconciliationConfig, ReconciliationEngine, WriteBackReport,
};
pub use task::status::resolve;
pub use task::{NewTask, Task, TaskPatch, TaskRecord, TaskStatus};
pub use view::{DueFilter, TaskFilter, TaskListView, TaskRow};
