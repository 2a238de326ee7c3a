//! Core error types for taskminder-core.
//!
//! This module defines the error hierarchy using thiserror. Validation
//! failures are surfaced to the caller immediately, transport failures come
//! from the task store, and notification failures from the reminder port.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for taskminder-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Task store errors
    #[error("Task store error: {0}")]
    Transport(#[from] TransportError),

    /// Notification port errors
    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is empty after trimming
    #[error("'{field}' is required and cannot be empty")]
    EmptyField { field: &'static str },

    /// Due date string could not be parsed
    #[error("Malformed due date '{input}': expected RFC 3339 (e.g. 2025-06-01T09:30:00Z)")]
    MalformedDueDate { input: String },

    /// Due date has no offset and naive dates are rejected by configuration
    #[error("Due date '{input}' has no timezone; add an offset such as 'Z' or '+02:00'")]
    AmbiguousDueDate { input: String },

    /// Due date is before the evaluation instant
    #[error("Cannot set due date in the past ({due})")]
    DueDateInPast { due: chrono::DateTime<chrono::Utc> },

    /// The task is failed and cannot be toggled
    #[error("Task '{id}' is overdue and locked as Failed")]
    TaskLocked { id: String },

    /// No task with that id in the current set
    #[error("Task not found: {id}")]
    UnknownTask { id: String },

    /// Invalid status value on the wire
    #[error("Invalid status '{0}': expected Pending, Done or Failed")]
    InvalidStatus(String),
}

/// Task store (transport) errors.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The store could not be reached
    #[error("Task store unavailable: {0}")]
    Unavailable(String),

    /// The store has no task with this id
    #[error("Task not found in store: {id}")]
    NotFound { id: String },

    /// The store refused the request
    #[error("Task store rejected request for '{id}': {message}")]
    Rejected { id: String, message: String },

    /// A stored record failed due-date or status normalization
    #[error("Invalid task record '{id}': {source}")]
    InvalidRecord {
        id: String,
        #[source]
        source: ValidationError,
    },

    /// Backing file IO failed
    #[error("Task store IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Backing file could not be (de)serialized
    #[error("Task store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Notification port errors.
#[derive(Error, Debug)]
pub enum NotificationError {
    /// The platform refused to schedule the notification
    #[error("Failed to schedule notification for task '{task_id}': {message}")]
    ScheduleFailed { task_id: String, message: String },

    /// Cancelling existing notifications failed
    #[error("Failed to cancel notifications for task '{task_id}': {message}")]
    CancelFailed { task_id: String, message: String },

    /// The notification capability could not be queried
    #[error("Notification capability unavailable: {0}")]
    Unavailable(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be resolved or created
    #[error("Failed to access data directory {path}: {message}")]
    DataDir { path: PathBuf, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
