//! Core error types for breakroom-core.
//!
//! The compatibility API on [`Session`](crate::Session) never fails: misses
//! degrade to no-ops. The `try_*` variants surface the same conditions
//! through this hierarchy instead.

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Core error type for breakroom-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Reminder configuration is not usable
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Reminder, child or todo lookup failed
    #[error("Not found: {0}")]
    NotFound(#[from] LookupError),

    /// Configuration edits are only allowed while the session is not running
    #[error("Session is running; stop it before editing reminders")]
    SessionRunning,

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

/// Validation errors for reminder configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("'{field}' must not be empty")]
    EmptyName { field: String },

    #[error("Reminder '{reminder}' needs an interval of at least one minute")]
    ZeroInterval { reminder: String },

    #[error("Reminder '{reminder}' needs at least one todo")]
    NoTodos { reminder: String },

    #[error("Reminder '{reminder}' has an unnamed todo at position {index}")]
    EmptyTodoName { reminder: String, index: usize },

    #[error("Reminder '{reminder}' lists todo '{todo}' more than once")]
    DuplicateTodo { reminder: String, todo: String },

    /// Raised by the start gate for the first reminder that cannot run.
    #[error("Reminder {index} ('{name}') is not startable")]
    NotStartable { index: usize, name: String },
}

/// Lookup failures for index-, id- and name-keyed operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Reminder index {index} out of bounds (length: {len})")]
    ReminderIndex { index: usize, len: usize },

    #[error("Reminder {index} has no intermediate reminder")]
    NoChild { index: usize },

    #[error("Reminder '{reminder}' has no todo named '{todo}'")]
    Todo { reminder: String, todo: String },

    #[error("No reminder with id {0}")]
    ReminderId(Uuid),
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

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
