//! Reminders: a recurring due time with a todo checklist and an optional
//! nested intermediate reminder.

mod config;
mod engine;
mod todo;

pub use config::ReminderConfig;
pub use engine::ReminderState;
pub use todo::Todo;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// A recurring reminder.
///
/// `next_due` is `None` until the reminder is started. Afterwards it always
/// holds the last renewal time plus `interval` minutes. The optional `child`
/// is owned outright and has no link back to its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: Uuid,
    pub name: String,
    /// Minutes between due times.
    pub interval: u32,
    #[serde(default)]
    pub child: Option<Box<Reminder>>,
    #[serde(default)]
    pub todos: Vec<Todo>,
    /// Iterations completed since the reminder was last started.
    #[serde(default)]
    pub completed: u32,
    #[serde(default)]
    pub next_due: Option<DateTime<Utc>>,
}

impl Reminder {
    /// An unstarted reminder with no todos and no child.
    pub fn new(name: impl Into<String>, interval: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            interval,
            child: None,
            todos: Vec::new(),
            completed: 0,
            next_due: None,
        }
    }

    /// Replace the checklist. Todo names must be unique within one reminder.
    pub fn with_todos<I, S>(mut self, names: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut todos: Vec<Todo> = Vec::new();
        for name in names {
            let name = name.into();
            if todos.iter().any(|t| t.name() == name) {
                return Err(ValidationError::DuplicateTodo {
                    reminder: self.name,
                    todo: name,
                });
            }
            todos.push(Todo::new(name));
        }
        self.todos = todos;
        Ok(self)
    }

    pub fn with_child(mut self, child: Reminder) -> Self {
        self.child = Some(Box::new(child));
        self
    }

    pub fn todo(&self, name: &str) -> Option<&Todo> {
        self.todos.iter().find(|t| t.name() == name)
    }

    pub fn has_todo(&self, name: &str) -> bool {
        self.todo(name).is_some()
    }

    pub fn child(&self) -> Option<&Reminder> {
        self.child.as_deref()
    }
}
