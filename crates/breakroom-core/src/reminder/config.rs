//! Editable reminder configuration.
//!
//! A [`ReminderConfig`] is what the configuration form produces: names, an
//! interval and todo names, with an optional intermediate reminder. It turns
//! into a fresh [`Reminder`] via [`build`](ReminderConfig::build), or edits an
//! existing one via [`apply_to`](ReminderConfig::apply_to).

use serde::{Deserialize, Serialize};

use super::Reminder;
use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderConfig {
    pub name: String,
    /// Minutes between due times.
    pub interval: u32,
    #[serde(default)]
    pub todos: Vec<String>,
    #[serde(default)]
    pub child: Option<Box<ReminderConfig>>,
}

impl ReminderConfig {
    pub fn new<I, S>(name: impl Into<String>, interval: u32, todos: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            interval,
            todos: todos.into_iter().map(Into::into).collect(),
            child: None,
        }
    }

    pub fn with_child(mut self, child: ReminderConfig) -> Self {
        self.child = Some(Box::new(child));
        self
    }

    /// Configuration of an existing reminder, runtime state dropped.
    pub fn from_reminder(reminder: &Reminder) -> Self {
        Self {
            name: reminder.name.clone(),
            interval: reminder.interval,
            todos: reminder.todos.iter().map(|t| t.name().to_string()).collect(),
            child: reminder.child().map(|c| Box::new(Self::from_reminder(c))),
        }
    }

    /// Full check, reporting the first reason the resulting reminder would
    /// not be startable. Also rejects repeated todo names.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName {
                field: "name".into(),
            });
        }
        if self.interval == 0 {
            return Err(ValidationError::ZeroInterval {
                reminder: self.name.clone(),
            });
        }
        if self.todos.is_empty() {
            return Err(ValidationError::NoTodos {
                reminder: self.name.clone(),
            });
        }
        if let Some(index) = self.todos.iter().position(String::is_empty) {
            return Err(ValidationError::EmptyTodoName {
                reminder: self.name.clone(),
                index,
            });
        }
        self.check_unique_todos()?;
        match &self.child {
            Some(child) => child.validate(),
            None => Ok(()),
        }
    }

    /// A new, unstarted reminder. Drafts with missing fields are allowed;
    /// only repeated todo names are rejected.
    pub fn build(&self) -> Result<Reminder, ValidationError> {
        let mut reminder = Reminder::new(self.name.clone(), self.interval)
            .with_todos(self.todos.iter().cloned())?;
        if let Some(child) = &self.child {
            reminder = reminder.with_child(child.build()?);
        }
        Ok(reminder)
    }

    /// Edit `existing` in place of its configuration.
    ///
    /// The reminder keeps its id and runtime counters; the checklist is
    /// rebuilt from `todos`. The child is created, replaced or dropped to
    /// match `self.child`, and any child that results always carries fresh,
    /// unstarted runtime state.
    pub fn apply_to(&self, existing: &Reminder) -> Result<Reminder, ValidationError> {
        let rebuilt = Reminder::new(self.name.clone(), self.interval)
            .with_todos(self.todos.iter().cloned())?;
        let child = match (&self.child, existing.child()) {
            (None, _) => None,
            (Some(cfg), None) => Some(Box::new(cfg.build()?)),
            (Some(cfg), Some(old)) => Some(Box::new(cfg.rebuild(old)?)),
        };
        Ok(Reminder {
            id: existing.id,
            name: rebuilt.name,
            interval: rebuilt.interval,
            todos: rebuilt.todos,
            child,
            completed: existing.completed,
            next_due: existing.next_due,
        })
    }

    fn check_unique_todos(&self) -> Result<(), ValidationError> {
        for (i, name) in self.todos.iter().enumerate() {
            if self.todos[..i].contains(name) {
                return Err(ValidationError::DuplicateTodo {
                    reminder: self.name.clone(),
                    todo: name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Like `build`, but ids of `old` and its descendants are carried over.
    fn rebuild(&self, old: &Reminder) -> Result<Reminder, ValidationError> {
        let mut fresh = self.build()?;
        fresh.id = old.id;
        if let (Some(child_cfg), Some(old_child)) = (&self.child, old.child()) {
            fresh.child = Some(Box::new(child_cfg.rebuild(old_child)?));
        }
        Ok(fresh)
    }
}
