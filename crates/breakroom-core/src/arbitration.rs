//! Parent/child arbitration.
//!
//! A reminder with an intermediate child shows only one of the two at a
//! time. The parent wins when it is already overdue, or when it falls due no
//! later than the child plus a small tie-break buffer; otherwise the child is
//! shown. Nothing here changes reminder state.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::reminder::{Reminder, Todo};
use crate::session::Session;

/// Default slack before a child is preferred over its parent.
pub const DEFAULT_TIE_BREAK_SECS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveSide {
    Parent,
    Child,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderStatus {
    Pending,
    Overdue,
}

/// `Overdue` iff `next_due <= now`. Unstarted reminders are pending.
pub fn status(next_due: Option<DateTime<Utc>>, now: DateTime<Utc>) -> ReminderStatus {
    match next_due {
        Some(due) if due <= now => ReminderStatus::Overdue,
        _ => ReminderStatus::Pending,
    }
}

/// Whole minutes until `next_due`, rounded up; `-1` when unstarted.
pub fn minutes_remaining(next_due: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    let Some(due) = next_due else {
        return -1;
    };
    let ms = (due - now).num_milliseconds();
    let minutes = ms.div_euclid(60_000);
    if ms.rem_euclid(60_000) == 0 {
        minutes
    } else {
        minutes + 1
    }
}

/// Selects the active half of a parent/child pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arbiter {
    tie_break: Duration,
}

impl Default for Arbiter {
    fn default() -> Self {
        Self {
            tie_break: Duration::seconds(DEFAULT_TIE_BREAK_SECS),
        }
    }
}

impl Arbiter {
    pub fn new(tie_break: Duration) -> Self {
        Self { tie_break }
    }

    pub fn tie_break(&self) -> Duration {
        self.tie_break
    }

    /// Which of `parent` and its child should be shown at `now`.
    ///
    /// Without a child, or while either side is unstarted, the parent is
    /// active.
    pub fn select(&self, parent: &Reminder, now: DateTime<Utc>) -> ActiveSide {
        let Some(child) = parent.child() else {
            return ActiveSide::Parent;
        };
        let (Some(parent_due), Some(child_due)) = (parent.next_due, child.next_due) else {
            return ActiveSide::Parent;
        };
        let within_buffer = child_due
            .checked_add_signed(self.tie_break)
            .map_or(true, |limit| parent_due <= limit);
        if parent_due <= now || within_buffer {
            ActiveSide::Parent
        } else {
            ActiveSide::Child
        }
    }

    /// The active reminder itself, with the side it came from.
    pub fn active<'a>(&self, parent: &'a Reminder, now: DateTime<Utc>) -> (ActiveSide, &'a Reminder) {
        match (self.select(parent, now), parent.child()) {
            (ActiveSide::Child, Some(child)) => (ActiveSide::Child, child),
            _ => (ActiveSide::Parent, parent),
        }
    }

    pub fn view(&self, index: usize, parent: &Reminder, now: DateTime<Utc>) -> ReminderView {
        let (side, active) = self.active(parent, now);
        ReminderView {
            index,
            side,
            parent_name: parent.name.clone(),
            name: active.name.clone(),
            interval: active.interval,
            completed: active.completed,
            next_due: active.next_due,
            status: status(active.next_due, now),
            minutes_remaining: minutes_remaining(active.next_due, now),
            todos: active.todos.clone(),
        }
    }

    /// One view per reminder, all read from the same snapshot at one instant.
    pub fn views(&self, session: &Session, now: DateTime<Utc>) -> Vec<ReminderView> {
        session
            .reminders
            .iter()
            .enumerate()
            .map(|(i, r)| self.view(i, r, now))
            .collect()
    }
}

/// What to render for one configured reminder at an instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderView {
    pub index: usize,
    pub side: ActiveSide,
    pub parent_name: String,
    pub name: String,
    pub interval: u32,
    pub completed: u32,
    pub next_due: Option<DateTime<Utc>>,
    pub status: ReminderStatus,
    pub minutes_remaining: i64,
    pub todos: Vec<Todo>,
}

impl ReminderView {
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ReminderView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.status == ReminderStatus::Overdue {
            write!(f, "Overdue")
        } else if i64::from(self.interval) == self.minutes_remaining {
            write!(f, "{}m left", self.minutes_remaining)
        } else {
            write!(f, "{}/{}m left", self.minutes_remaining, self.interval)
        }
    }
}
