use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::arbitration::{ActiveSide, ReminderView};
use crate::reminder::Reminder;
use crate::session::Session;

/// Observable changes. Session transitions are reported by diffing two
/// snapshots with [`transition_events`]; the monitor reports the time-driven
/// ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        reminders: usize,
        at: DateTime<Utc>,
    },
    SessionStopped {
        at: DateTime<Utc>,
    },
    TodoUpdated {
        reminder_index: usize,
        side: ActiveSide,
        todo: String,
        complete: bool,
        at: DateTime<Utc>,
    },
    IterationCompleted {
        reminder_index: usize,
        side: ActiveSide,
        name: String,
        completed: u32,
        next_due: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    },
    /// Arbitration switched between parent and child.
    ActiveChanged {
        reminder_index: usize,
        side: ActiveSide,
        name: String,
        at: DateTime<Utc>,
    },
    /// The active reminder crossed its due time.
    BecameOverdue {
        reminder_index: usize,
        side: ActiveSide,
        name: String,
        at: DateTime<Utc>,
    },
    StatusSnapshot {
        views: Vec<ReminderView>,
        at: DateTime<Utc>,
    },
}

/// Events explaining how `before` became `after`.
///
/// Reminders are paired by position and id; pairs whose ids differ are
/// skipped. An advanced iteration is reported instead of the todo flips that
/// caused it.
pub fn transition_events(before: &Session, after: &Session, at: DateTime<Utc>) -> Vec<Event> {
    let mut events = Vec::new();

    if after.started.is_some() && after.started != before.started {
        events.push(Event::SessionStarted {
            reminders: after.reminders.len(),
            at,
        });
        return events;
    }
    if after.stopped.is_some() && after.stopped != before.stopped {
        events.push(Event::SessionStopped { at });
    }

    for (index, (old, new)) in before.reminders.iter().zip(&after.reminders).enumerate() {
        if old.id != new.id {
            continue;
        }
        diff_reminder(index, ActiveSide::Parent, old, new, at, &mut events);
        if let (Some(old_child), Some(new_child)) = (old.child(), new.child()) {
            if old_child.id == new_child.id {
                diff_reminder(index, ActiveSide::Child, old_child, new_child, at, &mut events);
            }
        }
    }
    events
}

fn diff_reminder(
    index: usize,
    side: ActiveSide,
    old: &Reminder,
    new: &Reminder,
    at: DateTime<Utc>,
    events: &mut Vec<Event>,
) {
    if new.completed > old.completed {
        events.push(Event::IterationCompleted {
            reminder_index: index,
            side,
            name: new.name.clone(),
            completed: new.completed,
            next_due: new.next_due,
            at,
        });
        return;
    }
    for todo in &new.todos {
        let was = old.todo(todo.name()).map(|t| t.complete);
        if was.is_some_and(|c| c != todo.complete) {
            events.push(Event::TodoUpdated {
                reminder_index: index,
                side,
                todo: todo.name().to_string(),
                complete: todo.complete,
                at,
            });
        }
    }
}
