//! Reminder state machine.
//!
//! ```text
//! Unstarted -> Pending -> Overdue -> (iteration complete) -> Pending ...
//! ```
//!
//! Every transition takes `&self` and returns a new [`Reminder`]; nothing
//! here mutates its input or reads the system clock. The caller passes
//! `now` in.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Reminder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderState {
    Unstarted,
    Pending,
    Overdue,
}

impl Reminder {
    // ── Queries ──────────────────────────────────────────────────────

    /// Whether this reminder (and its child, recursively) may be started.
    pub fn is_startable(&self) -> bool {
        !self.name.is_empty()
            && self.interval > 0
            && !self.todos.is_empty()
            && self.todos.iter().all(|t| !t.name().is_empty())
            && self.child().map_or(true, Reminder::is_startable)
    }

    /// True when every todo in the checklist is complete.
    pub fn is_iteration_complete(&self) -> bool {
        self.todos.iter().all(|t| t.complete)
    }

    pub fn state(&self, now: DateTime<Utc>) -> ReminderState {
        match self.next_due {
            None => ReminderState::Unstarted,
            Some(due) if due <= now => ReminderState::Overdue,
            Some(_) => ReminderState::Pending,
        }
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.state(now) == ReminderState::Overdue
    }

    /// Due time of an iteration renewed at `now`.
    pub fn due_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(Duration::minutes(i64::from(self.interval)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Begin a fresh run: iteration count back to zero, checklist cleared,
    /// due one interval from `now`. The child is started the same way.
    pub fn start(&self, now: DateTime<Utc>) -> Self {
        let next_due = self.due_after(now);
        debug!(reminder = %self.name, %next_due, "reminder started");
        Self {
            completed: 0,
            todos: self.cleared_todos(),
            next_due: Some(next_due),
            child: self.child.as_ref().map(|c| Box::new(c.start(now))),
            ..self.clone()
        }
    }

    /// Next micro-cycle: checklist cleared and a fresh due time, with the
    /// completed counter untouched. The child is left as-is.
    pub fn renew(&self, now: DateTime<Utc>) -> Self {
        let next_due = self.due_after(now);
        debug!(reminder = %self.name, %next_due, "reminder renewed");
        Self {
            todos: self.cleared_todos(),
            next_due: Some(next_due),
            ..self.clone()
        }
    }

    /// Close the current iteration. The child is renewed, so its own
    /// counter survives.
    pub fn complete_iteration(&self, now: DateTime<Utc>) -> Self {
        let next_due = self.due_after(now);
        debug!(
            reminder = %self.name,
            completed = self.completed.saturating_add(1),
            %next_due,
            "iteration completed"
        );
        Self {
            completed: self.completed.saturating_add(1),
            todos: self.cleared_todos(),
            next_due: Some(next_due),
            child: self.child.as_ref().map(|c| Box::new(c.renew(now))),
            ..self.clone()
        }
    }

    /// Set the flag of every todo called `name`. Unknown names leave the
    /// reminder unchanged.
    pub fn set_todo_complete(&self, name: &str, value: bool) -> Self {
        Self {
            todos: self
                .todos
                .iter()
                .map(|t| {
                    if t.name() == name {
                        t.set_complete(value)
                    } else {
                        t.clone()
                    }
                })
                .collect(),
            ..self.clone()
        }
    }

    /// Mark `name` complete and advance the iteration if that finished the
    /// checklist. A miss is a no-op and never advances.
    pub fn complete_todo(&self, name: &str, now: DateTime<Utc>) -> Self {
        if !self.has_todo(name) {
            return self.clone();
        }
        let updated = self.set_todo_complete(name, true);
        if updated.is_iteration_complete() {
            updated.complete_iteration(now)
        } else {
            updated
        }
    }

    /// Mark `name` incomplete. Never advances the iteration.
    pub fn uncomplete_todo(&self, name: &str) -> Self {
        self.set_todo_complete(name, false)
    }

    /// [`complete_todo`](Self::complete_todo) applied to the child; the
    /// child's iteration advances on its own.
    pub fn complete_child_todo(&self, name: &str, now: DateTime<Utc>) -> Self {
        self.map_child(|c| c.complete_todo(name, now))
    }

    pub fn uncomplete_child_todo(&self, name: &str) -> Self {
        self.map_child(|c| c.uncomplete_todo(name))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn cleared_todos(&self) -> Vec<super::Todo> {
        self.todos.iter().map(|t| t.set_complete(false)).collect()
    }

    fn map_child(&self, f: impl FnOnce(&Reminder) -> Reminder) -> Self {
        match self.child() {
            Some(child) => Self {
                child: Some(Box::new(f(child))),
                ..self.clone()
            },
            None => self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::Todo;
    use proptest::prelude::*;

    fn at(minute: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap() + Duration::minutes(minute)
    }

    fn break_reminder() -> Reminder {
        Reminder::new("Break", 30)
            .with_todos(["Stand up", "Look away"])
            .unwrap()
    }

    fn with_micro_break() -> Reminder {
        let child = Reminder::new("Micro break", 2)
            .with_todos(["Stretch", "Drink water"])
            .unwrap();
        break_reminder().with_child(child)
    }

    #[test]
    fn start_resets_runtime_state() {
        let mut r = with_micro_break();
        r.completed = 4;
        r.todos[0].complete = true;
        if let Some(child) = r.child.as_mut() {
            child.completed = 7;
        }

        let started = r.start(at(0));
        assert_eq!(started.completed, 0);
        assert!(started.todos.iter().all(|t| !t.complete));
        assert_eq!(started.next_due, Some(at(30)));

        let child = started.child().unwrap();
        assert_eq!(child.completed, 0);
        assert_eq!(child.next_due, Some(at(2)));
    }

    #[test]
    fn start_does_not_mutate_input() {
        let r = break_reminder();
        let _ = r.start(at(0));
        assert!(r.next_due.is_none());
    }

    #[test]
    fn renew_keeps_completed() {
        let r = break_reminder().start(at(0)).complete_iteration(at(30));
        let renewed = r.set_todo_complete("Stand up", true).renew(at(40));
        assert_eq!(renewed.completed, 1);
        assert_eq!(renewed.next_due, Some(at(70)));
        assert!(renewed.todos.iter().all(|t| !t.complete));
    }

    #[test]
    fn complete_iteration_renews_child() {
        let r = with_micro_break().start(at(0));
        let r = r.complete_child_todo("Stretch", at(2));
        let r = r.complete_child_todo("Drink water", at(2));
        assert_eq!(r.child().unwrap().completed, 1);

        let advanced = r.complete_iteration(at(30));
        assert_eq!(advanced.completed, 1);
        let child = advanced.child().unwrap();
        assert_eq!(child.completed, 1);
        assert_eq!(child.next_due, Some(at(32)));

        let restarted = advanced.start(at(60));
        assert_eq!(restarted.child().unwrap().completed, 0);
    }

    #[test]
    fn completed_counter_saturates_with_debug_logging() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let mut r = break_reminder().start(at(0));
            r.completed = u32::MAX;
            let advanced = r.complete_iteration(at(30));
            assert_eq!(advanced.completed, u32::MAX);
            assert_eq!(advanced.next_due, Some(at(60)));
        });
    }

    #[test]
    fn completing_last_todo_advances_once() {
        let r = break_reminder().start(at(0));
        let stepwise = r
            .complete_todo("Stand up", at(5))
            .complete_todo("Look away", at(5));
        assert_eq!(stepwise, r.complete_iteration(at(5)));
        assert_eq!(stepwise.completed, 1);
    }

    #[test]
    fn partial_completion_does_not_advance() {
        let r = break_reminder().start(at(0));
        let partial = r.complete_todo("Stand up", at(5));
        assert_eq!(partial.completed, 0);
        assert!(partial.todo("Stand up").unwrap().complete);
        assert_eq!(partial.next_due, Some(at(30)));
    }

    #[test]
    fn uncomplete_reverts_partial_completion() {
        let r = break_reminder().start(at(0));
        let back = r.complete_todo("Stand up", at(5)).uncomplete_todo("Stand up");
        assert_eq!(back, r);
    }

    #[test]
    fn uncomplete_cannot_undo_advance() {
        let r = break_reminder().start(at(0)).complete_todo("Stand up", at(5));
        let advanced = r.complete_todo("Look away", at(6));
        let after = advanced.uncomplete_todo("Look away");
        assert_eq!(after.completed, 1);
        assert_eq!(after, advanced);
    }

    #[test]
    fn unknown_todo_is_noop() {
        let r = break_reminder().start(at(0));
        assert_eq!(r.complete_todo("Nap", at(1)), r);
        assert_eq!(r.uncomplete_todo("Nap"), r);
        assert_eq!(r.set_todo_complete("Nap", true), r);
    }

    #[test]
    fn empty_checklist_never_auto_advances() {
        let r = Reminder::new("Draft", 30).start(at(0));
        assert_eq!(r.complete_todo("anything", at(1)).completed, 0);
    }

    #[test]
    fn child_ops_without_child_are_noops() {
        let r = break_reminder().start(at(0));
        assert_eq!(r.complete_child_todo("Stretch", at(1)), r);
        assert_eq!(r.uncomplete_child_todo("Stretch"), r);
    }

    #[test]
    fn child_completion_leaves_parent_alone() {
        let r = with_micro_break().start(at(0));
        let r = r
            .complete_child_todo("Stretch", at(2))
            .complete_child_todo("Drink water", at(3));
        assert_eq!(r.completed, 0);
        assert_eq!(r.next_due, Some(at(30)));
        let child = r.child().unwrap();
        assert_eq!(child.completed, 1);
        assert_eq!(child.next_due, Some(at(5)));
    }

    #[test]
    fn duplicate_names_update_every_match() {
        let mut r = break_reminder();
        r.todos.push(Todo::new("Stand up"));
        let r = r.set_todo_complete("Stand up", true);
        assert_eq!(r.todos.iter().filter(|t| t.complete).count(), 2);
    }

    #[test]
    fn startability_rules() {
        assert!(break_reminder().is_startable());
        assert!(with_micro_break().is_startable());
        assert!(!Reminder::new("", 30).with_todos(["a"]).unwrap().is_startable());
        assert!(!Reminder::new("Break", 0).with_todos(["a"]).unwrap().is_startable());
        assert!(!Reminder::new("Break", 30).is_startable());
        assert!(!Reminder::new("Break", 30)
            .with_todos(["a", ""])
            .unwrap()
            .is_startable());

        let bad_child = Reminder::new("Micro break", 2);
        assert!(!break_reminder().with_child(bad_child).is_startable());
    }

    #[test]
    fn state_follows_due_time() {
        let r = break_reminder();
        assert_eq!(r.state(at(0)), ReminderState::Unstarted);
        let r = r.start(at(0));
        assert_eq!(r.state(at(29)), ReminderState::Pending);
        assert_eq!(r.state(at(30)), ReminderState::Overdue);
        assert!(r.is_overdue(at(45)));
    }

    proptest! {
        #[test]
        fn iteration_is_monotonic(
            interval in 1u32..600,
            completed in 0u32..1000,
            start_min in 0i64..10_000,
            elapsed in 1i64..10_000,
        ) {
            let mut r = Reminder::new("Break", interval)
                .with_todos(["a", "b"])
                .unwrap()
                .start(at(start_min));
            r.completed = completed;
            let next = r.complete_iteration(at(start_min + elapsed));
            prop_assert_eq!(next.completed, completed + 1);
            prop_assert!(next.todos.iter().all(|t| !t.complete));
            prop_assert!(next.next_due > r.next_due);
        }

        #[test]
        fn start_sets_due_one_interval_out(interval in 1u32..10_000, minute in 0i64..100_000) {
            let r = Reminder::new("Break", interval).with_todos(["a"]).unwrap();
            let started = r.start(at(minute));
            prop_assert_eq!(started.next_due, Some(at(minute + i64::from(interval))));
            prop_assert_eq!(started.completed, 0);
        }
    }
}
