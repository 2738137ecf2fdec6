//! Sessions: the run container for a list of reminders.
//!
//! Every operation borrows the current snapshot and returns the next one.
//! Two flavours exist side by side:
//!
//! - plain methods (`complete_todo`, `update_reminder_config`, ...) treat an
//!   unknown index, id or todo name as a no-op and return an equal session;
//! - `try_*` methods report the same conditions as [`CoreError`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{CoreError, LookupError, Result, ValidationError};
use crate::reminder::{Reminder, ReminderConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Never started.
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub started: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stopped: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reminders: Vec<Reminder>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        match (self.started, self.stopped) {
            (None, _) => SessionState::Idle,
            (Some(_), None) => SessionState::Running,
            (Some(_), Some(_)) => SessionState::Stopped,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == SessionState::Running
    }

    /// Whether every reminder may be started.
    pub fn is_startable(&self) -> bool {
        self.first_unstartable().is_none()
    }

    /// Index of the first reminder that fails [`Reminder::is_startable`].
    pub fn first_unstartable(&self) -> Option<usize> {
        self.reminders.iter().position(|r| !r.is_startable())
    }

    /// Checklist completion for the reminder at `index`, `None` if out of range.
    pub fn is_iteration_complete(&self, index: usize) -> Option<bool> {
        self.reminders.get(index).map(Reminder::is_iteration_complete)
    }

    pub fn reminder(&self, index: usize) -> Result<&Reminder> {
        self.reminders.get(index).ok_or_else(|| {
            LookupError::ReminderIndex {
                index,
                len: self.reminders.len(),
            }
            .into()
        })
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Start (or restart) a run. Startability is the caller's gate; see
    /// [`try_start`](Self::try_start).
    pub fn start(&self, now: DateTime<Utc>) -> Self {
        info!(reminders = self.reminders.len(), "session started");
        Self {
            started: Some(now),
            stopped: None,
            reminders: self.reminders.iter().map(|r| r.start(now)).collect(),
        }
    }

    /// [`start`](Self::start), refused when any reminder is not startable.
    pub fn try_start(&self, now: DateTime<Utc>) -> Result<Self> {
        if let Some(index) = self.first_unstartable() {
            return Err(ValidationError::NotStartable {
                index,
                name: self.reminders[index].name.clone(),
            }
            .into());
        }
        Ok(self.start(now))
    }

    /// Record the stop time. Runtime reminder state is kept as-is.
    pub fn stop(&self, now: DateTime<Utc>) -> Self {
        info!("session stopped");
        Self {
            stopped: Some(now),
            ..self.clone()
        }
    }

    // ── Configuration ────────────────────────────────────────────────

    pub fn add_reminder(&self, reminder: Reminder) -> Self {
        let mut reminders = self.reminders.clone();
        reminders.push(reminder);
        Self {
            reminders,
            ..self.clone()
        }
    }

    pub fn try_add_reminder(&self, reminder: Reminder) -> Result<Self> {
        self.ensure_editable()?;
        Ok(self.add_reminder(reminder))
    }

    /// Remove the reminder with the same id as `reminder`.
    pub fn remove_reminder(&self, reminder: &Reminder) -> Self {
        Self {
            reminders: self
                .reminders
                .iter()
                .filter(|r| r.id != reminder.id)
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    pub fn try_remove_reminder(&self, reminder: &Reminder) -> Result<Self> {
        self.ensure_editable()?;
        if !self.reminders.iter().any(|r| r.id == reminder.id) {
            return Err(LookupError::ReminderId(reminder.id).into());
        }
        Ok(self.remove_reminder(reminder))
    }

    /// Rewrite the configuration of the reminder at `index`; see
    /// [`ReminderConfig::apply_to`] for how the child is handled. Bad
    /// indices and repeated todo names leave the session unchanged.
    pub fn update_reminder_config(&self, index: usize, config: &ReminderConfig) -> Self {
        match self.updated(index, config) {
            Ok(session) => session,
            Err(err) => {
                warn!(index, error = %err, "reminder update ignored");
                self.clone()
            }
        }
    }

    pub fn try_update_reminder_config(&self, index: usize, config: &ReminderConfig) -> Result<Self> {
        self.ensure_editable()?;
        config.validate()?;
        self.updated(index, config)
    }

    // ── Todos ────────────────────────────────────────────────────────

    pub fn complete_todo(&self, index: usize, todo: &str, now: DateTime<Utc>) -> Self {
        self.map_reminder(index, |r| r.complete_todo(todo, now))
    }

    pub fn uncomplete_todo(&self, index: usize, todo: &str) -> Self {
        self.map_reminder(index, |r| r.uncomplete_todo(todo))
    }

    pub fn complete_child_todo(&self, index: usize, todo: &str, now: DateTime<Utc>) -> Self {
        self.map_reminder(index, |r| r.complete_child_todo(todo, now))
    }

    pub fn uncomplete_child_todo(&self, index: usize, todo: &str) -> Self {
        self.map_reminder(index, |r| r.uncomplete_child_todo(todo))
    }

    pub fn try_complete_todo(&self, index: usize, todo: &str, now: DateTime<Utc>) -> Result<Self> {
        self.lookup_todo(index, false, todo)?;
        Ok(self.complete_todo(index, todo, now))
    }

    pub fn try_uncomplete_todo(&self, index: usize, todo: &str) -> Result<Self> {
        self.lookup_todo(index, false, todo)?;
        Ok(self.uncomplete_todo(index, todo))
    }

    pub fn try_complete_child_todo(
        &self,
        index: usize,
        todo: &str,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        self.lookup_todo(index, true, todo)?;
        Ok(self.complete_child_todo(index, todo, now))
    }

    pub fn try_uncomplete_child_todo(&self, index: usize, todo: &str) -> Result<Self> {
        self.lookup_todo(index, true, todo)?;
        Ok(self.uncomplete_child_todo(index, todo))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn ensure_editable(&self) -> Result<()> {
        if self.is_running() {
            return Err(CoreError::SessionRunning);
        }
        Ok(())
    }

    fn updated(&self, index: usize, config: &ReminderConfig) -> Result<Self> {
        let existing = self.reminder(index)?;
        let edited = config.apply_to(existing)?;
        Ok(self.map_reminder(index, |_| edited))
    }

    fn lookup_todo(&self, index: usize, child: bool, todo: &str) -> Result<()> {
        let parent = self.reminder(index)?;
        let target = if child {
            parent.child().ok_or(LookupError::NoChild { index })?
        } else {
            parent
        };
        if !target.has_todo(todo) {
            return Err(LookupError::Todo {
                reminder: target.name.clone(),
                todo: todo.to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn map_reminder(&self, index: usize, f: impl FnOnce(&Reminder) -> Reminder) -> Self {
        let Some(target) = self.reminders.get(index) else {
            warn!(index, len = self.reminders.len(), "no reminder at index");
            return self.clone();
        };
        let mut reminders = self.reminders.clone();
        reminders[index] = f(target);
        Self {
            reminders,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(minute: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap() + Duration::minutes(minute)
    }

    fn configured() -> Session {
        let eyes = ReminderConfig::new("Eyes", 20, ["Look far away"]).build().unwrap();
        let posture = ReminderConfig::new("Posture", 45, ["Stand up", "Walk"])
            .with_child(ReminderConfig::new("Micro break", 5, ["Stretch"]))
            .build()
            .unwrap();
        Session::new().add_reminder(eyes).add_reminder(posture)
    }

    #[test]
    fn state_follows_timestamps() {
        let s = configured();
        assert_eq!(s.state(), SessionState::Idle);
        let s = s.start(at(0));
        assert_eq!(s.state(), SessionState::Running);
        let s = s.stop(at(10));
        assert_eq!(s.state(), SessionState::Stopped);
        assert_eq!(s.start(at(20)).state(), SessionState::Running);
    }

    #[test]
    fn start_starts_every_reminder() {
        let s = configured().start(at(0));
        assert_eq!(s.started, Some(at(0)));
        assert!(s.stopped.is_none());
        assert_eq!(s.reminders[0].next_due, Some(at(20)));
        assert_eq!(s.reminders[1].next_due, Some(at(45)));
        assert_eq!(s.reminders[1].child().unwrap().next_due, Some(at(5)));
    }

    #[test]
    fn start_leaves_input_untouched() {
        let s = configured();
        let before = s.clone();
        let started = s.start(at(0));
        assert_ne!(started, s);
        assert_eq!(s, before);
    }

    #[test]
    fn stop_keeps_runtime_state() {
        let s = configured().start(at(0)).complete_todo(1, "Stand up", at(3));
        let stopped = s.stop(at(4));
        assert_eq!(stopped.reminders, s.reminders);
        assert_eq!(stopped.started, Some(at(0)));
    }

    #[test]
    fn restart_resets_runtime_state() {
        let s = configured()
            .start(at(0))
            .complete_todo(0, "Look far away", at(3))
            .stop(at(4))
            .start(at(10));
        assert_eq!(s.reminders[0].completed, 0);
        assert_eq!(s.reminders[0].next_due, Some(at(30)));
    }

    #[test]
    fn try_start_gates_on_startability() {
        let s = configured().add_reminder(Reminder::new("New reminder", 30));
        let err = s.try_start(at(0)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::NotStartable { index: 2, .. })
        ));
        assert!(configured().try_start(at(0)).is_ok());
    }

    #[test]
    fn todo_ops_touch_only_target() {
        let s = configured().start(at(0));
        let next = s.complete_todo(1, "Stand up", at(2));
        assert_eq!(next.reminders[0], s.reminders[0]);
        assert!(next.reminders[1].todo("Stand up").unwrap().complete);
        assert_eq!(next.is_iteration_complete(1), Some(false));

        let next = next.complete_todo(1, "Walk", at(3));
        assert_eq!(next.reminders[1].completed, 1);
        assert_eq!(next.reminders[1].next_due, Some(at(48)));
    }

    #[test]
    fn child_todo_ops_address_child() {
        let s = configured().start(at(0)).complete_child_todo(1, "Stretch", at(5));
        let child = s.reminders[1].child().unwrap();
        assert_eq!(child.completed, 1);
        assert_eq!(child.next_due, Some(at(10)));
        assert_eq!(s.reminders[1].completed, 0);
    }

    #[test]
    fn lookup_misses_are_noops() {
        let s = configured().start(at(0));
        assert_eq!(s.complete_todo(9, "Stand up", at(1)), s);
        assert_eq!(s.complete_todo(1, "Nap", at(1)), s);
        assert_eq!(s.uncomplete_todo(9, "Walk"), s);
        assert_eq!(s.complete_child_todo(0, "Stretch", at(1)), s);
        assert_eq!(s.uncomplete_child_todo(9, "Stretch"), s);
        assert_eq!(s.is_iteration_complete(9), None);
        let cfg = ReminderConfig::new("X", 1, ["a"]);
        assert_eq!(s.update_reminder_config(9, &cfg), s);
    }

    #[test]
    fn strict_lookups_report_misses() {
        let s = configured().start(at(0));
        assert!(matches!(
            s.try_complete_todo(9, "Stand up", at(1)),
            Err(CoreError::NotFound(LookupError::ReminderIndex { index: 9, len: 2 }))
        ));
        assert!(matches!(
            s.try_complete_todo(1, "Nap", at(1)),
            Err(CoreError::NotFound(LookupError::Todo { .. }))
        ));
        assert!(matches!(
            s.try_complete_child_todo(0, "Stretch", at(1)),
            Err(CoreError::NotFound(LookupError::NoChild { index: 0 }))
        ));
        assert!(matches!(
            s.try_uncomplete_child_todo(1, "Nap"),
            Err(CoreError::NotFound(LookupError::Todo { .. }))
        ));
        let ok = s.try_complete_child_todo(1, "Stretch", at(1)).unwrap();
        assert_eq!(ok.reminders[1].child().unwrap().completed, 1);
        let ok = s.try_complete_todo(1, "Walk", at(1)).unwrap();
        let ok = ok.try_uncomplete_todo(1, "Walk").unwrap();
        assert_eq!(ok, s);
    }

    #[test]
    fn edits_refused_while_running() {
        let s = configured().start(at(0));
        assert!(matches!(
            s.try_add_reminder(Reminder::new("Late", 10)),
            Err(CoreError::SessionRunning)
        ));
        let target = s.reminders[0].clone();
        assert!(matches!(
            s.try_remove_reminder(&target),
            Err(CoreError::SessionRunning)
        ));
        let stopped = s.stop(at(1));
        assert_eq!(stopped.try_remove_reminder(&target).unwrap().reminders.len(), 1);
    }

    #[test]
    fn remove_by_identity() {
        let s = configured();
        let twin = ReminderConfig::new("Eyes", 20, ["Look far away"]).build().unwrap();
        let s = s.add_reminder(twin.clone());
        let removed = s.remove_reminder(&s.reminders[0].clone());
        assert_eq!(removed.reminders.len(), 2);
        assert_eq!(removed.reminders[1].id, twin.id);

        let stranger = Reminder::new("Stranger", 5);
        assert_eq!(s.remove_reminder(&stranger), s);
        assert!(matches!(
            s.try_remove_reminder(&stranger),
            Err(CoreError::NotFound(LookupError::ReminderId(_)))
        ));
    }

    #[test]
    fn update_config_handles_child_cases() {
        let s = configured();

        let with_child = s.update_reminder_config(
            0,
            &ReminderConfig::new("Eyes", 20, ["Look far away"])
                .with_child(ReminderConfig::new("Blink", 1, ["Blink"])),
        );
        assert_eq!(with_child.reminders[0].child().unwrap().name, "Blink");

        let without_child = with_child.update_reminder_config(
            1,
            &ReminderConfig::new("Posture", 60, ["Stand up"]),
        );
        assert!(without_child.reminders[1].child().is_none());
        assert_eq!(without_child.reminders[1].interval, 60);
        assert_eq!(without_child.reminders[1].id, s.reminders[1].id);
    }

    #[test]
    fn try_update_validates() {
        let s = configured();
        assert!(matches!(
            s.try_update_reminder_config(0, &ReminderConfig::new("", 20, ["a"])),
            Err(CoreError::Validation(ValidationError::EmptyName { .. }))
        ));
        assert!(matches!(
            s.try_update_reminder_config(5, &ReminderConfig::new("Eyes", 20, ["a"])),
            Err(CoreError::NotFound(_))
        ));
        let updated = s
            .try_update_reminder_config(0, &ReminderConfig::new("Eyes", 25, ["a"]))
            .unwrap();
        assert_eq!(updated.reminders[0].interval, 25);
    }
}
