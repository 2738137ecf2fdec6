use breakroom_core::{Config, ReminderConfig};
use clap::Subcommand;

use super::{print_json, CmdResult};
use crate::store::SessionStore;

#[derive(Subcommand)]
pub enum ReminderAction {
    /// Add a reminder; unset fields come from the configured template
    Add {
        #[arg(long)]
        name: Option<String>,
        /// Interval in minutes
        #[arg(long)]
        interval: Option<u32>,
        /// Todo name (repeatable)
        #[arg(long = "todo")]
        todos: Vec<String>,
        /// Attach the default intermediate reminder
        #[arg(long)]
        intermediate: bool,
    },
    /// Edit the reminder at INDEX; unset fields keep their current value
    Edit {
        index: usize,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        interval: Option<u32>,
        /// Replacement todo list (repeatable)
        #[arg(long = "todo")]
        todos: Vec<String>,
        /// Attach the default intermediate reminder if there is none
        #[arg(long)]
        intermediate: bool,
        #[arg(long)]
        child_name: Option<String>,
        #[arg(long)]
        child_interval: Option<u32>,
        /// Replacement intermediate todo list (repeatable)
        #[arg(long = "child-todo")]
        child_todos: Vec<String>,
        /// Drop the intermediate reminder
        #[arg(long, conflicts_with_all = ["intermediate", "child_name", "child_interval", "child_todos"])]
        no_child: bool,
    },
    /// Remove the reminder at INDEX
    Remove { index: usize },
    /// Print configured reminders as JSON
    List,
}

pub fn run(action: ReminderAction) -> CmdResult {
    let store = SessionStore::open()?;
    let session = store.load_session()?;

    match action {
        ReminderAction::Add {
            name,
            interval,
            todos,
            intermediate,
        } => {
            let config = Config::load()?;
            let mut cfg = config.defaults.reminder.clone();
            if let Some(name) = name {
                cfg.name = name;
            }
            if let Some(interval) = interval {
                cfg.interval = interval;
            }
            if !todos.is_empty() {
                cfg.todos = todos;
            }
            if intermediate {
                cfg = cfg.with_child(config.defaults.intermediate.clone());
            }
            let next = session.try_add_reminder(cfg.build()?)?;
            store.save_session(&next)?;
            if let Some(added) = next.reminders.last() {
                print_json(added)?;
            }
        }
        ReminderAction::Edit {
            index,
            name,
            interval,
            todos,
            intermediate,
            child_name,
            child_interval,
            child_todos,
            no_child,
        } => {
            let mut cfg = ReminderConfig::from_reminder(session.reminder(index)?);
            if let Some(name) = name {
                cfg.name = name;
            }
            if let Some(interval) = interval {
                cfg.interval = interval;
            }
            if !todos.is_empty() {
                cfg.todos = todos;
            }

            let wants_child = intermediate
                || child_name.is_some()
                || child_interval.is_some()
                || !child_todos.is_empty();
            if no_child {
                cfg.child = None;
            } else if wants_child && cfg.child.is_none() {
                let template = Config::load()?.defaults.intermediate;
                cfg.child = Some(Box::new(template));
            }
            if let Some(child) = cfg.child.as_mut() {
                if let Some(name) = child_name {
                    child.name = name;
                }
                if let Some(interval) = child_interval {
                    child.interval = interval;
                }
                if !child_todos.is_empty() {
                    child.todos = child_todos;
                }
            }

            let next = session.try_update_reminder_config(index, &cfg)?;
            store.save_session(&next)?;
            print_json(&next.reminders[index])?;
        }
        ReminderAction::Remove { index } => {
            let target = session.reminder(index)?.clone();
            let next = session.try_remove_reminder(&target)?;
            store.save_session(&next)?;
            print_json(&target)?;
        }
        ReminderAction::List => {
            print_json(&session.reminders)?;
        }
    }
    Ok(())
}
