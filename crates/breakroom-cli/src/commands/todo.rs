use breakroom_core::{Clock, SystemClock};
use clap::Subcommand;

use super::{print_transition, CmdResult};
use crate::store::SessionStore;

#[derive(Subcommand)]
pub enum TodoAction {
    /// Mark a todo complete; finishing the checklist starts the next iteration
    Done {
        /// Reminder index
        index: usize,
        /// Todo name
        todo: String,
        /// Address the intermediate reminder instead
        #[arg(long)]
        child: bool,
    },
    /// Mark a todo incomplete again
    Undo {
        index: usize,
        todo: String,
        #[arg(long)]
        child: bool,
    },
}

pub fn run(action: TodoAction) -> CmdResult {
    let store = SessionStore::open()?;
    let session = store.load_session()?;
    if !session.is_running() {
        return Err("session is not running".into());
    }
    let now = SystemClock.now();

    let next = match action {
        TodoAction::Done { index, todo, child: false } => session.try_complete_todo(index, &todo, now)?,
        TodoAction::Done { index, todo, child: true } => {
            session.try_complete_child_todo(index, &todo, now)?
        }
        TodoAction::Undo { index, todo, child: false } => session.try_uncomplete_todo(index, &todo)?,
        TodoAction::Undo { index, todo, child: true } => session.try_uncomplete_child_todo(index, &todo)?,
    };

    store.save_session(&next)?;
    print_transition(&session, &next, now)
}
