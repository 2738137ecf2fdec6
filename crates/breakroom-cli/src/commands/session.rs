use breakroom_core::{Clock, Config, SessionState, SystemClock};
use clap::Subcommand;
use serde_json::json;

use super::{print_json, print_transition, CmdResult};
use crate::store::SessionStore;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start (or restart) the session; every reminder must be startable
    Start,
    /// Stop the running session
    Stop,
    /// Print session state and the active reminder views as JSON
    Status,
}

pub fn run(action: SessionAction) -> CmdResult {
    let store = SessionStore::open()?;
    let session = store.load_session()?;
    let now = SystemClock.now();

    match action {
        SessionAction::Start => {
            let next = session.try_start(now)?;
            store.save_session(&next)?;
            print_transition(&session, &next, now)?;
        }
        SessionAction::Stop => {
            if !session.is_running() {
                return Err("session is not running".into());
            }
            let next = session.stop(now);
            store.save_session(&next)?;
            print_transition(&session, &next, now)?;
        }
        SessionAction::Status => {
            let views = if session.state() == SessionState::Running {
                Config::load()?.arbiter().views(&session, now)
            } else {
                Vec::new()
            };
            print_json(&json!({
                "state": session.state(),
                "started": session.started,
                "stopped": session.stopped,
                "startable": session.is_startable(),
                "views": views,
                "labels": views.iter().map(|v| v.label()).collect::<Vec<_>>(),
            }))?;
        }
    }
    Ok(())
}
