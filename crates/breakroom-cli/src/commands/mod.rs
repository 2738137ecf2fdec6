pub mod config;
pub mod reminder;
pub mod session;
pub mod todo;
pub mod watch;

use breakroom_core::{transition_events, Session};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print what changed between two snapshots as a JSON array of events.
pub fn print_transition(before: &Session, after: &Session, now: DateTime<Utc>) -> CmdResult {
    print_json(&transition_events(before, after, now))
}
