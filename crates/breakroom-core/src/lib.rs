//! # Breakroom Core Library
//!
//! Business logic for Breakroom, a work-break reminder tool. A session holds
//! a list of recurring reminders; each reminder carries a todo checklist and
//! optionally one nested "intermediate" reminder. Completing every todo
//! closes an iteration and schedules the next one.
//!
//! ## Architecture
//!
//! - **Reminder Engine**: pure transitions over [`Reminder`] snapshots
//!   (`start`, `renew`, `complete_iteration`, todo completion). Every
//!   transition takes `now` explicitly.
//! - **Session**: [`Session`] operations delegate to the engine and return a
//!   new snapshot; the caller owns the current one.
//! - **Arbitration**: [`Arbiter`] picks which of a parent and its child is
//!   active and computes due/overdue status for display.
//! - **Monitor**: [`ReminderMonitor`] re-runs arbitration on a fixed period
//!   and reports changes as [`Event`]s.
//! - **Storage**: TOML [`Config`] only; sessions are never persisted here.

pub mod arbitration;
pub mod clock;
pub mod error;
pub mod events;
pub mod monitor;
pub mod reminder;
pub mod session;
pub mod storage;

pub use arbitration::{ActiveSide, Arbiter, ReminderStatus, ReminderView};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, LookupError, Result, ValidationError};
pub use events::{transition_events, Event};
pub use monitor::{MonitorHandle, ReminderMonitor, StatusTracker};
pub use reminder::{Reminder, ReminderConfig, ReminderState, Todo};
pub use session::{Session, SessionState};
pub use storage::Config;
