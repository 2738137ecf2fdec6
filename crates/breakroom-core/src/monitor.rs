//! Periodic re-evaluation of reminder status.
//!
//! Time passing produces no event of its own, so the monitor polls: every
//! period it clones the latest [`Session`] out of a `watch` channel (one
//! consistent snapshot per tick), runs arbitration over it and reports what
//! changed since the previous tick.
//!
//! ```ignore
//! let (tx, rx) = tokio::sync::watch::channel(session);
//! let (events_tx, mut events) = tokio::sync::mpsc::unbounded_channel();
//! let handle = ReminderMonitor::new(Arc::new(SystemClock)).spawn(rx, events_tx);
//! // ...
//! handle.shutdown().await;
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::arbitration::{ActiveSide, Arbiter, ReminderStatus};
use crate::clock::Clock;
use crate::events::Event;
use crate::session::Session;

/// Default polling period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Remembers what each reminder looked like on the previous tick.
#[derive(Debug, Default)]
pub struct StatusTracker {
    run: Option<DateTime<Utc>>,
    last: HashMap<Uuid, (ActiveSide, ReminderStatus)>,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate one snapshot. Returns nothing while the session is not
    /// running; otherwise transition events followed by a status snapshot.
    pub fn evaluate(&mut self, arbiter: &Arbiter, session: &Session, now: DateTime<Utc>) -> Vec<Event> {
        if !session.is_running() {
            self.run = None;
            self.last.clear();
            return Vec::new();
        }
        if self.run != session.started {
            self.run = session.started;
            self.last.clear();
        }

        let views = arbiter.views(session, now);
        let mut events = Vec::new();
        for (reminder, view) in session.reminders.iter().zip(&views) {
            let current = (view.side, view.status);
            let previous = self.last.insert(reminder.id, current);

            if let Some((side, _)) = previous {
                if side != view.side {
                    events.push(Event::ActiveChanged {
                        reminder_index: view.index,
                        side: view.side,
                        name: view.name.clone(),
                        at: now,
                    });
                }
            }
            let was_overdue = previous.is_some_and(|(side, status)| {
                side == view.side && status == ReminderStatus::Overdue
            });
            if view.status == ReminderStatus::Overdue && !was_overdue {
                events.push(Event::BecameOverdue {
                    reminder_index: view.index,
                    side: view.side,
                    name: view.name.clone(),
                    at: now,
                });
            }
        }
        events.push(Event::StatusSnapshot { views, at: now });
        events
    }
}

pub struct ReminderMonitor {
    clock: Arc<dyn Clock>,
    arbiter: Arbiter,
    period: Duration,
}

impl ReminderMonitor {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            arbiter: Arbiter::default(),
            period: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_arbiter(mut self, arbiter: Arbiter) -> Self {
        self.arbiter = arbiter;
        self
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period.max(Duration::from_millis(1));
        self
    }

    /// Spawn the polling task on the current runtime.
    ///
    /// The task ends when the handle is cancelled, when the snapshot sender
    /// is dropped, or when the event receiver goes away.
    pub fn spawn(
        self,
        session: watch::Receiver<Session>,
        events: mpsc::UnboundedSender<Event>,
    ) -> MonitorHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let join = tokio::spawn(async move { self.run(session, events, token).await });
        MonitorHandle { cancel, join }
    }

    async fn run(
        self,
        session: watch::Receiver<Session>,
        events: mpsc::UnboundedSender<Event>,
        cancel: CancellationToken,
    ) {
        info!(period_ms = self.period.as_millis() as u64, "reminder monitor started");
        let mut tracker = StatusTracker::new();
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        'poll: loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    if session.has_changed().is_err() {
                        debug!("session sender dropped");
                        break;
                    }
                    let snapshot = session.borrow().clone();
                    for event in tracker.evaluate(&self.arbiter, &snapshot, self.clock.now()) {
                        if events.send(event).is_err() {
                            break 'poll;
                        }
                    }
                }
            }
        }
        info!("reminder monitor stopped");
    }
}

/// Owner-side handle of a spawned monitor.
pub struct MonitorHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl MonitorHandle {
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Cancel and wait for the task to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.join.await;
    }
}
