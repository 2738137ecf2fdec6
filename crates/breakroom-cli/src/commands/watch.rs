use std::sync::Arc;

use breakroom_core::{Clock, Config, Event, ReminderMonitor, StatusTracker, SystemClock};
use clap::Args;
use tokio::sync::{mpsc, watch};
use tracing::info;

use super::{print_json, CmdResult};
use crate::store::SessionStore;

#[derive(Args)]
pub struct WatchArgs {
    /// Evaluate once, print the status snapshot and exit
    #[arg(long)]
    once: bool,
}

pub fn run(args: WatchArgs) -> CmdResult {
    let config = Config::load()?;
    let store = SessionStore::open()?;

    if args.once {
        let session = store.load_session()?;
        let events = StatusTracker::new().evaluate(&config.arbiter(), &session, SystemClock.now());
        return print_json(&events);
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(watch_loop(config, store))
}

/// Run the monitor while re-reading the stored snapshot every period, so
/// edits made by other invocations reach it.
async fn watch_loop(config: Config, store: SessionStore) -> CmdResult {
    let (session_tx, session_rx) = watch::channel(store.load_session()?);
    let (events_tx, mut events) = mpsc::unbounded_channel::<Event>();
    let handle = ReminderMonitor::new(Arc::new(SystemClock))
        .with_arbiter(config.arbiter())
        .with_period(config.poll_interval())
        .spawn(session_rx, events_tx);

    let mut reload = tokio::time::interval(config.poll_interval());
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let result = loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("interrupted");
                break Ok(());
            }
            _ = reload.tick() => {
                let latest = match store.load_session() {
                    Ok(session) => session,
                    Err(err) => break Err(err),
                };
                session_tx.send_if_modified(|current| {
                    if *current == latest {
                        false
                    } else {
                        *current = latest;
                        true
                    }
                });
            }
            event = events.recv() => match event {
                Some(event) => {
                    if let Err(err) = print_json(&event) {
                        break Err(err);
                    }
                }
                None => break Ok(()),
            },
        }
    };

    handle.shutdown().await;
    result
}
