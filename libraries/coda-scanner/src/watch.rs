//! Watch and timer triggers
//!
//! Both funnel into the same [`Scanner::scan_and_clean`] entry point as
//! manual scans. A trigger that loses the single-flight race is a logged
//! no-op, never queued. Both loops exit promptly on cancellation between
//! events/ticks; an in-flight scan runs to completion.

use crate::scan::{ScanOptions, Scanner};
use crate::{Result, ScanError};
use notify::{Event, EventKind, RecursiveMode};
use notify_debouncer_full::{new_debouncer, DebounceEventResult};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Debounce window for filesystem events.
const DEBOUNCE_MS: u64 = 500;

impl Scanner {
    /// Watch every root for filesystem changes and rescan on relevant
    /// events until cancelled.
    ///
    /// # Errors
    ///
    /// Fails only during setup (creating or registering a watcher);
    /// scan failures inside the loop are logged and the loop continues.
    pub async fn execute_watch(&self, cancel: CancellationToken) -> Result<()> {
        let (event_tx, mut event_rx) = mpsc::channel::<()>(64);

        // The debouncers own the OS watchers, so they stay alive for the
        // whole loop
        let mut debouncers = Vec::new();
        for root in self.roots.iter() {
            let event_tx = event_tx.clone();
            let mut debouncer = new_debouncer(
                Duration::from_millis(DEBOUNCE_MS),
                None,
                move |result: DebounceEventResult| match result {
                    Ok(events) => {
                        if events.iter().any(|event| is_relevant(&event.event)) {
                            let _ = event_tx.blocking_send(());
                        }
                    }
                    Err(errors) => {
                        for error in errors {
                            error!(%error, "watcher error");
                        }
                    }
                },
            )?;
            debouncer.watch(&root.path, RecursiveMode::Recursive)?;
            info!(path = %root.path.display(), "watching root");
            debouncers.push(debouncer);
        }
        drop(event_tx);

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                event = event_rx.recv() => {
                    if event.is_none() {
                        break;
                    }
                    // Coalesce triggers that piled up while we were busy
                    while event_rx.try_recv().is_ok() {}
                    self.triggered_scan("watch").await;
                }
            }
        }

        info!("watch loop stopped");
        Ok(())
    }

    /// Rescan on a fixed interval until cancelled.
    pub async fn run_periodic(&self, every: Duration, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately; scan-at-start is its own
        // setting
        interval.tick().await;

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = interval.tick() => self.triggered_scan("timer").await,
            }
        }

        info!("periodic scan loop stopped");
    }

    /// One incremental scan on behalf of a background trigger.
    async fn triggered_scan(&self, trigger: &str) {
        match self.scan_and_clean(ScanOptions::default()).await {
            Ok(summary) => debug!(
                trigger,
                seen = summary.seen_tracks,
                new = summary.new_tracks,
                "triggered scan finished"
            ),
            Err(ScanError::AlreadyScanning) => {
                debug!(trigger, "scan already running, trigger skipped");
            }
            Err(error) => warn!(trigger, %error, "triggered scan failed"),
        }
    }
}

/// Only mutations matter; access and metadata chatter does not.
fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_create_event_is_relevant() {
        let event = Event {
            kind: EventKind::Create(notify::event::CreateKind::File),
            paths: vec![PathBuf::from("/music/track.flac")],
            attrs: Default::default(),
        };
        assert!(is_relevant(&event));
    }

    #[test]
    fn test_remove_event_is_relevant() {
        let event = Event {
            kind: EventKind::Remove(notify::event::RemoveKind::File),
            paths: vec![PathBuf::from("/music/track.flac")],
            attrs: Default::default(),
        };
        assert!(is_relevant(&event));
    }

    #[test]
    fn test_access_event_is_ignored() {
        let event = Event {
            kind: EventKind::Access(notify::event::AccessKind::Read),
            paths: vec![PathBuf::from("/music/track.flac")],
            attrs: Default::default(),
        };
        assert!(!is_relevant(&event));
    }
}
