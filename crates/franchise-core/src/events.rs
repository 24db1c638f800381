//! Narrative events for the news feed.

use chrono::Utc;
use franchise_types::{EventId, EventKind, LogEvent, Pid, Tid};
use tracing::info;

use crate::league::Txn;
use crate::ui::{Conditions, UiMessage};

/// Fields of an event before it is stamped with an ID, season, and time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventInput {
    /// Category tag.
    pub kind: EventKind,
    /// HTML body.
    pub text: String,
    /// Teams involved.
    pub tids: Vec<Tid>,
    /// Players involved.
    pub pids: Vec<Pid>,
    /// Feed importance.
    pub score: u32,
    /// Surface a notification.
    pub show_notification: bool,
    /// Keep the notification until dismissed.
    pub persistent: bool,
    /// Write the event to the events store.
    pub save_to_db: bool,
}

impl EventInput {
    /// A saved, non-persistent event with a notification and no score.
    pub fn new(kind: EventKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            tids: Vec::new(),
            pids: Vec::new(),
            score: 0,
            show_notification: true,
            persistent: false,
            save_to_db: true,
        }
    }
}

/// Record an event in the current operation.
///
/// Saved events go to the cached events store; notifications are queued
/// for the UI and only delivered when the operation commits.
pub fn log_event(txn: &mut Txn, input: EventInput, conditions: Conditions) -> LogEvent {
    let event = LogEvent {
        id: EventId::new(),
        kind: input.kind,
        text: input.text,
        tids: input.tids,
        pids: input.pids,
        season: txn.g.season,
        score: input.score,
        show_notification: input.show_notification,
        persistent: input.persistent,
        save_to_db: input.save_to_db,
        created_at: Utc::now(),
    };

    info!(
        kind = ?event.kind,
        season = event.season,
        score = event.score,
        "{}",
        event.text
    );

    if event.save_to_db {
        txn.cache.events.put(event.clone());
    }
    if event.show_notification {
        txn.send(UiMessage::Notification {
            event: Box::new(event.clone()),
            conditions,
        });
    }

    event
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn saved_events_land_in_cache_and_outbox() {
        let (league, _rx) = testing::league();
        let mut txn = league.begin();

        let mut input = EventInput::new(EventKind::TeamLogo, "New logo.");
        input.tids = vec![Tid::new(1)];
        let event = log_event(&mut txn, input, Conditions::default());

        assert_eq!(event.season, 2025);
        assert!(txn.cache.events.contains(&event.id));
        assert!(matches!(
            txn.outbox(),
            [UiMessage::Notification { event: e, .. }] if e.id == event.id
        ));
    }

    #[test]
    fn unsaved_silent_events_leave_no_trace() {
        let (league, _rx) = testing::league();
        let mut txn = league.begin();

        let mut input = EventInput::new(EventKind::Error, "Nope.");
        input.save_to_db = false;
        input.show_notification = false;
        log_event(&mut txn, input, Conditions::default());

        assert!(txn.cache.events.is_empty());
        assert!(txn.outbox().is_empty());
    }
}
