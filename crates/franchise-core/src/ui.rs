//! Message bridge from the league worker to the UI.
//!
//! Messages are fire-and-forget over an unbounded channel, except the auto
//! play dialog which carries a oneshot sender for the user's answer. A
//! closed channel is not an error: the league keeps running headless.

use franchise_types::{LocalUpdate, LogEvent, Phase, RepeatSeasonKind, UpcomingGame};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// Identifies the UI client an operation was requested from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Conditions {
    /// Client (tab) ID, `None` for broadcast.
    pub client_id: Option<u32>,
}

/// Season and phase the user asked auto play to stop at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoPlayTarget {
    /// Target season.
    pub season: i32,
    /// Target phase within that season.
    pub phase: Phase,
}

/// A message for the UI.
#[derive(Debug)]
pub enum UiMessage {
    /// Merge fields into the UI's local state.
    UpdateLocal(LocalUpdate),
    /// Merge upcoming games into the UI's game bar.
    MergeGames(Vec<UpcomingGame>),
    /// Show the support-the-game modal.
    ShowModal {
        /// Requesting client.
        conditions: Conditions,
    },
    /// Ask how far to auto play.
    AutoPlayDialog {
        /// Current season.
        season: i32,
        /// Active replay kind, if any.
        repeat_season: Option<RepeatSeasonKind>,
        /// Requesting client.
        conditions: Conditions,
        /// Answer channel; `None` cancels.
        reply: oneshot::Sender<Option<AutoPlayTarget>>,
    },
    /// Show a narrative event as a notification.
    Notification {
        /// The event.
        event: Box<LogEvent>,
        /// Requesting client.
        conditions: Conditions,
    },
}

/// Sending half of the UI channel.
#[derive(Debug, Clone)]
pub struct UiBridge {
    tx: mpsc::UnboundedSender<UiMessage>,
}

impl UiBridge {
    /// Create a bridge and the receiver the UI drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UiMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Send a message. Dropped silently when the UI is gone.
    pub fn send(&self, msg: UiMessage) {
        if self.tx.send(msg).is_err() {
            debug!("UI channel closed, message dropped");
        }
    }

    /// Show the auto play dialog and wait for the answer.
    ///
    /// Returns `None` when the user cancels or the UI is gone.
    pub async fn auto_play_dialog(
        &self,
        season: i32,
        repeat_season: Option<RepeatSeasonKind>,
        conditions: Conditions,
    ) -> Option<AutoPlayTarget> {
        let (reply, answer) = oneshot::channel();
        self.send(UiMessage::AutoPlayDialog {
            season,
            repeat_season,
            conditions,
            reply,
        });
        answer.await.ok().flatten()
    }
}
