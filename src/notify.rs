//! Delivery of draft notifications to the transport layer.

use crate::draft::DraftEvent;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};

/// Receives draft notifications.
///
/// Called only after the session lock is released, so implementations may
/// block on network I/O.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Delivers one notification.
    async fn deliver(&self, event: DraftEvent);
}

/// Forwards notifications into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<DraftEvent>,
}

impl ChannelSink {
    /// Creates a sink and the receiver that drains it.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DraftEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl EventSink for ChannelSink {
    #[instrument(skip_all, fields(session_id = %event.session_id()))]
    async fn deliver(&self, event: DraftEvent) {
        if self.tx.send(event).is_err() {
            warn!("Event receiver dropped");
        }
    }
}

/// Renders notifications through tracing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl EventSink for LogSink {
    async fn deliver(&self, event: DraftEvent) {
        match event {
            DraftEvent::ReadyToDeal(deal) => {
                for hand in &deal.hands {
                    let choices: Vec<_> = hand
                        .items
                        .iter()
                        .enumerate()
                        .map(|(i, item)| format!("{}: {}", i, item.label()))
                        .collect();
                    info!(
                        session_id = %deal.session_id,
                        round = deal.round,
                        participant = %hand.participant.name(),
                        channel = %hand.participant.channel(),
                        choices = %choices.join(", "),
                        "Round {}: {}, please make your next pick",
                        deal.round,
                        hand.participant.name()
                    );
                }
            }
            DraftEvent::Completed(result) => {
                for bank in &result.banks {
                    let picks: Vec<_> = bank.items.iter().map(|item| item.label()).collect();
                    info!(
                        session_id = %result.session_id,
                        participant = %bank.participant.name(),
                        channel = %bank.participant.channel(),
                        picks = %picks.join(", "),
                        "Draft has ended"
                    );
                }
            }
        }
    }
}
