//! Transition results and the notifications built from them.

use super::error::SessionId;
use super::item::Item;
use super::participant::Participant;
use serde::Serialize;

/// One participant's hand for the coming round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DealtHand {
    /// Who receives the hand.
    pub participant: Participant,
    /// Items to choose from, in pick-index order.
    pub items: Vec<Item>,
}

/// Everything a transport needs to deal a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundDeal {
    /// Session that advanced.
    pub session_id: SessionId,
    /// Round the hands belong to.
    pub round: usize,
    /// One hand per participant, in roster order.
    pub hands: Vec<DealtHand>,
}

/// One participant's final picks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantBank {
    /// Owner of the bank.
    pub participant: Participant,
    /// Picks in the order they were made.
    pub items: Vec<Item>,
}

/// Final state of a completed draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftResult {
    /// Session that completed.
    pub session_id: SessionId,
    /// One bank per participant, in roster order.
    pub banks: Vec<ParticipantBank>,
}

/// Outcome of evaluating the round barrier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Nothing to report.
    NoChange,
    /// A new round was dealt.
    RoundAdvanced(RoundDeal),
    /// The draft finished.
    Completed(DraftResult),
}

/// Outbound notification consumed by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DraftEvent {
    /// Hands are ready for a round.
    ReadyToDeal(RoundDeal),
    /// The draft completed.
    Completed(DraftResult),
}

impl DraftEvent {
    /// Session the event belongs to.
    pub fn session_id(&self) -> &str {
        match self {
            Self::ReadyToDeal(deal) => &deal.session_id,
            Self::Completed(result) => &result.session_id,
        }
    }
}
