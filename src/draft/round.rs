//! Per-round pick collection and the round barrier.

use super::error::{DraftError, DraftErrorKind};
use super::hands::SeatAssignment;
use super::item::Item;
use super::participant::ParticipantId;
use tracing::{debug, instrument};

/// What the barrier decided after an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Someone has not picked yet.
    Waiting,
    /// Everyone picked; round counter advanced and seats rotated.
    Advanced,
    /// Every bank is full.
    Completed,
}

/// Hands, banks, seats and the round counter of a running draft.
///
/// Participants are addressed by roster position.
#[derive(Debug, Clone)]
pub struct RoundSynchronizer {
    round: usize,
    final_bank_size: usize,
    hands: Vec<Vec<Item>>,
    banks: Vec<Vec<Item>>,
    seats: SeatAssignment,
}

impl RoundSynchronizer {
    /// Seats participant `i` at hand `i` with empty banks.
    pub fn new(hands: Vec<Vec<Item>>, final_bank_size: usize) -> Self {
        let seat_count = hands.len();
        Self {
            round: 0,
            final_bank_size,
            hands,
            banks: vec![Vec::with_capacity(final_bank_size); seat_count],
            seats: SeatAssignment::identity(seat_count),
        }
    }

    /// Current round, starting at 0.
    pub fn round(&self) -> usize {
        self.round
    }

    /// Current seat assignment.
    pub fn seats(&self) -> &SeatAssignment {
        &self.seats
    }

    /// Hand currently viewed by the participant at `ordinal`.
    pub fn hand_for(&self, ordinal: usize) -> Option<&[Item]> {
        let seat = self.seats.seat_of(ordinal)?;
        self.hands.get(seat).map(Vec::as_slice)
    }

    /// Items banked by the participant at `ordinal`.
    pub fn bank_for(&self, ordinal: usize) -> Option<&[Item]> {
        self.banks.get(ordinal).map(Vec::as_slice)
    }

    /// True once the participant at `ordinal` picked this round.
    pub fn has_responded(&self, ordinal: usize) -> bool {
        self.banks
            .get(ordinal)
            .is_some_and(|bank| bank.len() > self.round)
    }

    /// Items currently sitting in hands.
    pub fn items_in_hands(&self) -> usize {
        self.hands.iter().map(Vec::len).sum()
    }

    /// Items currently sitting in banks.
    pub fn items_in_banks(&self) -> usize {
        self.banks.iter().map(Vec::len).sum()
    }

    /// Moves one item from the participant's current hand into their bank.
    ///
    /// # Errors
    ///
    /// - `UnknownParticipant` if `ordinal` is not seated
    /// - `StalePick` if the participant already picked this round
    /// - `InvalidIndex` if `index` is outside the hand
    #[instrument(skip(self, participant), fields(round = self.round, participant = %participant))]
    pub fn submit_pick(
        &mut self,
        ordinal: usize,
        participant: &ParticipantId,
        index: usize,
    ) -> Result<Item, DraftError> {
        let seat = self
            .seats
            .seat_of(ordinal)
            .ok_or_else(|| DraftErrorKind::UnknownParticipant(participant.clone()))?;

        let banked = self.banks.get(ordinal).map(Vec::len).ok_or_else(|| {
            DraftError::internal(format!("no bank for roster position {}", ordinal))
        })?;
        if banked != self.round {
            return Err(DraftErrorKind::StalePick(participant.clone()).into());
        }

        let hand = self
            .hands
            .get_mut(seat)
            .ok_or_else(|| DraftError::internal(format!("no hand at seat {}", seat)))?;
        if index >= hand.len() {
            return Err(DraftErrorKind::InvalidIndex {
                index,
                hand_size: hand.len(),
            }
            .into());
        }

        let item = hand.remove(index);
        self.banks[ordinal].push(item.clone());
        debug!(seat, index, item = %item, "Pick banked");
        Ok(item)
    }

    /// Runs the completion check, then the round-advance check.
    ///
    /// Completion wins: a draft whose banks are full never rotates again.
    #[instrument(skip(self), fields(round = self.round))]
    pub fn evaluate(&mut self) -> RoundOutcome {
        if self
            .banks
            .iter()
            .all(|bank| bank.len() == self.final_bank_size)
        {
            debug!("Every bank is full");
            return RoundOutcome::Completed;
        }

        if self.banks.iter().all(|bank| bank.len() == self.round + 1) {
            self.round += 1;
            self.seats = self.seats.rotate();
            debug!(round = self.round, "Round advanced");
            return RoundOutcome::Advanced;
        }

        RoundOutcome::Waiting
    }
}
