//! Draft session aggregate: configuration, roster, lifecycle and status.

use super::error::{DraftError, DraftErrorKind, SessionId};
use super::events::{DealtHand, DraftResult, ParticipantBank, RoundDeal, Transition};
use super::hands::{self, Deal, SeatAssignment};
use super::item::Item;
use super::participant::{Participant, ParticipantId};
use super::round::{RoundOutcome, RoundSynchronizer};
use derive_getters::Getters;
use derive_new::new;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, instrument, warn};

/// Hand and bank sizes of a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Serialize, Deserialize, new)]
pub struct SessionSettings {
    /// Items dealt into each hand at the start.
    initial_hand_size: usize,
    /// Picks each participant keeps.
    final_bank_size: usize,
}

impl SessionSettings {
    /// Checks that the bank is positive and fits inside a hand.
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.initial_hand_size == 0 {
            return Err(DraftErrorKind::InvalidConfiguration(
                "the hand size must be set before starting".to_string(),
            )
            .into());
        }
        if self.final_bank_size == 0 || self.final_bank_size > self.initial_hand_size {
            return Err(DraftErrorKind::InvalidConfiguration(format!(
                "the final bank size must be between 1 and the hand size {}, it is {}",
                self.initial_hand_size, self.final_bank_size
            ))
            .into());
        }
        Ok(())
    }
}

/// Where a session is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Lifecycle {
    /// Being configured.
    Pending,
    /// Hands dealt, picks accepted.
    Active,
    /// Every bank is full.
    Completed,
    /// Stopped by the owner.
    Cancelled,
}

impl Lifecycle {
    /// True for `Completed` and `Cancelled`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Per-participant progress within the current round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantStatus {
    /// Participant identity.
    pub participant: ParticipantId,
    /// Display label.
    pub name: String,
    /// Whether a pick was made this round.
    pub responded: bool,
    /// Items banked so far.
    pub picks: usize,
}

/// Read-only view of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StatusSnapshot {
    /// Still being configured.
    NotStarted {
        /// Registered participants.
        participants: usize,
        /// Items in the pool.
        items: usize,
    },
    /// Picks are being collected.
    InProgress {
        /// Current round, starting at 0.
        round: usize,
        /// Rounds needed to finish.
        final_bank_size: usize,
        /// Per-participant progress, in roster order.
        participants: Vec<ParticipantStatus>,
    },
    /// Every bank is full.
    Completed,
    /// Stopped by the owner.
    Cancelled,
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted {
                participants,
                items,
            } => write!(
                f,
                "The draft has not yet begun ({} participants, {} items registered).",
                participants, items
            ),
            Self::InProgress {
                round,
                final_bank_size,
                participants,
            } => {
                let (responded, waiting): (Vec<_>, Vec<_>) =
                    participants.iter().partition(|p| p.responded);
                let names = |list: &[&ParticipantStatus]| {
                    list.iter()
                        .map(|p| p.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                writeln!(
                    f,
                    "The draft is in progress, round {} of {}.",
                    round + 1,
                    final_bank_size
                )?;
                writeln!(f, "Picked this round: {}", names(&responded))?;
                write!(f, "Still choosing: {}", names(&waiting))
            }
            Self::Completed => write!(f, "The draft has finished."),
            Self::Cancelled => write!(f, "The draft was cancelled."),
        }
    }
}

/// Where every item of the locked pool currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemCensus {
    /// Size of the pool when the draft started.
    pub pool: usize,
    /// Items still in hands.
    pub in_hands: usize,
    /// Items in banks.
    pub in_banks: usize,
    /// Items never dealt.
    pub undealt: usize,
}

impl ItemCensus {
    /// True when no item was lost or duplicated.
    pub fn is_conserved(&self) -> bool {
        self.in_hands + self.in_banks + self.undealt == self.pool
    }
}

/// One draft: configuration, roster, hands, banks and lifecycle.
///
/// Not internally synchronized; the registry wraps each session in its own
/// lock so every mutation runs in one exclusive section.
#[derive(Debug)]
pub struct DraftSession {
    id: SessionId,
    description: String,
    owner: ParticipantId,
    settings: SessionSettings,
    items: Vec<Item>,
    participants: Vec<Participant>,
    roster: HashMap<ParticipantId, usize>,
    lifecycle: Lifecycle,
    pool_size: usize,
    undealt: Vec<Item>,
    table: Option<RoundSynchronizer>,
}

impl DraftSession {
    /// Creates a pending session.
    #[instrument(skip(id, description, owner, settings), fields(session_id = %id, owner = %owner))]
    pub fn new(
        id: SessionId,
        description: String,
        owner: ParticipantId,
        settings: SessionSettings,
    ) -> Self {
        info!(description = %description, "Creating draft session");
        Self {
            id,
            description,
            owner,
            settings,
            items: Vec::new(),
            participants: Vec::new(),
            roster: HashMap::new(),
            lifecycle: Lifecycle::Pending,
            pool_size: 0,
            undealt: Vec::new(),
            table: None,
        }
    }

    /// Session id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Free-text description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Participant allowed to configure, start and cancel.
    pub fn owner(&self) -> &ParticipantId {
        &self.owner
    }

    /// Hand and bank sizes.
    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    /// Current lifecycle state.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Current round, 0 until the draft starts.
    pub fn round(&self) -> usize {
        self.table.as_ref().map_or(0, RoundSynchronizer::round)
    }

    /// Registered participants in roster order.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Items registered for the pool. Empty once the draft starts.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    fn ensure_pending(&self) -> Result<(), DraftError> {
        if self.lifecycle != Lifecycle::Pending {
            warn!(session_id = %self.id, lifecycle = %self.lifecycle, "Change rejected after start");
            return Err(DraftErrorKind::AlreadyStarted.into());
        }
        Ok(())
    }

    /// Replaces hand and bank sizes.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn configure(&mut self, settings: SessionSettings) -> Result<(), DraftError> {
        self.ensure_pending()?;
        self.settings = settings;
        debug!("Settings updated");
        Ok(())
    }

    /// Replaces the item pool. Returns the pool size.
    #[instrument(skip(self, items), fields(session_id = %self.id, count = items.len()))]
    pub fn set_items(&mut self, items: Vec<Item>) -> Result<usize, DraftError> {
        self.ensure_pending()?;
        self.items = items;
        info!("Item pool replaced");
        Ok(self.items.len())
    }

    /// Replaces the roster. Returns the participant count.
    ///
    /// # Errors
    ///
    /// `DuplicateParticipant` if an identity appears twice.
    #[instrument(skip(self, participants), fields(session_id = %self.id, count = participants.len()))]
    pub fn set_participants(&mut self, participants: Vec<Participant>) -> Result<usize, DraftError> {
        self.ensure_pending()?;

        let mut roster = HashMap::with_capacity(participants.len());
        for (ordinal, participant) in participants.iter().enumerate() {
            if roster.insert(participant.id().clone(), ordinal).is_some() {
                warn!(participant = %participant.id(), "Duplicate participant");
                return Err(DraftErrorKind::DuplicateParticipant(participant.id().clone()).into());
            }
        }

        self.participants = participants;
        self.roster = roster;
        info!("Roster replaced");
        Ok(self.participants.len())
    }

    /// Starts the draft with the thread-local RNG.
    pub fn start(&mut self) -> Result<RoundDeal, DraftError> {
        self.start_with_rng(&mut rand::thread_rng())
    }

    /// Validates, deals hands and activates the session.
    ///
    /// Returns the round-0 deal.
    ///
    /// # Errors
    ///
    /// - `AlreadyStarted` / `AlreadyTerminal` if not pending
    /// - `InvalidConfiguration` for unusable hand or bank sizes
    /// - `InsufficientParticipants` with fewer than two participants
    /// - `InsufficientItems` if the pool cannot fill every hand
    #[instrument(skip(self, rng), fields(session_id = %self.id))]
    pub fn start_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<RoundDeal, DraftError> {
        if self.lifecycle.is_terminal() {
            return Err(DraftErrorKind::AlreadyTerminal.into());
        }
        self.ensure_pending()?;
        self.settings.validate()?;

        let seat_count = self.participants.len();
        if seat_count < 2 {
            return Err(DraftErrorKind::InsufficientParticipants(seat_count).into());
        }

        let pool_size = self.items.len();
        let required = seat_count
            .checked_mul(self.settings.initial_hand_size)
            .unwrap_or(usize::MAX);
        if required > pool_size {
            return Err(DraftErrorKind::InsufficientItems {
                required,
                available: pool_size,
            }
            .into());
        }

        // The pool is locked from here on.
        let Deal { hands, undealt } = hands::deal(
            std::mem::take(&mut self.items),
            seat_count,
            self.settings.initial_hand_size,
            rng,
        )?;

        self.pool_size = pool_size;
        self.undealt = undealt;
        self.table = Some(RoundSynchronizer::new(hands, self.settings.final_bank_size));
        self.lifecycle = Lifecycle::Active;

        info!(
            participants = seat_count,
            pool = pool_size,
            hand_size = self.settings.initial_hand_size,
            bank_size = self.settings.final_bank_size,
            "Draft started"
        );
        self.round_deal()
    }

    fn ordinal_of(&self, participant: &ParticipantId) -> Result<usize, DraftError> {
        self.roster
            .get(participant)
            .copied()
            .ok_or_else(|| DraftErrorKind::UnknownParticipant(participant.clone()).into())
    }

    fn table_mut(&mut self) -> Result<&mut RoundSynchronizer, DraftError> {
        self.table
            .as_mut()
            .ok_or_else(|| DraftError::internal("active session without a table"))
    }

    fn table(&self) -> Result<&RoundSynchronizer, DraftError> {
        self.table
            .as_ref()
            .ok_or_else(|| DraftError::internal("active session without a table"))
    }

    /// Banks one item from the participant's current hand.
    ///
    /// # Errors
    ///
    /// - `NotActive` unless the session is active
    /// - `UnknownParticipant`, `StalePick`, `InvalidIndex` from the round barrier
    #[instrument(skip(self, participant), fields(session_id = %self.id, participant = %participant))]
    pub fn pick(&mut self, participant: &ParticipantId, index: usize) -> Result<Item, DraftError> {
        if self.lifecycle != Lifecycle::Active {
            return Err(DraftErrorKind::NotActive.into());
        }
        let ordinal = self.ordinal_of(participant)?;
        let item = self.table_mut()?.submit_pick(ordinal, participant, index)?;
        info!(index, item = %item, "Pick accepted");
        Ok(item)
    }

    /// Runs the completion and round-advance checks.
    ///
    /// Non-active sessions always report `NoChange`.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn evaluate(&mut self) -> Result<Transition, DraftError> {
        if self.lifecycle != Lifecycle::Active {
            return Ok(Transition::NoChange);
        }

        match self.table_mut()?.evaluate() {
            RoundOutcome::Waiting => Ok(Transition::NoChange),
            RoundOutcome::Advanced => {
                info!(round = self.round(), "Ready to deal");
                Ok(Transition::RoundAdvanced(self.round_deal()?))
            }
            RoundOutcome::Completed => {
                self.lifecycle = Lifecycle::Completed;
                info!("Draft completed");
                Ok(Transition::Completed(self.result()?))
            }
        }
    }

    /// Read-only status snapshot.
    pub fn status(&self) -> StatusSnapshot {
        match (self.lifecycle, self.table.as_ref()) {
            (Lifecycle::Pending, _) => StatusSnapshot::NotStarted {
                participants: self.participants.len(),
                items: self.items.len(),
            },
            (Lifecycle::Active, Some(table)) => StatusSnapshot::InProgress {
                round: table.round(),
                final_bank_size: self.settings.final_bank_size,
                participants: self
                    .participants
                    .iter()
                    .enumerate()
                    .map(|(ordinal, p)| ParticipantStatus {
                        participant: p.id().clone(),
                        name: p.name().clone(),
                        responded: table.has_responded(ordinal),
                        picks: table.bank_for(ordinal).map_or(0, <[Item]>::len),
                    })
                    .collect(),
            },
            (Lifecycle::Active, None) => {
                let _logged =
                    DraftError::internal(format!("active session {} without a table", self.id));
                StatusSnapshot::NotStarted {
                    participants: self.participants.len(),
                    items: self.items.len(),
                }
            }
            (Lifecycle::Completed, _) => StatusSnapshot::Completed,
            (Lifecycle::Cancelled, _) => StatusSnapshot::Cancelled,
        }
    }

    /// Stops the session.
    ///
    /// # Errors
    ///
    /// `AlreadyTerminal` if already completed or cancelled.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn cancel(&mut self) -> Result<(), DraftError> {
        if self.lifecycle.is_terminal() {
            return Err(DraftErrorKind::AlreadyTerminal.into());
        }
        info!(from = %self.lifecycle, "Cancelling draft");
        self.lifecycle = Lifecycle::Cancelled;
        Ok(())
    }

    /// Hand the participant currently views.
    pub fn hand_of(&self, participant: &ParticipantId) -> Result<&[Item], DraftError> {
        let ordinal = self.ordinal_of(participant)?;
        self.table()?
            .hand_for(ordinal)
            .ok_or_else(|| DraftError::internal("seated participant without a hand"))
    }

    /// Items the participant has banked.
    pub fn bank_of(&self, participant: &ParticipantId) -> Result<&[Item], DraftError> {
        let ordinal = self.ordinal_of(participant)?;
        self.table()?
            .bank_for(ordinal)
            .ok_or_else(|| DraftError::internal("seated participant without a bank"))
    }

    /// Seat the participant currently views.
    pub fn seat_of(&self, participant: &ParticipantId) -> Option<usize> {
        let ordinal = self.roster.get(participant)?;
        self.table.as_ref()?.seats().seat_of(*ordinal)
    }

    /// Current seat assignment, once started.
    pub fn seat_assignment(&self) -> Option<&SeatAssignment> {
        self.table.as_ref().map(RoundSynchronizer::seats)
    }

    /// Counts where every pool item currently lives.
    pub fn census(&self) -> ItemCensus {
        match &self.table {
            Some(table) => ItemCensus {
                pool: self.pool_size,
                in_hands: table.items_in_hands(),
                in_banks: table.items_in_banks(),
                undealt: self.undealt.len(),
            },
            None => ItemCensus {
                pool: self.items.len(),
                in_hands: 0,
                in_banks: 0,
                undealt: self.items.len(),
            },
        }
    }

    fn round_deal(&self) -> Result<RoundDeal, DraftError> {
        let table = self.table()?;
        let hands = self
            .participants
            .iter()
            .enumerate()
            .map(|(ordinal, participant)| {
                table
                    .hand_for(ordinal)
                    .map(|items| DealtHand {
                        participant: participant.clone(),
                        items: items.to_vec(),
                    })
                    .ok_or_else(|| DraftError::internal("seated participant without a hand"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RoundDeal {
            session_id: self.id.clone(),
            round: table.round(),
            hands,
        })
    }

    fn result(&self) -> Result<DraftResult, DraftError> {
        let table = self.table()?;
        let banks = self
            .participants
            .iter()
            .enumerate()
            .map(|(ordinal, participant)| {
                table
                    .bank_for(ordinal)
                    .map(|items| ParticipantBank {
                        participant: participant.clone(),
                        items: items.to_vec(),
                    })
                    .ok_or_else(|| DraftError::internal("seated participant without a bank"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DraftResult {
            session_id: self.id.clone(),
            banks,
        })
    }
}
