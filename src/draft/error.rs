//! Draft error types.

use super::participant::ParticipantId;
use derive_more::{Display, Error};
use serde::Serialize;
use tracing::instrument;

/// Unique identifier for a draft session.
pub type SessionId = String;

/// Broad error class, used by transports to pick a response shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCategory {
    /// Bad configuration or not enough items/participants.
    Validation,
    /// Operation not allowed in the current lifecycle or round.
    State,
    /// Caller is not allowed to act on the session.
    Authorization,
    /// Session or participant does not exist.
    Lookup,
    /// Pick index outside the current hand.
    Range,
    /// Broken invariant or poisoned lock. Never carries detail to callers.
    Internal,
}

/// What went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum DraftErrorKind {
    /// Hand or bank size is unusable.
    #[display("invalid configuration: {_0}")]
    InvalidConfiguration(String),

    /// Fewer than two participants are registered.
    #[display("at least 2 participants are needed, {_0} registered")]
    InsufficientParticipants(usize),

    /// The pool cannot fill every hand.
    #[display("{required} items are needed for this draft, only {available} registered")]
    InsufficientItems {
        /// Items needed to deal every hand.
        required: usize,
        /// Items in the pool.
        available: usize,
    },

    /// The same participant appears twice in a roster.
    #[display("participant {_0} is listed more than once")]
    DuplicateParticipant(ParticipantId),

    /// Session has left `Pending` and can no longer be changed or started.
    #[display("the draft has already started and can no longer be changed")]
    AlreadyStarted,

    /// Picks are only accepted while the session is active.
    #[display("the draft is not accepting picks")]
    NotActive,

    /// Session is already completed or cancelled.
    #[display("the draft has already finished")]
    AlreadyTerminal,

    /// Participant already picked this round.
    #[display("{_0} has already picked this round")]
    StalePick(ParticipantId),

    /// Caller does not own the session.
    #[display("only the owner of draft '{_0}' can take this action")]
    NotOwner(SessionId),

    /// No active session with this id.
    #[display("no draft with id '{_0}'")]
    UnknownSession(SessionId),

    /// A session with this id is already active.
    #[display("a draft with id '{_0}' already exists")]
    DuplicateId(SessionId),

    /// Participant is not seated in the session.
    #[display("{_0} is not seated in this draft")]
    UnknownParticipant(ParticipantId),

    /// Pick index outside the participant's hand.
    #[display("pick {index} is out of range for a hand of {hand_size}")]
    InvalidIndex {
        /// Requested index.
        index: usize,
        /// Items in the hand.
        hand_size: usize,
    },

    /// Internal failure; the detail is logged, not displayed.
    #[display("internal draft error")]
    Internal(String),
}

impl DraftErrorKind {
    /// Maps the kind onto its error class.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidConfiguration(_)
            | Self::InsufficientParticipants(_)
            | Self::InsufficientItems { .. }
            | Self::DuplicateParticipant(_) => ErrorCategory::Validation,
            Self::AlreadyStarted
            | Self::NotActive
            | Self::AlreadyTerminal
            | Self::StalePick(_)
            | Self::DuplicateId(_) => ErrorCategory::State,
            Self::NotOwner(_) => ErrorCategory::Authorization,
            Self::UnknownSession(_) | Self::UnknownParticipant(_) => ErrorCategory::Lookup,
            Self::InvalidIndex { .. } => ErrorCategory::Range,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }
}

/// Draft error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Draft error: {} at {}:{}", kind, file, line)]
pub struct DraftError {
    /// What went wrong.
    pub kind: DraftErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DraftError {
    /// Creates a new draft error with caller location tracking.
    #[track_caller]
    #[instrument(skip(kind))]
    pub fn new(kind: DraftErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Creates an internal error and logs its detail.
    #[track_caller]
    pub fn internal(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        let loc = std::panic::Location::caller();
        tracing::error!(detail = %detail, file = loc.file(), line = loc.line(), "Internal draft error");
        Self::new(DraftErrorKind::Internal(detail))
    }

    /// Error class of this error.
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Message safe to show to the caller.
    pub fn user_message(&self) -> String {
        self.kind.to_string()
    }
}

impl From<DraftErrorKind> for DraftError {
    #[track_caller]
    fn from(kind: DraftErrorKind) -> Self {
        Self::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_detail_is_not_displayed() {
        let err = DraftError::internal("seat map lost participant 3");
        assert_eq!(err.user_message(), "internal draft error");
        assert_eq!(err.category(), ErrorCategory::Internal);
    }

    #[test]
    fn stale_pick_is_a_state_error() {
        let kind = DraftErrorKind::StalePick(ParticipantId::from("ana"));
        assert_eq!(kind.category(), ErrorCategory::State);
        assert_eq!(kind.to_string(), "ana has already picked this round");
    }
}
