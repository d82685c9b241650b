//! Draft session state machine: pool, hands, rounds and lifecycle.

mod error;
mod events;
mod hands;
mod item;
mod participant;
mod round;
mod session;

pub use error::{DraftError, DraftErrorKind, ErrorCategory, SessionId};
pub use events::{DealtHand, DraftEvent, DraftResult, ParticipantBank, RoundDeal, Transition};
pub use hands::{Deal, SeatAssignment, deal};
pub use item::{Field, Item, ItemError, load_items, parse_items};
pub use participant::{ChannelHandle, Participant, ParticipantId};
pub use round::{RoundOutcome, RoundSynchronizer};
pub use session::{
    DraftSession, ItemCensus, Lifecycle, ParticipantStatus, SessionSettings, StatusSnapshot,
};
