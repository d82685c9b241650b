//! Participant identity and notification handles.

use derive_getters::Getters;
use derive_more::{Display, From};
use derive_new::new;
use serde::{Deserialize, Serialize};

/// Opaque, already-resolved participant identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Borrows the raw identity.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Opaque handle naming where a participant's notifications go.
///
/// The draft never interprets it; transports resolve it to a real channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelHandle(String);

impl From<&str> for ChannelHandle {
    fn from(handle: &str) -> Self {
        Self(handle.to_string())
    }
}

/// A seated participant in a draft.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, new)]
pub struct Participant {
    /// Identity used for seating and ownership checks.
    id: ParticipantId,
    /// Display label.
    name: String,
    /// Where this participant's deals and results are sent.
    channel: ChannelHandle,
}
