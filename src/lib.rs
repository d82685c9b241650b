//! Strictly Draft library - pass-the-pack item drafts
//!
//! A moderator registers a pool of items and a roster; every round each
//! participant picks one item from the hand in front of them, then hands
//! rotate one seat, until every participant has banked the agreed number
//! of items.
//!
//! # Architecture
//!
//! - **Draft**: the session state machine (hands, rounds, lifecycle)
//! - **Registry**: process-wide map of active sessions, one lock each
//! - **Monitor**: per-session background task re-running round checks
//! - **Service**: the operations transports call, with event delivery
//! - **HTTP**: JSON transport over the service
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use strictly_draft::{
//!     ChannelHandle, ChannelSink, DraftService, Item, Participant, ParticipantId,
//!     ServiceConfig, SessionSettings,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let (sink, mut events) = ChannelSink::new();
//! let service = DraftService::new(ServiceConfig::default(), Arc::new(sink));
//!
//! let owner = ParticipantId::from("ana");
//! let draft = service.create_session(
//!     None,
//!     "Cube night".to_string(),
//!     owner.clone(),
//!     SessionSettings::new(3, 3),
//! )?;
//! let items = (0..6).map(|i| Item::named(format!("card {i}"))).collect();
//! service.set_items(draft.id(), &owner, items)?;
//! service.set_participants(draft.id(), &owner, vec![
//!     Participant::new(owner.clone(), "Ana".into(), ChannelHandle::from("dm-ana")),
//!     Participant::new(ParticipantId::from("ben"), "Ben".into(), ChannelHandle::from("dm-ben")),
//! ])?;
//! service.start_session(draft.id(), &owner).await?;
//! let first_deal = events.recv().await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod draft;
mod monitor;
mod notify;
mod registry;
mod service;

// Public modules
pub mod http;
pub mod passphrase;
pub mod simulate;

// Crate-level exports - Configuration
pub use config::{ConfigError, HttpConfig, MonitorConfig, ServiceConfig};

// Crate-level exports - Draft state machine
pub use draft::{
    ChannelHandle, Deal, DealtHand, DraftError, DraftErrorKind, DraftEvent, DraftResult,
    DraftSession, ErrorCategory, Field, Item, ItemCensus, ItemError, Lifecycle, Participant,
    ParticipantBank, ParticipantId, ParticipantStatus, RoundDeal, RoundOutcome,
    RoundSynchronizer, SeatAssignment, SessionId, SessionSettings, StatusSnapshot, Transition,
    deal, load_items, parse_items,
};

// Crate-level exports - Sessions and events
pub use monitor::RoundMonitor;
pub use notify::{ChannelSink, EventSink, LogSink};
pub use registry::{SessionHandle, SessionRegistry};
pub use service::DraftService;
pub use simulate::Simulation;
