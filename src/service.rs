//! Draft service: the operations the transport layer calls.

use crate::config::ServiceConfig;
use crate::draft::{
    DraftError, DraftErrorKind, DraftEvent, Item, Participant, ParticipantId, SessionId,
    SessionSettings, StatusSnapshot, Transition,
};
use crate::monitor::RoundMonitor;
use crate::notify::EventSink;
use crate::passphrase;
use crate::registry::{SessionHandle, SessionRegistry};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Session lookup, ownership checks, locking and notification delivery
/// around the draft state machine.
///
/// Cloning shares the registry and sink.
#[derive(Clone)]
pub struct DraftService {
    registry: SessionRegistry,
    sink: Arc<dyn EventSink>,
    config: ServiceConfig,
}

impl std::fmt::Debug for DraftService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftService")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DraftService {
    /// Creates a service with an empty registry.
    #[instrument(skip(sink))]
    pub fn new(config: ServiceConfig, sink: Arc<dyn EventSink>) -> Self {
        info!("Creating draft service");
        Self::with_registry(SessionRegistry::new(), config, sink)
    }

    /// Creates a service over an existing registry.
    pub fn with_registry(
        registry: SessionRegistry,
        config: ServiceConfig,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            registry,
            sink,
            config,
        }
    }

    /// Registry backing this service.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Active configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Creates a pending session.
    ///
    /// Without an explicit id a passphrase is generated, retrying on
    /// collision up to `id_attempts` times.
    ///
    /// # Errors
    ///
    /// `DuplicateId` if the id (or every generated id) is taken.
    #[instrument(skip(self, description, owner), fields(owner = %owner))]
    pub fn create_session(
        &self,
        id: Option<SessionId>,
        description: String,
        owner: ParticipantId,
        settings: SessionSettings,
    ) -> Result<SessionHandle, DraftError> {
        if let Some(id) = id {
            return self.registry.create(id, description, owner, settings);
        }

        let mut last = None;
        for attempt in 0..*self.config.id_attempts() {
            let id = passphrase::generate();
            match self
                .registry
                .create(id, description.clone(), owner.clone(), settings)
            {
                Ok(handle) => return Ok(handle),
                Err(e) if matches!(e.kind, DraftErrorKind::DuplicateId(_)) => {
                    debug!(attempt, "Generated id collided");
                    last = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        warn!("Ran out of generated ids");
        Err(last.unwrap_or_else(|| DraftErrorKind::DuplicateId(String::new()).into()))
    }

    /// Replaces a pending session's hand and bank sizes.
    #[instrument(skip(self, caller), fields(caller = %caller))]
    pub fn configure_session(
        &self,
        id: &str,
        caller: &ParticipantId,
        settings: SessionSettings,
    ) -> Result<(), DraftError> {
        let handle = self.registry.require_owner(id, caller)?;
        let mut session = handle.lock()?;
        session.configure(settings)
    }

    /// Replaces a pending session's item pool.
    #[instrument(skip(self, caller, items), fields(caller = %caller, count = items.len()))]
    pub fn set_items(
        &self,
        id: &str,
        caller: &ParticipantId,
        items: Vec<Item>,
    ) -> Result<usize, DraftError> {
        let handle = self.registry.require_owner(id, caller)?;
        let mut session = handle.lock()?;
        session.set_items(items)
    }

    /// Replaces a pending session's roster.
    #[instrument(skip(self, caller, participants), fields(caller = %caller, count = participants.len()))]
    pub fn set_participants(
        &self,
        id: &str,
        caller: &ParticipantId,
        participants: Vec<Participant>,
    ) -> Result<usize, DraftError> {
        let handle = self.registry.require_owner(id, caller)?;
        let mut session = handle.lock()?;
        session.set_participants(participants)
    }

    /// Starts a session, deals round 0 and spawns its monitor.
    #[instrument(skip(self, caller), fields(caller = %caller))]
    pub async fn start_session(&self, id: &str, caller: &ParticipantId) -> Result<(), DraftError> {
        let handle = self.registry.require_owner(id, caller)?;
        let deal = {
            let mut session = handle.lock()?;
            session.start()?
        };

        if *self.config.monitor().enabled() {
            let monitor = RoundMonitor::spawn(
                handle.clone(),
                self.registry.clone(),
                Arc::clone(&self.sink),
                self.config.monitor().interval(),
            );
            self.registry.attach_monitor(id, monitor)?;
        }

        self.deliver_deal(&handle, DraftEvent::ReadyToDeal(deal)).await
    }

    /// Delivers a deal unless the session stopped since it was computed.
    async fn deliver_deal(
        &self,
        handle: &SessionHandle,
        event: DraftEvent,
    ) -> Result<(), DraftError> {
        let _gate = handle.delivery_gate().await;
        if !handle.is_active()? {
            debug!(session_id = handle.id(), "Session stopped, deal dropped");
            return Ok(());
        }
        self.sink.deliver(event).await;
        Ok(())
    }

    /// Banks a pick and, when configured, runs the round checks at once.
    ///
    /// Returns the picked item.
    #[instrument(skip(self, participant), fields(participant = %participant))]
    pub async fn submit_pick(
        &self,
        id: &str,
        participant: &ParticipantId,
        index: usize,
    ) -> Result<Item, DraftError> {
        let handle = self.registry.get(id)?;
        let (item, transition) = {
            let mut session = handle.lock()?;
            let item = session.pick(participant, index)?;
            let transition = if *self.config.evaluate_on_pick() {
                session.evaluate()?
            } else {
                Transition::NoChange
            };
            (item, transition)
        };

        match transition {
            Transition::NoChange => {}
            Transition::RoundAdvanced(deal) => {
                self.deliver_deal(&handle, DraftEvent::ReadyToDeal(deal)).await?;
            }
            Transition::Completed(result) => {
                self.registry.remove(id);
                self.sink.deliver(DraftEvent::Completed(result)).await;
            }
        }
        Ok(item)
    }

    /// Status snapshot of an active session.
    #[instrument(skip(self))]
    pub fn get_status(&self, id: &str) -> Result<StatusSnapshot, DraftError> {
        let handle = self.registry.get(id)?;
        let session = handle.lock()?;
        Ok(session.status())
    }

    /// Cancels a session and releases its registry entry and monitor.
    #[instrument(skip(self, caller), fields(caller = %caller))]
    pub async fn cancel_session(&self, id: &str, caller: &ParticipantId) -> Result<(), DraftError> {
        let handle = self.registry.require_owner(id, caller)?;
        {
            let _gate = handle.delivery_gate().await;
            let mut session = handle.lock()?;
            session.cancel()?;
        }
        self.registry.remove(id);
        info!(session_id = id, "Draft cancelled");
        Ok(())
    }

    /// Ids of active sessions.
    pub fn list_sessions(&self) -> Result<Vec<SessionId>, DraftError> {
        self.registry.list()
    }
}
