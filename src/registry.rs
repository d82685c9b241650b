//! Process-wide registry of active draft sessions.

use crate::draft::{
    DraftError, DraftErrorKind, DraftSession, Lifecycle, ParticipantId, SessionId,
    SessionSettings,
};
use crate::monitor::RoundMonitor;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, instrument, warn};

/// Shared handle to one session and its exclusive section.
///
/// Outbound notifications go through a separate async gate, so a delivery in
/// flight and a cancellation never overlap.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: SessionId,
    owner: ParticipantId,
    session: Arc<Mutex<DraftSession>>,
    delivery: Arc<tokio::sync::Mutex<()>>,
}

impl SessionHandle {
    fn new(session: DraftSession) -> Self {
        Self {
            id: session.id().to_string(),
            owner: session.owner().clone(),
            session: Arc::new(Mutex::new(session)),
            delivery: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Session id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Session owner.
    pub fn owner(&self) -> &ParticipantId {
        &self.owner
    }

    /// Waits for the session's delivery gate.
    ///
    /// Held while a notification is checked and delivered, and while the
    /// session is cancelled. Never taken while the session lock is held.
    pub async fn delivery_gate(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.delivery.lock().await
    }

    /// True while the session accepts picks.
    pub fn is_active(&self) -> Result<bool, DraftError> {
        Ok(self.lock()?.lifecycle() == Lifecycle::Active)
    }

    /// Enters the session's exclusive section.
    ///
    /// # Errors
    ///
    /// Internal error if a previous holder panicked.
    pub fn lock(&self) -> Result<MutexGuard<'_, DraftSession>, DraftError> {
        self.session
            .lock()
            .map_err(|_| DraftError::internal(format!("session {} lock poisoned", self.id)))
    }
}

#[derive(Debug)]
struct RegistryEntry {
    handle: SessionHandle,
    monitor: Option<RoundMonitor>,
}

/// Keyed collection of active sessions.
///
/// Cloning shares the same sessions.
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<SessionId, RegistryEntry>>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating session registry");
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<SessionId, RegistryEntry>>, DraftError> {
        self.sessions
            .lock()
            .map_err(|_| DraftError::internal("session registry lock poisoned"))
    }

    /// Registers a new pending session.
    ///
    /// # Errors
    ///
    /// `DuplicateId` if a session with this id is active.
    #[instrument(skip(self, id, description, owner, settings), fields(session_id = %id, owner = %owner))]
    pub fn create(
        &self,
        id: SessionId,
        description: String,
        owner: ParticipantId,
        settings: SessionSettings,
    ) -> Result<SessionHandle, DraftError> {
        let mut sessions = self.entries()?;

        if sessions.contains_key(&id) {
            warn!("Session already exists");
            return Err(DraftErrorKind::DuplicateId(id).into());
        }

        let handle = SessionHandle::new(DraftSession::new(id.clone(), description, owner, settings));
        sessions.insert(
            id,
            RegistryEntry {
                handle: handle.clone(),
                monitor: None,
            },
        );

        info!(active = sessions.len(), "Registered session");
        Ok(handle)
    }

    /// Looks up a session.
    ///
    /// # Errors
    ///
    /// `UnknownSession` if absent.
    #[instrument(skip(self))]
    pub fn get(&self, id: &str) -> Result<SessionHandle, DraftError> {
        let sessions = self.entries()?;
        sessions
            .get(id)
            .map(|entry| entry.handle.clone())
            .ok_or_else(|| {
                debug!(session_id = id, "Session not found");
                DraftErrorKind::UnknownSession(id.to_string()).into()
            })
    }

    /// Looks up a session the caller owns.
    ///
    /// # Errors
    ///
    /// `UnknownSession` if absent, `NotOwner` if `caller` is not the owner.
    #[instrument(skip(self, caller), fields(caller = %caller))]
    pub fn require_owner(&self, id: &str, caller: &ParticipantId) -> Result<SessionHandle, DraftError> {
        let handle = self.get(id)?;
        if handle.owner() != caller {
            warn!(session_id = id, owner = %handle.owner(), "Caller is not the owner");
            return Err(DraftErrorKind::NotOwner(id.to_string()).into());
        }
        Ok(handle)
    }

    /// Hands a running monitor to the session's entry.
    ///
    /// If the session is already gone, the monitor is dropped and stops.
    #[instrument(skip(self, monitor))]
    pub fn attach_monitor(&self, id: &str, monitor: RoundMonitor) -> Result<(), DraftError> {
        let mut sessions = self.entries()?;
        match sessions.get_mut(id) {
            Some(entry) => {
                entry.monitor = Some(monitor);
                debug!(session_id = id, "Monitor attached");
            }
            None => debug!(session_id = id, "Session gone before monitor attached"),
        }
        Ok(())
    }

    /// Removes a session and stops its monitor. Removing twice is fine.
    ///
    /// Returns whether a session was removed.
    #[instrument(skip(self))]
    pub fn remove(&self, id: &str) -> bool {
        let removed = match self.sessions.lock() {
            Ok(mut sessions) => sessions.remove(id),
            Err(poisoned) => poisoned.into_inner().remove(id),
        };
        match removed {
            Some(entry) => {
                if let Some(monitor) = entry.monitor {
                    monitor.stop();
                }
                info!(session_id = id, "Removed session");
                true
            }
            None => {
                debug!(session_id = id, "Session already removed");
                false
            }
        }
    }

    /// Lists active session ids.
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<SessionId>, DraftError> {
        let sessions = self.entries()?;
        let mut ids: Vec<_> = sessions.keys().cloned().collect();
        ids.sort();
        debug!(count = ids.len(), "Listed sessions");
        Ok(ids)
    }

    /// True if a session with this id is active.
    ///
    /// A poisoned registry reports no sessions.
    pub fn contains(&self, id: &str) -> bool {
        match self.entries() {
            Ok(sessions) => sessions.contains_key(id),
            Err(e) => {
                error!(session_id = id, error = %e, "Registry unavailable");
                false
            }
        }
    }

    /// Number of active sessions.
    ///
    /// A poisoned registry reports no sessions.
    pub fn len(&self) -> usize {
        match self.entries() {
            Ok(sessions) => sessions.len(),
            Err(e) => {
                error!(error = %e, "Registry unavailable");
                0
            }
        }
    }

    /// True when no session is active.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::ErrorCategory;

    #[test]
    fn poisoned_registry_reports_nothing() {
        let registry = SessionRegistry::new();
        registry
            .create(
                "oddly-quiet-lark".to_string(),
                "Draft".to_string(),
                ParticipantId::from("ana"),
                SessionSettings::new(2, 2),
            )
            .expect("Create failed");

        let sessions = Arc::clone(&registry.sessions);
        let _ = std::thread::spawn(move || {
            let _guard = sessions.lock().expect("Fresh lock");
            panic!("poison the registry");
        })
        .join();

        assert!(!registry.contains("oddly-quiet-lark"));
        assert_eq!(registry.len(), 0);
        let err = registry.get("oddly-quiet-lark").expect_err("Poisoned");
        assert_eq!(err.category(), ErrorCategory::Internal);
    }
}
