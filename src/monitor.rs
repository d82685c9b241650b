//! Background round monitor.
//!
//! One task per active session re-runs the round checks on a fixed interval.
//! Accepted picks normally run the same checks synchronously, so the monitor
//! is a safety net; with `evaluate_on_pick` disabled it is what drives rounds.

use crate::draft::{DraftEvent, Lifecycle, Transition};
use crate::notify::EventSink;
use crate::registry::{SessionHandle, SessionRegistry};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

/// Handle to a running monitor task. Dropping it stops the task.
#[derive(Debug)]
pub struct RoundMonitor {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl RoundMonitor {
    /// Spawns a monitor for `session` on the current tokio runtime.
    #[instrument(skip(session, registry, sink), fields(session_id = %session.id()))]
    pub fn spawn(
        session: SessionHandle,
        registry: SessionRegistry,
        sink: Arc<dyn EventSink>,
        interval: Duration,
    ) -> Self {
        let token = CancellationToken::new();
        let task = tokio::spawn(run(session, registry, sink, interval, token.clone()));
        info!(interval_ms = interval.as_millis() as u64, "Round monitor started");
        Self { token, task }
    }

    /// Signals the task to stop at its next wake-up.
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// True once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Token observed by the task.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for RoundMonitor {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn run(
    session: SessionHandle,
    registry: SessionRegistry,
    sink: Arc<dyn EventSink>,
    interval: Duration,
    token: CancellationToken,
) {
    let session_id = session.id().to_string();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately; the start deal is already out.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                debug!(session_id = %session_id, "Monitor cancelled");
                break;
            }
            _ = ticker.tick() => {}
        }

        let transition = {
            let mut draft = match session.lock() {
                Ok(draft) => draft,
                Err(e) => {
                    error!(session_id = %session_id, error = %e, "Monitor cannot enter session");
                    break;
                }
            };
            if draft.lifecycle() != Lifecycle::Active {
                debug!(session_id = %session_id, lifecycle = %draft.lifecycle(), "Session no longer active");
                break;
            }
            match draft.evaluate() {
                Ok(transition) => transition,
                Err(e) => {
                    error!(session_id = %session_id, error = %e, "Monitor evaluation failed");
                    break;
                }
            }
        };

        match transition {
            Transition::NoChange => {}
            Transition::RoundAdvanced(deal) => {
                let _gate = session.delivery_gate().await;
                if token.is_cancelled() || !matches!(session.is_active(), Ok(true)) {
                    break;
                }
                debug!(session_id = %session_id, round = deal.round, "Monitor advanced round");
                sink.deliver(DraftEvent::ReadyToDeal(deal)).await;
            }
            Transition::Completed(result) => {
                debug!(session_id = %session_id, "Monitor completed draft");
                registry.remove(&session_id);
                sink.deliver(DraftEvent::Completed(result)).await;
                break;
            }
        }
    }

    info!(session_id = %session_id, "Round monitor stopped");
}
