//! Scripted drafts with random pickers, for trying out pools and sizes.

use crate::config::ServiceConfig;
use crate::draft::{
    ChannelHandle, DraftEvent, DraftResult, Item, Participant, ParticipantId, SessionSettings,
};
use crate::notify::ChannelSink;
use crate::service::DraftService;
use anyhow::{Context, Result, bail};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Parameters of a simulated draft.
#[derive(Debug, Clone)]
pub struct Simulation {
    /// Number of simulated participants.
    pub players: usize,
    /// Hand and bank sizes.
    pub settings: SessionSettings,
    /// Seed for the pickers' choices.
    pub seed: Option<u64>,
}

/// Runs a full draft where every participant picks at random.
///
/// Rounds advance synchronously on the last pick of each round; the monitor
/// stays off.
#[instrument(skip(items), fields(pool = items.len()))]
pub async fn run(sim: Simulation, items: Vec<Item>) -> Result<DraftResult> {
    let (sink, mut events) = ChannelSink::new();
    let config = ServiceConfig::default()
        .with_monitor(crate::config::MonitorConfig::new(false, 1_000));
    let service = DraftService::new(config, Arc::new(sink));

    let owner = ParticipantId::from("player-1");
    let participants: Vec<Participant> = (1..=sim.players)
        .map(|n| {
            Participant::new(
                ParticipantId::from(format!("player-{n}")),
                format!("Player {n}"),
                ChannelHandle::from(format!("console-{n}")),
            )
        })
        .collect();

    let handle = service.create_session(
        None,
        "Simulated draft".to_string(),
        owner.clone(),
        sim.settings,
    )?;
    let id = handle.id().to_string();
    info!(session_id = %id, "Simulated draft created");

    service.set_items(&id, &owner, items)?;
    service.set_participants(&id, &owner, participants)?;
    service.start_session(&id, &owner).await?;

    let mut rng = match sim.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    while let Some(event) = events.recv().await {
        match event {
            DraftEvent::ReadyToDeal(deal) => {
                debug!(round = deal.round, "Dealing simulated round");
                for hand in deal.hands {
                    if hand.items.is_empty() {
                        bail!("empty hand dealt to {}", hand.participant.name());
                    }
                    let index = rng.gen_range(0..hand.items.len());
                    service
                        .submit_pick(&id, hand.participant.id(), index)
                        .await
                        .with_context(|| format!("pick for {}", hand.participant.name()))?;
                }
            }
            DraftEvent::Completed(result) => {
                info!(session_id = %result.session_id, "Simulated draft completed");
                return Ok(result);
            }
        }
    }

    bail!("event stream closed before the draft completed")
}
