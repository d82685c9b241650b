//! Tests for the draft service, event delivery and the round monitor.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use strictly_draft::{
    ChannelHandle, ChannelSink, DraftErrorKind, DraftEvent, DraftService, ErrorCategory,
    EventSink, Item, MonitorConfig, Participant, ParticipantId, RoundMonitor, ServiceConfig,
    SessionRegistry, SessionSettings, Simulation, StatusSnapshot, simulate,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{sleep, timeout};

const WAIT: Duration = Duration::from_secs(2);

fn pid(id: &str) -> ParticipantId {
    ParticipantId::from(id)
}

fn roster(ids: &[&str]) -> Vec<Participant> {
    ids.iter()
        .map(|id| Participant::new(pid(id), id.to_string(), ChannelHandle::from(format!("dm-{id}"))))
        .collect()
}

fn pool(n: usize) -> Vec<Item> {
    (0..n).map(|i| Item::named(format!("item-{i}"))).collect()
}

fn service_with(config: ServiceConfig) -> (DraftService, UnboundedReceiver<DraftEvent>) {
    let (sink, events) = ChannelSink::new();
    (DraftService::new(config, Arc::new(sink)), events)
}

fn quiet_config() -> ServiceConfig {
    ServiceConfig::default().with_monitor(MonitorConfig::new(false, 5_000))
}

async fn next_event(events: &mut UnboundedReceiver<DraftEvent>) -> DraftEvent {
    timeout(WAIT, events.recv())
        .await
        .expect("Timed out waiting for event")
        .expect("Event stream closed")
}

/// Creates and starts a draft owned by the first player.
async fn start_draft(
    service: &DraftService,
    id: &str,
    players: &[&str],
    settings: SessionSettings,
    items: usize,
) {
    let owner = pid(players[0]);
    service
        .create_session(Some(id.to_string()), "Test".to_string(), owner.clone(), settings)
        .expect("Create failed");
    service.set_items(id, &owner, pool(items)).expect("Items");
    service
        .set_participants(id, &owner, roster(players))
        .expect("Participants");
    service.start_session(id, &owner).await.expect("Start failed");
}

#[tokio::test]
async fn test_full_draft_emits_deals_then_completion() {
    let (service, mut events) = service_with(quiet_config());
    let players = ["ana", "ben"];
    start_draft(&service, "d1", &players, SessionSettings::new(3, 3), 6).await;

    for expected_round in 0..3 {
        match next_event(&mut events).await {
            DraftEvent::ReadyToDeal(deal) => {
                assert_eq!(deal.round, expected_round);
                assert!(deal.hands.iter().all(|h| h.items.len() == 3 - expected_round));
            }
            other => panic!("Expected deal, got {:?}", other),
        }
        for p in players {
            service.submit_pick("d1", &pid(p), 0).await.expect("Pick");
        }
    }

    match next_event(&mut events).await {
        DraftEvent::Completed(result) => {
            assert_eq!(result.session_id, "d1");
            assert!(result.banks.iter().all(|b| b.items.len() == 3));
        }
        other => panic!("Expected completion, got {:?}", other),
    }

    let err = service.get_status("d1").expect_err("Removed on completion");
    assert_eq!(err.kind, DraftErrorKind::UnknownSession("d1".to_string()));
}

#[tokio::test]
async fn test_non_owner_cannot_cancel() {
    let (service, _events) = service_with(quiet_config());
    start_draft(&service, "d2", &["ana", "ben"], SessionSettings::new(2, 2), 4).await;

    let err = service
        .cancel_session("d2", &pid("ben"))
        .await
        .expect_err("Ben is not the owner");
    assert_eq!(err.category(), ErrorCategory::Authorization);
    assert!(matches!(
        service.get_status("d2").expect("Still active"),
        StatusSnapshot::InProgress { .. }
    ));
}

#[tokio::test]
async fn test_non_owner_cannot_configure() {
    let (service, _events) = service_with(quiet_config());
    service
        .create_session(Some("d3".to_string()), "Test".to_string(), pid("ana"), SessionSettings::new(2, 2))
        .expect("Create failed");

    let err = service
        .set_items("d3", &pid("ben"), pool(4))
        .expect_err("Not the owner");
    assert_eq!(err.kind, DraftErrorKind::NotOwner("d3".to_string()));

    service
        .configure_session("d3", &pid("ana"), SessionSettings::new(4, 2))
        .expect("Owner may configure");
}

#[tokio::test]
async fn test_start_validation_surfaces_errors() {
    let (service, mut events) = service_with(quiet_config());
    let owner = pid("ana");
    service
        .create_session(Some("d4".to_string()), "Test".to_string(), owner.clone(), SessionSettings::new(2, 2))
        .expect("Create failed");
    service.set_items("d4", &owner, pool(5)).expect("Items");
    service
        .set_participants("d4", &owner, roster(&["ana", "ben", "cid"]))
        .expect("Participants");

    let err = service.start_session("d4", &owner).await.expect_err("Needs 6 items");
    assert_eq!(err.category(), ErrorCategory::Validation);
    assert!(events.try_recv().is_err());
    assert!(matches!(
        service.get_status("d4").expect("Still pending"),
        StatusSnapshot::NotStarted { .. }
    ));
}

#[tokio::test]
async fn test_monitor_drives_rounds_without_post_pick_check() {
    let config = ServiceConfig::default()
        .with_evaluate_on_pick(false)
        .with_monitor(MonitorConfig::new(true, 20));
    let (service, mut events) = service_with(config);
    let players = ["ana", "ben"];
    start_draft(&service, "d5", &players, SessionSettings::new(2, 2), 4).await;

    assert!(matches!(next_event(&mut events).await, DraftEvent::ReadyToDeal(d) if d.round == 0));
    for p in players {
        service.submit_pick("d5", &pid(p), 0).await.expect("Pick");
    }
    assert!(matches!(next_event(&mut events).await, DraftEvent::ReadyToDeal(d) if d.round == 1));
    for p in players {
        service.submit_pick("d5", &pid(p), 0).await.expect("Pick");
    }
    assert!(matches!(next_event(&mut events).await, DraftEvent::Completed(_)));

    assert!(!service.registry().contains("d5"));
}

#[tokio::test]
async fn test_cancel_stops_everything() {
    let config = ServiceConfig::default()
        .with_evaluate_on_pick(false)
        .with_monitor(MonitorConfig::new(true, 20));
    let (service, mut events) = service_with(config);
    let players = ["ana", "ben"];
    start_draft(&service, "d6", &players, SessionSettings::new(2, 2), 4).await;
    assert!(matches!(next_event(&mut events).await, DraftEvent::ReadyToDeal(_)));

    service.submit_pick("d6", &pid("ana"), 0).await.expect("Pick");
    service.cancel_session("d6", &pid("ana")).await.expect("Cancel");

    let err = service
        .submit_pick("d6", &pid("ben"), 0)
        .await
        .expect_err("Session gone");
    assert_eq!(err.kind, DraftErrorKind::UnknownSession("d6".to_string()));
    assert!(timeout(Duration::from_millis(150), events.recv()).await.is_err());
}

#[tokio::test]
async fn test_generated_ids_are_passphrases() {
    let (service, _events) = service_with(quiet_config());
    let handle = service
        .create_session(None, "Test".to_string(), pid("ana"), SessionSettings::new(2, 2))
        .expect("Create failed");

    assert_eq!(handle.id().split('-').count(), 3);
    assert_eq!(service.list_sessions().expect("List"), vec![handle.id().to_string()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_picks_advance_once() {
    let (service, mut events) = service_with(quiet_config());
    let players: Vec<String> = (0..8).map(|i| format!("p{i}")).collect();
    let names: Vec<&str> = players.iter().map(String::as_str).collect();
    start_draft(&service, "d7", &names, SessionSettings::new(3, 3), 24).await;
    assert!(matches!(next_event(&mut events).await, DraftEvent::ReadyToDeal(_)));

    let tasks: Vec<_> = players
        .iter()
        .map(|p| {
            let service = service.clone();
            let p = pid(p);
            tokio::spawn(async move { service.submit_pick("d7", &p, 0).await })
        })
        .collect();
    for task in tasks {
        task.await.expect("Task panicked").expect("Pick");
    }

    match next_event(&mut events).await {
        DraftEvent::ReadyToDeal(deal) => assert_eq!(deal.round, 1),
        other => panic!("Expected deal, got {:?}", other),
    }
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_simulation_completes() {
    let sim = Simulation {
        players: 3,
        settings: SessionSettings::new(4, 3),
        seed: Some(9),
    };
    let result = simulate::run(sim, pool(13)).await.expect("Simulation failed");

    assert_eq!(result.banks.len(), 3);
    assert!(result.banks.iter().all(|b| b.items.len() == 3));
}

/// Records deliveries alongside markers written by the test.
#[derive(Default, Clone)]
struct RecordingSink {
    log: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    fn mark(&self, entry: &str) {
        self.log.lock().expect("Log lock").push(entry.to_string());
    }

    fn entries(&self) -> Vec<String> {
        self.log.lock().expect("Log lock").clone()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn deliver(&self, event: DraftEvent) {
        let entry = match event {
            DraftEvent::ReadyToDeal(deal) => format!("deal-{}", deal.round),
            DraftEvent::Completed(_) => "completed".to_string(),
        };
        self.mark(&entry);
    }
}

#[tokio::test]
async fn test_monitor_exits_after_stop() {
    let registry = SessionRegistry::new();
    let owner = pid("ana");
    let handle = registry
        .create("d8".to_string(), "Test".to_string(), owner.clone(), SessionSettings::new(2, 2))
        .expect("Create failed");
    {
        let mut draft = handle.lock().expect("Lock");
        draft.set_items(pool(4)).expect("Items");
        draft.set_participants(roster(&["ana", "ben"])).expect("Participants");
        draft.start().expect("Start");
    }

    let (sink, _events) = ChannelSink::new();
    let monitor = RoundMonitor::spawn(handle, registry, Arc::new(sink), Duration::from_millis(10));
    assert!(!monitor.token().is_cancelled());
    assert!(!monitor.is_finished());

    monitor.stop();
    assert!(monitor.token().is_cancelled());
    timeout(WAIT, async {
        while !monitor.is_finished() {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("Monitor did not exit");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_deal_computed_before_cancel_is_dropped() {
    let sink = RecordingSink::default();
    let service = DraftService::new(quiet_config(), Arc::new(sink.clone()));
    start_draft(&service, "d9", &["ana", "ben"], SessionSettings::new(2, 2), 4).await;
    service.submit_pick("d9", &pid("ana"), 0).await.expect("Pick");

    let handle = service.registry().get("d9").expect("Active");
    let gate = handle.delivery_gate().await;

    let picker = {
        let service = service.clone();
        tokio::spawn(async move { service.submit_pick("d9", &pid("ben"), 0).await })
    };
    timeout(WAIT, async {
        while handle.lock().expect("Lock").round() == 0 {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("Round did not advance");

    handle.lock().expect("Lock").cancel().expect("Cancel");
    drop(gate);

    picker.await.expect("Task panicked").expect("Pick was accepted");
    assert_eq!(sink.entries(), vec!["deal-0".to_string()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_no_deal_after_cancel_returns() {
    for attempt in 0..50 {
        let sink = RecordingSink::default();
        let service = DraftService::new(quiet_config(), Arc::new(sink.clone()));
        let id = format!("race-{attempt}");
        start_draft(&service, &id, &["ana", "ben"], SessionSettings::new(2, 2), 4).await;
        service.submit_pick(&id, &pid("ana"), 0).await.expect("Pick");

        let picker = {
            let service = service.clone();
            let id = id.clone();
            tokio::spawn(async move { service.submit_pick(&id, &pid("ben"), 0).await })
        };
        let canceller = {
            let service = service.clone();
            let sink = sink.clone();
            let id = id.clone();
            tokio::spawn(async move {
                service
                    .cancel_session(&id, &pid("ana"))
                    .await
                    .expect("Cancel");
                sink.mark("cancelled");
            })
        };
        let _ = picker.await.expect("Task panicked");
        canceller.await.expect("Task panicked");

        let entries = sink.entries();
        let cancelled = entries
            .iter()
            .position(|e| e == "cancelled")
            .expect("Cancel recorded");
        assert!(
            entries[cancelled..].iter().all(|e| e == "cancelled"),
            "Delivery after cancel: {:?}",
            entries
        );
    }
}
