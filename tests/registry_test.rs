//! Tests for the session registry.

use strictly_draft::{DraftErrorKind, ErrorCategory, ParticipantId, SessionRegistry, SessionSettings};

fn settings() -> SessionSettings {
    SessionSettings::new(3, 3)
}

#[test]
fn test_create_and_get() {
    let registry = SessionRegistry::new();
    let handle = registry
        .create("gladly-misty-comet".to_string(), "Cube".to_string(), ParticipantId::from("ana"), settings())
        .expect("Create failed");

    assert_eq!(handle.id(), "gladly-misty-comet");
    let found = registry.get("gladly-misty-comet").expect("Lookup failed");
    assert_eq!(found.owner(), &ParticipantId::from("ana"));
    assert_eq!(found.lock().expect("Lock").description(), "Cube");
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_duplicate_id_rejected() {
    let registry = SessionRegistry::new();
    registry
        .create("dup".to_string(), "First".to_string(), ParticipantId::from("ana"), settings())
        .expect("First create failed");
    let err = registry
        .create("dup".to_string(), "Second".to_string(), ParticipantId::from("ben"), settings())
        .expect_err("Duplicate should fail");
    assert_eq!(err.kind, DraftErrorKind::DuplicateId("dup".to_string()));
    assert_eq!(registry.get("dup").expect("Still there").owner(), &ParticipantId::from("ana"));
}

#[test]
fn test_unknown_session() {
    let registry = SessionRegistry::new();
    let err = registry.get("nope").expect_err("Should be missing");
    assert_eq!(err.kind, DraftErrorKind::UnknownSession("nope".to_string()));
    assert_eq!(err.category(), ErrorCategory::Lookup);
}

#[test]
fn test_require_owner() {
    let registry = SessionRegistry::new();
    registry
        .create("mine".to_string(), "Draft".to_string(), ParticipantId::from("ana"), settings())
        .expect("Create failed");

    assert!(registry.require_owner("mine", &ParticipantId::from("ana")).is_ok());
    let err = registry
        .require_owner("mine", &ParticipantId::from("ben"))
        .expect_err("Not the owner");
    assert_eq!(err.kind, DraftErrorKind::NotOwner("mine".to_string()));
    assert_eq!(err.category(), ErrorCategory::Authorization);
}

#[test]
fn test_remove_is_idempotent() {
    let registry = SessionRegistry::new();
    registry
        .create("gone".to_string(), "Draft".to_string(), ParticipantId::from("ana"), settings())
        .expect("Create failed");

    assert!(registry.remove("gone"));
    assert!(!registry.remove("gone"));
    assert!(!registry.contains("gone"));
    assert!(registry.is_empty());
}

#[test]
fn test_clones_share_sessions() {
    let registry = SessionRegistry::new();
    let other = registry.clone();
    registry
        .create("b".to_string(), "Draft".to_string(), ParticipantId::from("ana"), settings())
        .expect("Create failed");
    other
        .create("a".to_string(), "Draft".to_string(), ParticipantId::from("ana"), settings())
        .expect("Create failed");

    assert_eq!(registry.list().expect("List"), vec!["a".to_string(), "b".to_string()]);
}
