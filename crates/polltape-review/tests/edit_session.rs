use async_trait::async_trait;
use polltape_doc::{path, Document, PathError};
use polltape_review::{
    CommitOutcome, EditError, EditSession, MalformedInputPolicy, MemorySaveSink, ReviewConfig,
    SaveCollaborator, SaveError, SaveOutcome, TimestampComponent,
};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Notify;

fn poll_tape() -> Document {
    Document::from_value(json!({
        "election_header": {
            "type": "General",
            "date": "2024-11-05",
            "location": {"county": "Kent", "state": "MI", "precinct": {"township": "Grattan", "number": "3"}}
        },
        "open_poll_report": {"public_counter": "0", "timestamp": "2024-03-10T14:30:00"},
        "close_poll_report": {"public_counter": "318", "timestamp": "2024-11-05T20:00:00-05:00"},
        "contests": [
            {"name": "Mayor", "candidates": [{"name": "A", "votes": "120"}, {"name": "B", "votes": "98"}]}
        ],
        "ballot_counts": {"total_ballots": "318"}
    }))
}

fn session_with(sink: Arc<dyn SaveCollaborator>) -> EditSession {
    EditSession::new(poll_tape(), sink)
}

// ============================================================================
// Dirty flag lifecycle
// ============================================================================

#[tokio::test]
async fn test_dirty_lifecycle() {
    let sink = Arc::new(MemorySaveSink::new());
    let session = session_with(sink.clone());
    assert!(!session.is_dirty());

    session.commit_field("contests.0.candidates.1.votes", "99").unwrap();
    assert!(session.is_dirty());

    let outcome = session.save().await.unwrap();
    assert_eq!(outcome, SaveOutcome::Saved { still_dirty: false });
    assert!(!session.is_dirty());
    assert_eq!(sink.save_count().await, 1);

    // clean again: no collaborator call
    assert_eq!(session.save().await.unwrap(), SaveOutcome::Skipped);
    assert_eq!(sink.save_count().await, 1);
}

#[tokio::test]
async fn test_failed_save_stays_dirty_and_retries() {
    let sink = Arc::new(MemorySaveSink::failing());
    let session = session_with(sink.clone());
    session.commit_field("ballot_counts.total_ballots", "319").unwrap();

    let err = session.save().await.unwrap_err();
    assert!(matches!(err, SaveError::Rejected(_)));
    assert!(session.is_dirty());

    sink.set_failing(false);
    session.save().await.unwrap();
    assert!(!session.is_dirty());
    assert_eq!(
        sink.last().await.unwrap().to_value()["ballot_counts"]["total_ballots"],
        "319"
    );
}

#[test]
fn test_invalid_path_leaves_store_unchanged() {
    let session = session_with(Arc::new(MemorySaveSink::new()));
    let before = session.current();

    for bad in ["contests.5.name", "contests.0.candidates.x.votes", "missing.field", ""] {
        let err = session.commit_field(bad, "x").unwrap_err();
        assert!(matches!(err, EditError::Path(_)), "{bad}: {err}");
        assert!(Document::ptr_eq(&session.current(), &before));
        assert!(!session.is_dirty());
    }

    let err = session
        .commit_field("ballot_counts.total_ballots.deeper", "x")
        .unwrap_err();
    assert_eq!(
        err,
        EditError::Path(PathError::not_a_container(
            path!("ballot_counts", "total_ballots"),
            "text"
        ))
    );
}

#[test]
fn test_final_key_may_be_new() {
    let session = session_with(Arc::new(MemorySaveSink::new()));
    session
        .commit_field("ballot_counts.ballots_rejected", "2")
        .unwrap();
    assert_eq!(session.display_field("ballot_counts.ballots_rejected").unwrap(), "2");
}

// ============================================================================
// Timestamp components through the session
// ============================================================================

#[test]
fn test_timestamp_merges() {
    let session = session_with(Arc::new(MemorySaveSink::new()));
    let field = "open_poll_report.timestamp";

    session
        .commit_timestamp_component(field, TimestampComponent::Date, "12/25/2024")
        .unwrap();
    assert_eq!(
        session.current().to_value()["open_poll_report"]["timestamp"],
        "2024-12-25T14:30:00"
    );

    let before = session.current();
    assert!(session
        .commit_timestamp_component(field, TimestampComponent::Date, "02/30/2024")
        .is_err());
    assert!(Document::ptr_eq(&session.current(), &before));

    session
        .commit_timestamp_component(field, TimestampComponent::Time, "02:15 PM")
        .unwrap();
    assert_eq!(
        session.current().to_value()["open_poll_report"]["timestamp"],
        "2024-12-25T14:15:00"
    );
    assert!(session
        .commit_timestamp_component(field, TimestampComponent::Time, "13:15 PM")
        .is_err());

    let display = session.display_timestamp(field).unwrap();
    assert_eq!(display.date, "12/25/2024");
    assert_eq!(display.time, "02:15 PM");
}

#[test]
fn test_blank_component_keeps_session_clean() {
    let session = session_with(Arc::new(MemorySaveSink::new()));
    let outcome = session
        .commit_timestamp_component("close_poll_report.timestamp", TimestampComponent::Time, " ")
        .unwrap();
    assert!(matches!(outcome, CommitOutcome::Unchanged { value: Some(_) }));
    assert!(!session.is_dirty());
}

#[test]
fn test_offset_kept_on_merge() {
    let session = session_with(Arc::new(MemorySaveSink::new()));
    session
        .commit_timestamp_component("close_poll_report.timestamp", TimestampComponent::Time, "8:30 pm")
        .unwrap();
    assert_eq!(
        session.current().to_value()["close_poll_report"]["timestamp"],
        "2024-11-05T20:30:00-05:00"
    );
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_session_from_config() {
    let config = ReviewConfig::from_json(
        r#"{
            "malformed_input": "ignore",
            "fields": [{"path": "contests.*.certified_at", "kind": "timestamp"}]
        }"#,
    )
    .unwrap();
    let doc = Document::from_value(json!({
        "contests": [{"name": "Mayor", "certified_at": "2024-11-06T09:00:00"}]
    }));
    let session =
        EditSession::from_config(doc, Arc::new(MemorySaveSink::new()), &config).unwrap();
    assert_eq!(session.policy(), MalformedInputPolicy::Ignore);

    session
        .commit_timestamp_component("contests.0.certified_at", TimestampComponent::Time, "10:00 AM")
        .unwrap();
    assert_eq!(
        session.current().to_value()["contests"][0]["certified_at"],
        "2024-11-06T10:00:00"
    );

    let outcome = session
        .commit_timestamp_component("contests.0.certified_at", TimestampComponent::Date, "Nov 6")
        .unwrap();
    assert!(matches!(outcome, CommitOutcome::Rejected { .. }));
    assert_eq!(session.revision(), 1);
}

// ============================================================================
// Concurrent save
// ============================================================================

/// Holds every save until released.
struct GatedSink {
    entered: Notify,
    release: Notify,
    inner: MemorySaveSink,
}

#[async_trait]
impl SaveCollaborator for GatedSink {
    async fn save(&self, document: &Document) -> Result<(), SaveError> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.save(document).await
    }
}

#[tokio::test]
async fn test_edit_during_save_stays_dirty() {
    let sink = Arc::new(GatedSink {
        entered: Notify::new(),
        release: Notify::new(),
        inner: MemorySaveSink::new(),
    });
    let session = session_with(sink.clone());
    session.commit_field("election_header.type", "Primary").unwrap();

    let saving = session.clone();
    let task = tokio::spawn(async move { saving.save().await });

    sink.entered.notified().await;
    session
        .commit_field("ballot_counts.total_ballots", "320")
        .unwrap();
    sink.release.notify_one();

    let outcome = task.await.unwrap().unwrap();
    assert_eq!(outcome, SaveOutcome::Saved { still_dirty: true });
    assert!(session.is_dirty());

    // the saved snapshot predates the second edit
    let saved = sink.inner.last().await.unwrap().to_value();
    assert_eq!(saved["election_header"]["type"], "Primary");
    assert_eq!(saved["ballot_counts"]["total_ballots"], "318");

    // a second save catches up
    sink.release.notify_one();
    assert_eq!(
        session.save().await.unwrap(),
        SaveOutcome::Saved { still_dirty: false }
    );
    assert!(!session.is_dirty());
    assert_eq!(sink.inner.save_count().await, 2);
}
