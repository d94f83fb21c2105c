// Integration tests for the classification sinks: forced status, the
// append-only status log, and on-demand reclassification.

use chrono::{DateTime, TimeZone, Utc};
use commitlens_core::{
    classify, CommitAnalysisRecord, CommitStatus, ModelScore, ScoreAverages, StatusLogEntry,
};
use commitlens_db::{Database, StatusError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ts(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 4, hour, 0, 0).unwrap()
}

fn record(hash: &str, quality: f64) -> CommitAnalysisRecord {
    let mut r = CommitAnalysisRecord {
        commit_hash: hash.to_string(),
        commit_message: "implement feature".to_string(),
        author: "dev1".to_string(),
        project: "api".to_string(),
        organization: "nuclea".to_string(),
        commit_timestamp: ts(12),
        analyzed_at: ts(13),
        lines_added: 100,
        lines_deleted: 10,
        files_changed: 2,
        model_scores: vec![ModelScore {
            model: "claude-opus-4".to_string(),
            provider: "anthropic".to_string(),
            code_quality: quality,
            complexity: 2.0,
            dev_level: 2.0,
            estimated_hours: 3.0,
            ..Default::default()
        }],
        averages: ScoreAverages::default(),
        status: CommitStatus::Ok,
        manually_reviewed: false,
        status_log: Vec::new(),
    };
    r.recompute_averages();
    r
}

// ---------------------------------------------------------------------------
// Forced status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_set_status_marks_reviewed_and_appends_log() {
    let db = Database::new_in_memory().await.unwrap();
    db.insert_commit_record(&record("abc", 4.0)).await.unwrap();

    let updated = db
        .set_commit_status("abc", CommitStatus::Error, "lead", Some("rubber-stamped too fast"))
        .await
        .unwrap();
    assert_eq!(updated, 1);

    let stored = db.get_commit_record("abc").await.unwrap().unwrap();
    assert_eq!(stored.status, CommitStatus::Error);
    assert!(stored.manually_reviewed);
    assert_eq!(stored.status_log.len(), 1);

    let entry = &stored.status_log[0];
    assert_eq!(entry.previous_status, CommitStatus::Ok);
    assert_eq!(entry.new_status, CommitStatus::Error);
    assert_eq!(entry.changed_by, "lead");
    assert_eq!(entry.reason, "rubber-stamped too fast");
}

#[tokio::test]
async fn test_set_status_default_reason() {
    let db = Database::new_in_memory().await.unwrap();
    db.insert_commit_record(&record("abc", 4.0)).await.unwrap();

    db.set_commit_status("abc", CommitStatus::Abnormal, "lead", None)
        .await
        .unwrap();

    let stored = db.get_commit_record("abc").await.unwrap().unwrap();
    assert_eq!(stored.status_log[0].reason, "Manual status change");
}

#[tokio::test]
async fn test_manual_status_wins_over_reclassification() {
    let db = Database::new_in_memory().await.unwrap();
    // Metrics that would classify as error
    db.insert_commit_record(&record("abc", 0.5)).await.unwrap();

    db.set_commit_status("abc", CommitStatus::Ok, "lead", Some("false positive"))
        .await
        .unwrap();

    // The classifier defers to the human judgment...
    let stored = db.get_commit_record("abc").await.unwrap().unwrap();
    let result = classify(&stored);
    assert_eq!(result.status, CommitStatus::Ok);
    assert_eq!(result.reason, "Manually reviewed - false positive");

    // ...and so does the persisted reclassification path.
    let result = db.reclassify_commit("abc").await.unwrap();
    assert_eq!(result.status, CommitStatus::Ok);
    let stored = db.get_commit_record("abc").await.unwrap().unwrap();
    assert_eq!(stored.status_log.len(), 1, "no transition may be recorded");
}

#[tokio::test]
async fn test_set_status_rejects_analyzing() {
    let db = Database::new_in_memory().await.unwrap();
    db.insert_commit_record(&record("abc", 4.0)).await.unwrap();

    let err = db
        .set_commit_status("abc", CommitStatus::Analyzing, "lead", None)
        .await
        .unwrap_err();
    assert!(matches!(err, StatusError::InvalidStatus(CommitStatus::Analyzing)));

    // Nothing was written
    let stored = db.get_commit_record("abc").await.unwrap().unwrap();
    assert!(stored.status_log.is_empty());
    assert!(!stored.manually_reviewed);
}

#[tokio::test]
async fn test_set_status_unknown_commit() {
    let db = Database::new_in_memory().await.unwrap();
    let err = db
        .set_commit_status("missing", CommitStatus::Ok, "lead", None)
        .await
        .unwrap_err();
    assert!(matches!(err, StatusError::UnknownCommit(_)));
}

#[tokio::test]
async fn test_set_status_updates_every_duplicate_row() {
    let db = Database::new_in_memory().await.unwrap();
    let mut first = record("dup", 4.0);
    first.analyzed_at = ts(13);
    let mut second = record("dup", 4.0);
    second.analyzed_at = ts(18);
    db.insert_commit_record(&first).await.unwrap();
    db.insert_commit_record(&second).await.unwrap();

    let updated = db
        .set_commit_status("dup", CommitStatus::Error, "lead", None)
        .await
        .unwrap();
    assert_eq!(updated, 2);
}

// ---------------------------------------------------------------------------
// Status log
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_status_log_is_append_only_and_ordered() {
    let db = Database::new_in_memory().await.unwrap();
    db.insert_commit_record(&record("abc", 4.0)).await.unwrap();

    db.set_commit_status("abc", CommitStatus::Error, "lead", Some("first"))
        .await
        .unwrap();
    db.set_commit_status("abc", CommitStatus::Abnormal, "lead", Some("second"))
        .await
        .unwrap();
    db.set_commit_status("abc", CommitStatus::Ok, "auditor", Some("third"))
        .await
        .unwrap();

    let stored = db.get_commit_record("abc").await.unwrap().unwrap();
    let reasons: Vec<&str> = stored.status_log.iter().map(|e| e.reason.as_str()).collect();
    assert_eq!(reasons, vec!["first", "second", "third"]);

    // Each entry chains from the previous status
    assert_eq!(stored.status_log[1].previous_status, CommitStatus::Error);
    assert_eq!(stored.status_log[2].previous_status, CommitStatus::Abnormal);

    // Timestamps never go backwards
    for pair in stored.status_log.windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }
}

#[tokio::test]
async fn test_append_status_log_entry_leaves_status_untouched() {
    let db = Database::new_in_memory().await.unwrap();
    db.insert_commit_record(&record("abc", 4.0)).await.unwrap();

    let entry = StatusLogEntry {
        timestamp: Utc::now(),
        changed_by: "system".to_string(),
        previous_status: CommitStatus::Ok,
        new_status: CommitStatus::Abnormal,
        reason: "High complexity".to_string(),
    };
    db.append_status_log_entry("abc", &entry).await.unwrap();

    let stored = db.get_commit_record("abc").await.unwrap().unwrap();
    assert_eq!(stored.status, CommitStatus::Ok);
    assert!(!stored.manually_reviewed);
    assert_eq!(stored.status_log.len(), 1);
    assert_eq!(stored.status_log[0].reason, "High complexity");
}

#[tokio::test]
async fn test_append_status_log_entry_unknown_commit() {
    let db = Database::new_in_memory().await.unwrap();
    let entry = StatusLogEntry {
        timestamp: Utc::now(),
        changed_by: "system".to_string(),
        previous_status: CommitStatus::Ok,
        new_status: CommitStatus::Error,
        reason: "Very low code quality".to_string(),
    };
    let err = db.append_status_log_entry("missing", &entry).await.unwrap_err();
    assert!(matches!(err, StatusError::UnknownCommit(_)));
}

// ---------------------------------------------------------------------------
// On-demand reclassification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_reclassify_persists_transition_once() {
    let db = Database::new_in_memory().await.unwrap();
    // Quality 0.5 classifies as error; stored status starts at ok
    db.insert_commit_record(&record("abc", 0.5)).await.unwrap();

    let result = db.reclassify_commit("abc").await.unwrap();
    assert_eq!(result.status, CommitStatus::Error);
    assert!(result.reason.contains("Very low code quality"));

    let stored = db.get_commit_record("abc").await.unwrap().unwrap();
    assert_eq!(stored.status, CommitStatus::Error);
    assert_eq!(stored.status_log.len(), 1);
    assert_eq!(stored.status_log[0].changed_by, "system");

    // Re-running finds status already correct: no second log entry
    let result = db.reclassify_commit("abc").await.unwrap();
    assert_eq!(result.status, CommitStatus::Error);
    let stored = db.get_commit_record("abc").await.unwrap().unwrap();
    assert_eq!(stored.status_log.len(), 1);
}

#[tokio::test]
async fn test_reclassify_clean_commit_records_nothing() {
    let db = Database::new_in_memory().await.unwrap();
    db.insert_commit_record(&record("abc", 4.0)).await.unwrap();

    let result = db.reclassify_commit("abc").await.unwrap();
    assert_eq!(result.status, CommitStatus::Ok);
    assert_eq!(result.reason, "No issues detected");

    let stored = db.get_commit_record("abc").await.unwrap().unwrap();
    assert!(stored.status_log.is_empty());
}
