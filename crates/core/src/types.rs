// crates/core/src/types.rs
//! Domain types for commit analysis records and daily rollups.
//!
//! These are the shapes shared by the classifier and the aggregator. Every
//! numeric field that can be absent in ingested data carries
//! `#[serde(default)]` so malformed model output degrades to 0 instead of
//! failing deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ============================================================================
// Status
// ============================================================================

/// Coarse health classification of a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "lowercase")]
pub enum CommitStatus {
    Ok,
    Abnormal,
    Error,
    Analyzing,
}

impl CommitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Abnormal => "abnormal",
            Self::Error => "error",
            Self::Analyzing => "analyzing",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "ok" => Some(Self::Ok),
            "abnormal" => Some(Self::Abnormal),
            "error" => Some(Self::Error),
            "analyzing" => Some(Self::Analyzing),
            _ => None,
        }
    }

    /// Rule-evaluation severity: `error > abnormal > ok`. `analyzing` ranks
    /// highest only for display sorting; rule evaluation never produces it.
    pub fn severity(&self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Abnormal => 1,
            Self::Error => 2,
            Self::Analyzing => 3,
        }
    }

    /// Whether a human may force this status onto a commit. The assessment
    /// pipeline owns `analyzing`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Analyzing)
    }
}

impl Default for CommitStatus {
    fn default() -> Self {
        Self::Ok
    }
}

impl std::fmt::Display for CommitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in a commit's append-only status history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct StatusLogEntry {
    #[ts(type = "string")]
    pub timestamp: DateTime<Utc>,
    pub changed_by: String,
    pub previous_status: CommitStatus,
    pub new_status: CommitStatus,
    pub reason: String,
}

// ============================================================================
// Model scores
// ============================================================================

/// One AI model's assessment of a single commit.
///
/// `code_quality`/`complexity` are on a 0–5 scale, `dev_level` 1–3,
/// `ai_percentage` 0–100.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct ModelScore {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub code_quality: f64,
    #[serde(default)]
    pub complexity: f64,
    #[serde(default)]
    pub dev_level: f64,
    #[serde(default)]
    pub estimated_hours: f64,
    #[serde(default)]
    pub estimated_hours_with_ai: f64,
    #[serde(default)]
    pub ai_percentage: f64,
    #[serde(default)]
    #[ts(type = "number")]
    pub tokens_used: i64,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub response_time_seconds: f64,
    #[serde(default)]
    pub reasoning: String,
}

/// Cached per-record means across all model scores.
///
/// An empty score list yields all-zero averages; individual missing fields
/// already deserialized to 0, so every score contributes to every mean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct ScoreAverages {
    pub code_quality: f64,
    pub complexity: f64,
    pub dev_level: f64,
    pub estimated_hours: f64,
    pub estimated_hours_with_ai: f64,
    pub ai_percentage: f64,
}

impl ScoreAverages {
    pub fn compute(scores: &[ModelScore]) -> Self {
        if scores.is_empty() {
            return Self::default();
        }
        let n = scores.len() as f64;
        Self {
            code_quality: scores.iter().map(|s| s.code_quality).sum::<f64>() / n,
            complexity: scores.iter().map(|s| s.complexity).sum::<f64>() / n,
            dev_level: scores.iter().map(|s| s.dev_level).sum::<f64>() / n,
            estimated_hours: scores.iter().map(|s| s.estimated_hours).sum::<f64>() / n,
            estimated_hours_with_ai: scores
                .iter()
                .map(|s| s.estimated_hours_with_ai)
                .sum::<f64>()
                / n,
            ai_percentage: scores.iter().map(|s| s.ai_percentage).sum::<f64>() / n,
        }
    }
}

// ============================================================================
// Commit analysis record
// ============================================================================

/// The stored result of assessing one source-control commit with one or
/// more AI models.
///
/// Immutable once ingested except for `status`/`manually_reviewed`/
/// `status_log`. `commit_timestamp` is authoritative for rollups;
/// `analyzed_at` records when the assessment ran and is only consulted for
/// duplicate resolution (keep earliest).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct CommitAnalysisRecord {
    pub commit_hash: String,
    #[serde(default)]
    pub commit_message: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub organization: String,
    #[ts(type = "string")]
    pub commit_timestamp: DateTime<Utc>,
    #[ts(type = "string")]
    pub analyzed_at: DateTime<Utc>,
    #[serde(default)]
    #[ts(type = "number")]
    pub lines_added: i64,
    #[serde(default)]
    #[ts(type = "number")]
    pub lines_deleted: i64,
    #[serde(default)]
    #[ts(type = "number")]
    pub files_changed: i64,
    #[serde(default)]
    pub model_scores: Vec<ModelScore>,
    #[serde(default)]
    pub averages: ScoreAverages,
    #[serde(default)]
    pub status: CommitStatus,
    #[serde(default)]
    pub manually_reviewed: bool,
    #[serde(default)]
    pub status_log: Vec<StatusLogEntry>,
}

impl CommitAnalysisRecord {
    /// Total changed lines, the size signal used by the large-commit rules.
    pub fn total_lines(&self) -> i64 {
        self.lines_added + self.lines_deleted
    }

    /// Whether the record carries at least one usable model score. Records
    /// without scores still count toward `commit_count` but are excluded
    /// from quality/complexity/dev-level denominators.
    pub fn has_scores(&self) -> bool {
        !self.model_scores.is_empty()
    }

    /// Recompute the cached averages from the current score list. Called
    /// once at ingest; rollups and classification read the cache.
    pub fn recompute_averages(&mut self) {
        self.averages = ScoreAverages::compute(&self.model_scores);
    }
}

// ============================================================================
// Daily summary
// ============================================================================

/// One rollup row per (reporting-day, user).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    /// Calendar day in the reporting timezone, `YYYY-MM-DD`.
    pub date: String,
    pub user: String,
    pub avg_code_quality: f64,
    pub avg_complexity: f64,
    pub avg_dev_level: f64,
    /// Sum (not mean) of per-commit average estimated hours.
    pub total_hours: f64,
    #[ts(type = "number")]
    pub commit_count: i64,
    #[ts(type = "number")]
    pub lines_added: i64,
    #[ts(type = "number")]
    pub lines_deleted: i64,
    /// Sorted unique project names.
    pub projects: Vec<String>,
    /// Hashes of the contributing commits, in group order.
    pub commit_hashes: Vec<String>,
    /// Positions of the contributing commits within the newest-first
    /// ordering of the complete corpus. Recomputed every run.
    #[ts(type = "Array<number>")]
    pub commit_indices: Vec<i64>,
}

impl DailySummary {
    /// Zero-valued row materialized for users with no commits on an
    /// explicitly processed date, so absence never reads as "unknown".
    pub fn no_activity(date: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            user: user.into(),
            avg_code_quality: 0.0,
            avg_complexity: 0.0,
            avg_dev_level: 0.0,
            total_hours: 0.0,
            commit_count: 0,
            lines_added: 0,
            lines_deleted: 0,
            projects: Vec::new(),
            commit_hashes: Vec::new(),
            commit_indices: Vec::new(),
        }
    }
}

// ============================================================================
// Status tallies
// ============================================================================

/// Per-status record counts for the alerts overview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../../src/types/generated/")]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    #[ts(type = "number")]
    pub error: i64,
    #[ts(type = "number")]
    pub abnormal: i64,
    #[ts(type = "number")]
    pub ok: i64,
    #[ts(type = "number")]
    pub analyzing: i64,
}

impl StatusCounts {
    pub fn record(&mut self, status: CommitStatus) {
        match status {
            CommitStatus::Error => self.error += 1,
            CommitStatus::Abnormal => self.abnormal += 1,
            CommitStatus::Ok => self.ok += 1,
            CommitStatus::Analyzing => self.analyzing += 1,
        }
    }

    pub fn total(&self) -> i64 {
        self.error + self.abnormal + self.ok + self.analyzing
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn score(quality: f64, hours: f64) -> ModelScore {
        ModelScore {
            model: "claude-opus-4".to_string(),
            provider: "anthropic".to_string(),
            code_quality: quality,
            complexity: 2.0,
            dev_level: 2.0,
            estimated_hours: hours,
            ..Default::default()
        }
    }

    #[test]
    fn test_status_roundtrip() {
        for s in [
            CommitStatus::Ok,
            CommitStatus::Abnormal,
            CommitStatus::Error,
            CommitStatus::Analyzing,
        ] {
            assert_eq!(CommitStatus::parse_str(s.as_str()), Some(s));
        }
        assert_eq!(CommitStatus::parse_str("invalid"), None);
    }

    #[test]
    fn test_status_serialization_lowercase() {
        assert_eq!(
            serde_json::to_string(&CommitStatus::Abnormal).unwrap(),
            "\"abnormal\""
        );
        let s: CommitStatus = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(s, CommitStatus::Error);
    }

    #[test]
    fn test_status_severity_ordering() {
        assert!(CommitStatus::Error.severity() > CommitStatus::Abnormal.severity());
        assert!(CommitStatus::Abnormal.severity() > CommitStatus::Ok.severity());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(CommitStatus::Ok.is_terminal());
        assert!(CommitStatus::Abnormal.is_terminal());
        assert!(CommitStatus::Error.is_terminal());
        assert!(!CommitStatus::Analyzing.is_terminal());
    }

    #[test]
    fn test_averages_empty_scores_are_zero() {
        let avg = ScoreAverages::compute(&[]);
        assert_eq!(avg, ScoreAverages::default());
        assert_eq!(avg.code_quality, 0.0);
    }

    #[test]
    fn test_averages_mean_across_models() {
        let avg = ScoreAverages::compute(&[score(4.0, 2.0), score(2.0, 6.0)]);
        assert_eq!(avg.code_quality, 3.0);
        assert_eq!(avg.estimated_hours, 4.0);
        assert_eq!(avg.complexity, 2.0);
    }

    #[test]
    fn test_model_score_defaults_on_missing_fields() {
        // A model that returned only a quality number still parses; every
        // other metric reads as 0.
        let json = r#"{"model":"gpt-4","provider":"openai","codeQuality":3.5}"#;
        let s: ModelScore = serde_json::from_str(json).unwrap();
        assert_eq!(s.code_quality, 3.5);
        assert_eq!(s.estimated_hours, 0.0);
        assert_eq!(s.tokens_used, 0);
    }

    #[test]
    fn test_record_total_lines_and_scores() {
        let mut record = CommitAnalysisRecord {
            commit_hash: "abc123".to_string(),
            commit_message: "add feature".to_string(),
            author: "dev1".to_string(),
            project: "api".to_string(),
            organization: "nuclea".to_string(),
            commit_timestamp: Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap(),
            analyzed_at: Utc.with_ymd_and_hms(2026, 3, 4, 13, 0, 0).unwrap(),
            lines_added: 120,
            lines_deleted: 30,
            files_changed: 4,
            model_scores: vec![score(4.0, 3.0)],
            averages: ScoreAverages::default(),
            status: CommitStatus::Ok,
            manually_reviewed: false,
            status_log: Vec::new(),
        };
        assert_eq!(record.total_lines(), 150);
        assert!(record.has_scores());

        record.recompute_averages();
        assert_eq!(record.averages.code_quality, 4.0);
        assert_eq!(record.averages.estimated_hours, 3.0);
    }

    #[test]
    fn test_record_deserializes_camel_case_with_defaults() {
        let json = r#"{
            "commitHash": "deadbeef",
            "commitTimestamp": "2026-03-04T12:00:00Z",
            "analyzedAt": "2026-03-04T13:00:00Z"
        }"#;
        let record: CommitAnalysisRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.commit_hash, "deadbeef");
        assert_eq!(record.status, CommitStatus::Ok);
        assert!(!record.manually_reviewed);
        assert!(record.model_scores.is_empty());
        assert!(record.status_log.is_empty());
        assert_eq!(record.lines_added, 0);
    }

    #[test]
    fn test_no_activity_summary_is_zero_valued() {
        let summary = DailySummary::no_activity("2026-03-04", "dev2");
        assert_eq!(summary.commit_count, 0);
        assert_eq!(summary.total_hours, 0.0);
        assert!(summary.projects.is_empty());
        assert!(summary.commit_hashes.is_empty());
        assert!(summary.commit_indices.is_empty());
    }

    #[test]
    fn test_status_counts_record_and_total() {
        let mut counts = StatusCounts::default();
        counts.record(CommitStatus::Error);
        counts.record(CommitStatus::Ok);
        counts.record(CommitStatus::Ok);
        counts.record(CommitStatus::Analyzing);
        assert_eq!(counts.error, 1);
        assert_eq!(counts.ok, 2);
        assert_eq!(counts.analyzing, 1);
        assert_eq!(counts.abnormal, 0);
        assert_eq!(counts.total(), 4);
    }
}
