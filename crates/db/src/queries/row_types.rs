// crates/db/src/queries/row_types.rs
// Internal row types and column-decoding helpers.

use chrono::{DateTime, Utc};
use commitlens_core::{
    CommitAnalysisRecord, CommitStatus, DailySummary, ModelScore, ScoreAverages, StatusLogEntry,
};
use sqlx::Row;

/// Decode a JSON TEXT column, degrading to the default on malformed data.
/// A bad column is a data bug worth a warning, never a crash.
fn decode_json_column<T: serde::de::DeserializeOwned + Default>(
    raw: &str,
    column: &'static str,
    key: &str,
) -> T {
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(column, key, error = %e, "malformed JSON column, using default");
            T::default()
        }
    }
}

/// Parse an RFC 3339 TEXT column, degrading to the Unix epoch.
fn decode_timestamp_column(raw: &str, column: &'static str, key: &str) -> DateTime<Utc> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts.with_timezone(&Utc),
        Err(e) => {
            tracing::warn!(column, key, error = %e, "malformed timestamp column, using epoch");
            DateTime::<Utc>::UNIX_EPOCH
        }
    }
}

// ============================================================================
// commits
// ============================================================================

#[derive(Debug)]
pub struct CommitRow {
    pub commit_hash: String,
    pub commit_message: String,
    pub author: String,
    pub project: String,
    pub organization: String,
    pub commit_timestamp: String,
    pub analyzed_at: String,
    pub lines_added: i64,
    pub lines_deleted: i64,
    pub files_changed: i64,
    pub model_scores: String,
    pub avg_code_quality: f64,
    pub avg_complexity: f64,
    pub avg_dev_level: f64,
    pub avg_estimated_hours: f64,
    pub avg_estimated_hours_with_ai: f64,
    pub avg_ai_percentage: f64,
    pub status: String,
    pub manually_reviewed: bool,
    pub status_log: String,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for CommitRow {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            commit_hash: row.try_get("commit_hash")?,
            commit_message: row.try_get("commit_message")?,
            author: row.try_get("author")?,
            project: row.try_get("project")?,
            organization: row.try_get("organization")?,
            commit_timestamp: row.try_get("commit_timestamp")?,
            analyzed_at: row.try_get("analyzed_at")?,
            lines_added: row.try_get("lines_added")?,
            lines_deleted: row.try_get("lines_deleted")?,
            files_changed: row.try_get("files_changed")?,
            model_scores: row.try_get("model_scores")?,
            avg_code_quality: row.try_get("avg_code_quality")?,
            avg_complexity: row.try_get("avg_complexity")?,
            avg_dev_level: row.try_get("avg_dev_level")?,
            avg_estimated_hours: row.try_get("avg_estimated_hours")?,
            avg_estimated_hours_with_ai: row.try_get("avg_estimated_hours_with_ai")?,
            avg_ai_percentage: row.try_get("avg_ai_percentage")?,
            status: row.try_get("status")?,
            manually_reviewed: row.try_get("manually_reviewed")?,
            status_log: row.try_get("status_log")?,
        })
    }
}

impl CommitRow {
    pub fn into_record(self) -> CommitAnalysisRecord {
        let hash = self.commit_hash;
        let model_scores: Vec<ModelScore> =
            decode_json_column(&self.model_scores, "model_scores", &hash);
        let status_log: Vec<StatusLogEntry> =
            decode_json_column(&self.status_log, "status_log", &hash);
        let status = CommitStatus::parse_str(&self.status).unwrap_or_else(|| {
            tracing::warn!(key = %hash, status = %self.status, "unknown status value, using ok");
            CommitStatus::Ok
        });

        CommitAnalysisRecord {
            commit_timestamp: decode_timestamp_column(
                &self.commit_timestamp,
                "commit_timestamp",
                &hash,
            ),
            analyzed_at: decode_timestamp_column(&self.analyzed_at, "analyzed_at", &hash),
            commit_hash: hash,
            commit_message: self.commit_message,
            author: self.author,
            project: self.project,
            organization: self.organization,
            lines_added: self.lines_added,
            lines_deleted: self.lines_deleted,
            files_changed: self.files_changed,
            model_scores,
            averages: ScoreAverages {
                code_quality: self.avg_code_quality,
                complexity: self.avg_complexity,
                dev_level: self.avg_dev_level,
                estimated_hours: self.avg_estimated_hours,
                estimated_hours_with_ai: self.avg_estimated_hours_with_ai,
                ai_percentage: self.avg_ai_percentage,
            },
            status,
            manually_reviewed: self.manually_reviewed,
            status_log,
        }
    }
}

// ============================================================================
// daily_summaries
// ============================================================================

#[derive(Debug)]
pub struct DailySummaryRow {
    pub date: String,
    pub user: String,
    pub avg_code_quality: f64,
    pub avg_complexity: f64,
    pub avg_dev_level: f64,
    pub total_hours: f64,
    pub commit_count: i64,
    pub lines_added: i64,
    pub lines_deleted: i64,
    pub projects: String,
    pub commit_hashes: String,
    pub commit_indices: String,
}

impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for DailySummaryRow {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            date: row.try_get("date")?,
            user: row.try_get("user")?,
            avg_code_quality: row.try_get("avg_code_quality")?,
            avg_complexity: row.try_get("avg_complexity")?,
            avg_dev_level: row.try_get("avg_dev_level")?,
            total_hours: row.try_get("total_hours")?,
            commit_count: row.try_get("commit_count")?,
            lines_added: row.try_get("lines_added")?,
            lines_deleted: row.try_get("lines_deleted")?,
            projects: row.try_get("projects")?,
            commit_hashes: row.try_get("commit_hashes")?,
            commit_indices: row.try_get("commit_indices")?,
        })
    }
}

impl DailySummaryRow {
    pub fn into_summary(self) -> DailySummary {
        let key = format!("{}|{}", self.date, self.user);
        DailySummary {
            projects: decode_json_column(&self.projects, "projects", &key),
            commit_hashes: decode_json_column(&self.commit_hashes, "commit_hashes", &key),
            commit_indices: decode_json_column(&self.commit_indices, "commit_indices", &key),
            date: self.date,
            user: self.user,
            avg_code_quality: self.avg_code_quality,
            avg_complexity: self.avg_complexity,
            avg_dev_level: self.avg_dev_level,
            total_hours: self.total_hours,
            commit_count: self.commit_count,
            lines_added: self.lines_added,
            lines_deleted: self.lines_deleted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_json_column_valid() {
        let scores: Vec<ModelScore> =
            decode_json_column(r#"[{"model":"m","provider":"p"}]"#, "model_scores", "abc");
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].model, "m");
    }

    #[test]
    fn test_decode_json_column_malformed_defaults() {
        let scores: Vec<ModelScore> = decode_json_column("not json", "model_scores", "abc");
        assert!(scores.is_empty());
    }

    #[test]
    fn test_decode_timestamp_column_malformed_defaults_to_epoch() {
        let ts = decode_timestamp_column("garbage", "analyzed_at", "abc");
        assert_eq!(ts, DateTime::<Utc>::UNIX_EPOCH);
    }
}
