// crates/db/src/queries/commits.rs
// Commit-analysis corpus queries and the status-classification sinks.

use chrono::Utc;
use commitlens_core::{
    classify, Classification, CommitAnalysisRecord, CommitStatus, StatusLogEntry,
};
use thiserror::Error;

use super::row_types::CommitRow;
use crate::{Database, DbError, DbResult};

/// Errors from the status sinks. Losing a status-log entry is a
/// correctness bug, so every failure here must reach the caller.
#[derive(Debug, Error)]
pub enum StatusError {
    #[error("Commit not found: {0}")]
    UnknownCommit(String),

    #[error("Invalid status '{0}': must be ok, abnormal, or error")]
    InvalidStatus(CommitStatus),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<sqlx::Error> for StatusError {
    fn from(e: sqlx::Error) -> Self {
        Self::Db(DbError::Sqlx(e))
    }
}

impl From<serde_json::Error> for StatusError {
    fn from(e: serde_json::Error) -> Self {
        Self::Db(DbError::Json(e))
    }
}

impl Database {
    /// Insert one commit analysis record. Returns the new row ID.
    ///
    /// The cached averages are persisted as written; callers are expected
    /// to have run `recompute_averages` at ingest.
    pub async fn insert_commit_record(&self, record: &CommitAnalysisRecord) -> DbResult<i64> {
        let row: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO commits (
                commit_hash, commit_message, author, project, organization,
                commit_timestamp, analyzed_at,
                lines_added, lines_deleted, files_changed,
                model_scores,
                avg_code_quality, avg_complexity, avg_dev_level,
                avg_estimated_hours, avg_estimated_hours_with_ai, avg_ai_percentage,
                status, manually_reviewed, status_log
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
            RETURNING id
            "#,
        )
        .bind(&record.commit_hash)
        .bind(&record.commit_message)
        .bind(&record.author)
        .bind(&record.project)
        .bind(&record.organization)
        .bind(record.commit_timestamp.to_rfc3339())
        .bind(record.analyzed_at.to_rfc3339())
        .bind(record.lines_added)
        .bind(record.lines_deleted)
        .bind(record.files_changed)
        .bind(serde_json::to_string(&record.model_scores)?)
        .bind(record.averages.code_quality)
        .bind(record.averages.complexity)
        .bind(record.averages.dev_level)
        .bind(record.averages.estimated_hours)
        .bind(record.averages.estimated_hours_with_ai)
        .bind(record.averages.ai_percentage)
        .bind(record.status.as_str())
        .bind(record.manually_reviewed)
        .bind(serde_json::to_string(&record.status_log)?)
        .fetch_one(self.pool())
        .await?;
        Ok(row.0)
    }

    /// The full commit corpus, newest first. This is the snapshot passed
    /// into the rollup aggregator; it may still contain duplicate hashes,
    /// which the aggregator resolves.
    pub async fn list_commit_records(&self) -> DbResult<Vec<CommitAnalysisRecord>> {
        let rows: Vec<CommitRow> =
            sqlx::query_as("SELECT * FROM commits ORDER BY commit_timestamp DESC, id ASC")
                .fetch_all(self.pool())
                .await?;
        Ok(rows.into_iter().map(|r| r.into_record()).collect())
    }

    /// Fetch one record by hash. With duplicate rows, the earliest
    /// analysis wins, mirroring the corpus-wide duplicate policy.
    pub async fn get_commit_record(
        &self,
        hash: &str,
    ) -> DbResult<Option<CommitAnalysisRecord>> {
        let row: Option<CommitRow> = sqlx::query_as(
            "SELECT * FROM commits WHERE commit_hash = ?1 ORDER BY analyzed_at ASC, id ASC LIMIT 1",
        )
        .bind(hash)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(|r| r.into_record()))
    }

    /// Count rows in the corpus (including duplicates).
    pub async fn count_commit_records(&self) -> DbResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM commits")
            .fetch_one(self.pool())
            .await?;
        Ok(row.0)
    }

    /// Force a status onto a commit (human review).
    ///
    /// The only path that sets `manually_reviewed`. Appends exactly one
    /// status-log entry per affected row and updates the stored status,
    /// all inside one transaction so a concurrent call can never interleave
    /// the read-modify-append and lose an entry. Updates every row sharing
    /// the hash so a not-yet-deduplicated corpus stays consistent.
    ///
    /// Returns the number of rows updated.
    pub async fn set_commit_status(
        &self,
        hash: &str,
        status: CommitStatus,
        changed_by: &str,
        reason: Option<&str>,
    ) -> Result<u64, StatusError> {
        if !status.is_terminal() {
            return Err(StatusError::InvalidStatus(status));
        }

        let mut tx = self.pool().begin().await.map_err(DbError::Sqlx)?;
        let rows: Vec<(i64, String, String)> =
            sqlx::query_as("SELECT id, status, status_log FROM commits WHERE commit_hash = ?1")
                .bind(hash)
                .fetch_all(&mut *tx)
                .await?;

        if rows.is_empty() {
            return Err(StatusError::UnknownCommit(hash.to_string()));
        }

        let now = Utc::now();
        let mut updated = 0u64;
        for (id, previous_raw, log_raw) in rows {
            let previous = CommitStatus::parse_str(&previous_raw).unwrap_or_default();
            let mut log: Vec<StatusLogEntry> =
                serde_json::from_str(&log_raw).unwrap_or_default();
            log.push(StatusLogEntry {
                timestamp: now,
                changed_by: changed_by.to_string(),
                previous_status: previous,
                new_status: status,
                reason: reason.unwrap_or("Manual status change").to_string(),
            });

            sqlx::query(
                "UPDATE commits SET status = ?2, manually_reviewed = 1, status_log = ?3 WHERE id = ?1",
            )
            .bind(id)
            .bind(status.as_str())
            .bind(serde_json::to_string(&log)?)
            .execute(&mut *tx)
            .await?;
            updated += 1;
        }
        tx.commit().await.map_err(DbError::Sqlx)?;

        tracing::info!(
            commit_hash = hash,
            status = status.as_str(),
            changed_by,
            rows = updated,
            "commit status manually set"
        );
        Ok(updated)
    }

    /// Append a status-log entry without touching `status` or
    /// `manually_reviewed`. Sink for callers recording an automatic
    /// classification transition.
    pub async fn append_status_log_entry(
        &self,
        hash: &str,
        entry: &StatusLogEntry,
    ) -> Result<u64, StatusError> {
        let mut tx = self.pool().begin().await.map_err(DbError::Sqlx)?;
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT id, status_log FROM commits WHERE commit_hash = ?1")
                .bind(hash)
                .fetch_all(&mut *tx)
                .await?;

        if rows.is_empty() {
            return Err(StatusError::UnknownCommit(hash.to_string()));
        }

        let mut updated = 0u64;
        for (id, log_raw) in rows {
            let mut log: Vec<StatusLogEntry> =
                serde_json::from_str(&log_raw).unwrap_or_default();
            log.push(entry.clone());
            sqlx::query("UPDATE commits SET status_log = ?2 WHERE id = ?1")
                .bind(id)
                .bind(serde_json::to_string(&log)?)
                .execute(&mut *tx)
                .await?;
            updated += 1;
        }
        tx.commit().await.map_err(DbError::Sqlx)?;
        Ok(updated)
    }

    /// Classify one commit on demand and persist the transition if the
    /// computed status differs from the stored one. Manually reviewed and
    /// still-analyzing records come back unchanged (the classifier defers
    /// to them), so re-running is idempotent.
    pub async fn reclassify_commit(&self, hash: &str) -> Result<Classification, StatusError> {
        let record = self
            .get_commit_record(hash)
            .await?
            .ok_or_else(|| StatusError::UnknownCommit(hash.to_string()))?;

        let result = classify(&record);

        let transition_applies = !record.manually_reviewed
            && record.status != CommitStatus::Analyzing
            && result.status != record.status;
        if transition_applies {
            let entry = StatusLogEntry {
                timestamp: Utc::now(),
                changed_by: "system".to_string(),
                previous_status: record.status,
                new_status: result.status,
                reason: result.reason.clone(),
            };
            self.append_status_log_entry(hash, &entry).await?;

            sqlx::query("UPDATE commits SET status = ?2 WHERE commit_hash = ?1")
                .bind(hash)
                .bind(result.status.as_str())
                .execute(self.pool())
                .await?;
            tracing::debug!(
                commit_hash = hash,
                from = record.status.as_str(),
                to = result.status.as_str(),
                "commit reclassified"
            );
        }

        Ok(result)
    }
}
