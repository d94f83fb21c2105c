// crates/db/src/queries/summaries.rs
// Daily-summary sink: the rollup aggregator's merge targets.

use commitlens_core::DailySummary;
use sqlx::sqlite::Sqlite;

use super::row_types::DailySummaryRow;
use crate::{Database, DbResult};

/// Bind and run one summary INSERT inside an open transaction.
async fn insert_summary_tx(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    summary: &DailySummary,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO daily_summaries (
            date, user,
            avg_code_quality, avg_complexity, avg_dev_level,
            total_hours, commit_count, lines_added, lines_deleted,
            projects, commit_hashes, commit_indices
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(&summary.date)
    .bind(&summary.user)
    .bind(summary.avg_code_quality)
    .bind(summary.avg_complexity)
    .bind(summary.avg_dev_level)
    .bind(summary.total_hours)
    .bind(summary.commit_count)
    .bind(summary.lines_added)
    .bind(summary.lines_deleted)
    .bind(serde_json::to_string(&summary.projects)?)
    .bind(serde_json::to_string(&summary.commit_hashes)?)
    .bind(serde_json::to_string(&summary.commit_indices)?)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

impl Database {
    /// All persisted summaries in presentation order: date descending,
    /// user ascending within a date.
    pub async fn list_daily_summaries(&self) -> DbResult<Vec<DailySummary>> {
        let rows: Vec<DailySummaryRow> =
            sqlx::query_as("SELECT * FROM daily_summaries ORDER BY date DESC, user ASC")
                .fetch_all(self.pool())
                .await?;
        Ok(rows.into_iter().map(|r| r.into_summary()).collect())
    }

    /// Summaries for one date, user ascending.
    pub async fn list_summaries_for_date(&self, date: &str) -> DbResult<Vec<DailySummary>> {
        let rows: Vec<DailySummaryRow> =
            sqlx::query_as("SELECT * FROM daily_summaries WHERE date = ?1 ORDER BY user ASC")
                .bind(date)
                .fetch_all(self.pool())
                .await?;
        Ok(rows.into_iter().map(|r| r.into_summary()).collect())
    }

    /// Replace every summary for `date` with `summaries`, atomically.
    ///
    /// Delete-then-insert in a single transaction: a failed run leaves the
    /// previous rows for the date intact rather than a half-written
    /// backfill.
    pub async fn replace_summaries_for_date(
        &self,
        date: &str,
        summaries: &[DailySummary],
    ) -> DbResult<()> {
        let mut tx = self.pool().begin().await?;

        sqlx::query("DELETE FROM daily_summaries WHERE date = ?1")
            .bind(date)
            .execute(&mut *tx)
            .await?;

        for summary in summaries {
            insert_summary_tx(&mut tx, summary).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Upsert one summary by its (date, user) key: last write wins, keys
    /// absent from the new computation are untouched.
    pub async fn upsert_daily_summary(&self, summary: &DailySummary) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO daily_summaries (
                date, user,
                avg_code_quality, avg_complexity, avg_dev_level,
                total_hours, commit_count, lines_added, lines_deleted,
                projects, commit_hashes, commit_indices
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ON CONFLICT(date, user) DO UPDATE SET
                avg_code_quality = excluded.avg_code_quality,
                avg_complexity = excluded.avg_complexity,
                avg_dev_level = excluded.avg_dev_level,
                total_hours = excluded.total_hours,
                commit_count = excluded.commit_count,
                lines_added = excluded.lines_added,
                lines_deleted = excluded.lines_deleted,
                projects = excluded.projects,
                commit_hashes = excluded.commit_hashes,
                commit_indices = excluded.commit_indices
            "#,
        )
        .bind(&summary.date)
        .bind(&summary.user)
        .bind(summary.avg_code_quality)
        .bind(summary.avg_complexity)
        .bind(summary.avg_dev_level)
        .bind(summary.total_hours)
        .bind(summary.commit_count)
        .bind(summary.lines_added)
        .bind(summary.lines_deleted)
        .bind(serde_json::to_string(&summary.projects)?)
        .bind(serde_json::to_string(&summary.commit_hashes)?)
        .bind(serde_json::to_string(&summary.commit_indices)?)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Drop every summary for a date. Returns the number of rows removed.
    pub async fn delete_summaries_for_date(&self, date: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM daily_summaries WHERE date = ?1")
            .bind(date)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }
}
