// crates/db/src/report.rs
//! The daily-report batch entry point: corpus snapshot → rollup → merge.
//!
//! Loading, grouping, and reducing are delegated to `commitlens-core`;
//! this module owns scope resolution, the merge into persisted state, and
//! the success/failure accounting callers see. No intermediate state is
//! observable: a caller gets counts or a structured error.

use std::collections::BTreeSet;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use commitlens_core::reporting_time::{format_date, parse_report_date, reporting_yesterday};
use commitlens_core::rollup::{
    backfill_no_activity, build_daily_summaries, corpus_users, dedupe_records, position_index,
};

use crate::{Database, DbError};

/// What a report invocation covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportScope {
    /// Scheduled default: yesterday in the reporting timezone.
    Yesterday,
    /// One explicit date, merged non-destructively into other dates.
    Date(NaiveDate),
    /// Recompute across all history, merged by (date, user) key union.
    FullHistory,
}

impl ReportScope {
    /// Build a single-date scope from a CLI/API argument. Rejects anything
    /// that is not strict `YYYY-MM-DD` before any corpus read — an invalid
    /// date must never be reinterpreted as "process everything".
    pub fn for_date_str(s: &str) -> Result<Self, ReportError> {
        parse_report_date(s)
            .map(Self::Date)
            .ok_or_else(|| ReportError::InvalidDate(s.to_string()))
    }
}

/// Counts reported on success.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRun {
    /// Distinct days that had commit activity in this run's scope.
    pub days_processed: usize,
    /// Summary rows written, including no-activity backfill rows.
    pub summaries_generated: usize,
    /// Row-level merge failures during a full recompute (single-date runs
    /// are all-or-nothing and always report 0 here).
    pub failures: usize,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Invalid date format: '{0}'. Please use YYYY-MM-DD format.")]
    InvalidDate(String),

    #[error("Summary store unavailable: {0}")]
    Storage(#[from] DbError),
}

impl From<sqlx::Error> for ReportError {
    fn from(e: sqlx::Error) -> Self {
        Self::Storage(DbError::Sqlx(e))
    }
}

/// Generate (or regenerate) daily summaries for the given scope.
///
/// Safely re-runnable: the same corpus and scope always converge to the
/// same persisted rows. Single-date runs replace that date's rows in one
/// transaction and densify it with no-activity rows; a full recompute
/// upserts per key, preserving keys absent from the new computation, and
/// is best-effort per row.
pub async fn generate_daily_report(
    db: &Database,
    scope: ReportScope,
) -> Result<ReportRun, ReportError> {
    let target = match scope {
        ReportScope::Yesterday => Some(reporting_yesterday(Utc::now())),
        ReportScope::Date(date) => Some(date),
        ReportScope::FullHistory => None,
    };

    // Loading. The aggregator dedupes defensively so a corpus that still
    // carries duplicate hashes rolls up to the earliest analysis.
    let corpus = dedupe_records(db.list_commit_records().await?);
    let index = position_index(&corpus);

    // Grouping + reducing, pure and in-memory.
    let mut summaries = build_daily_summaries(&corpus, &index, target);
    let days_processed: usize = {
        let days: BTreeSet<&str> = summaries.iter().map(|s| s.date.as_str()).collect();
        days.len()
    };

    // Merging.
    let run = match target {
        Some(date) => {
            backfill_no_activity(&mut summaries, &corpus_users(&corpus), date);
            db.replace_summaries_for_date(&format_date(date), &summaries)
                .await?;
            ReportRun {
                days_processed,
                summaries_generated: summaries.len(),
                failures: 0,
            }
        }
        None => {
            let mut written = 0usize;
            let mut failures = 0usize;
            for summary in &summaries {
                match db.upsert_daily_summary(summary).await {
                    Ok(()) => written += 1,
                    Err(e) => {
                        warn!(
                            date = %summary.date,
                            user = %summary.user,
                            error = %e,
                            "failed to merge summary row"
                        );
                        failures += 1;
                    }
                }
            }
            ReportRun {
                days_processed,
                summaries_generated: written,
                failures,
            }
        }
    };

    info!(
        days_processed = run.days_processed,
        summaries_generated = run.summaries_generated,
        failures = run.failures,
        "daily report generated"
    );
    Ok(run)
}
