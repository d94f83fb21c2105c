// crates/core/src/rollup.rs
//! Rollup aggregation: commit analysis records → per-day-per-user
//! summaries.
//!
//! Everything here is a pure transformation over a corpus snapshot passed
//! in by the caller; persistence and merging with previously stored
//! summaries live in the db crate. The central property is idempotence:
//! the same corpus always reduces to the same summaries.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;

use crate::reporting_time::{format_date, reporting_date};
use crate::types::{CommitAnalysisRecord, DailySummary};

/// Drop duplicate commit hashes, keeping the earliest `analyzed_at` for
/// each. Corpus order of the survivors is preserved.
///
/// Duplicate resolution normally happens upstream at ingest; this runs
/// defensively before every grouping pass so a pre-deduplication corpus
/// still rolls up correctly.
pub fn dedupe_records(records: Vec<CommitAnalysisRecord>) -> Vec<CommitAnalysisRecord> {
    let mut kept: Vec<CommitAnalysisRecord> = Vec::with_capacity(records.len());
    let mut by_hash: HashMap<String, usize> = HashMap::with_capacity(records.len());

    for record in records {
        match by_hash.get(&record.commit_hash) {
            Some(&i) => {
                if record.analyzed_at < kept[i].analyzed_at {
                    tracing::debug!(
                        commit_hash = %record.commit_hash,
                        "duplicate commit: replacing with earlier analysis"
                    );
                    kept[i] = record;
                } else {
                    tracing::debug!(
                        commit_hash = %record.commit_hash,
                        "duplicate commit: dropping later analysis"
                    );
                }
            }
            None => {
                by_hash.insert(record.commit_hash.clone(), kept.len());
                kept.push(record);
            }
        }
    }

    kept
}

/// Hash → position within the newest-first ordering of the complete
/// corpus. Built once per run; consumers that render the same global
/// ordering resolve `commit_indices` against it.
pub fn position_index(corpus: &[CommitAnalysisRecord]) -> HashMap<String, i64> {
    let mut ordered: Vec<(&str, chrono::DateTime<chrono::Utc>)> = corpus
        .iter()
        .map(|r| (r.commit_hash.as_str(), r.commit_timestamp))
        .collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1));

    ordered
        .into_iter()
        .enumerate()
        .map(|(i, (hash, _))| (hash.to_string(), i as i64))
        .collect()
}

/// All users appearing anywhere in the corpus, sorted. Drives the
/// no-activity backfill.
pub fn corpus_users(corpus: &[CommitAnalysisRecord]) -> BTreeSet<String> {
    corpus.iter().map(|r| r.author.clone()).collect()
}

/// Group the corpus by (reporting-day, author) and reduce each group to a
/// `DailySummary`. With a `target` date only matching commits are grouped;
/// the `index` must still come from the complete corpus so positions stay
/// meaningful.
///
/// Commits with an empty model-score list count toward `commit_count` and
/// the line totals, contribute 0 hours, and are excluded from the
/// quality/complexity/dev-level denominators.
pub fn build_daily_summaries(
    corpus: &[CommitAnalysisRecord],
    index: &HashMap<String, i64>,
    target: Option<NaiveDate>,
) -> Vec<DailySummary> {
    let mut groups: BTreeMap<(String, String), Vec<&CommitAnalysisRecord>> = BTreeMap::new();

    for record in corpus {
        let day = reporting_date(record.commit_timestamp);
        if let Some(target) = target {
            if day != target {
                continue;
            }
        }
        groups
            .entry((format_date(day), record.author.clone()))
            .or_default()
            .push(record);
    }

    let mut summaries: Vec<DailySummary> = groups
        .into_iter()
        .map(|((date, user), commits)| reduce_group(date, user, &commits, index))
        .collect();

    sort_summaries(&mut summaries);
    summaries
}

fn reduce_group(
    date: String,
    user: String,
    commits: &[&CommitAnalysisRecord],
    index: &HashMap<String, i64>,
) -> DailySummary {
    let scored: Vec<&CommitAnalysisRecord> = commits
        .iter()
        .copied()
        .filter(|c| c.has_scores())
        .collect();
    let denominator = scored.len() as f64;

    let mean = |f: fn(&CommitAnalysisRecord) -> f64| -> f64 {
        if scored.is_empty() {
            0.0
        } else {
            scored.iter().map(|&c| f(c)).sum::<f64>() / denominator
        }
    };

    let projects: BTreeSet<String> = commits.iter().map(|c| c.project.clone()).collect();

    DailySummary {
        date,
        user,
        avg_code_quality: mean(|c| c.averages.code_quality),
        avg_complexity: mean(|c| c.averages.complexity),
        avg_dev_level: mean(|c| c.averages.dev_level),
        total_hours: commits.iter().map(|c| c.averages.estimated_hours).sum(),
        commit_count: commits.len() as i64,
        lines_added: commits.iter().map(|c| c.lines_added).sum(),
        lines_deleted: commits.iter().map(|c| c.lines_deleted).sum(),
        projects: projects.into_iter().collect(),
        commit_hashes: commits.iter().map(|c| c.commit_hash.clone()).collect(),
        commit_indices: commits
            .iter()
            .filter_map(|c| index.get(&c.commit_hash).copied())
            .collect(),
    }
}

/// Materialize a zero row for every corpus user missing from `summaries`
/// on `date`, then restore presentation order. Single-date runs call this
/// so the per-user daily view is dense.
pub fn backfill_no_activity(
    summaries: &mut Vec<DailySummary>,
    users: &BTreeSet<String>,
    date: NaiveDate,
) {
    let date = format_date(date);
    let present: BTreeSet<&str> = summaries
        .iter()
        .filter(|s| s.date == date)
        .map(|s| s.user.as_str())
        .collect();

    let missing: Vec<String> = users
        .iter()
        .filter(|u| !present.contains(u.as_str()))
        .cloned()
        .collect();

    for user in missing {
        summaries.push(DailySummary::no_activity(date.clone(), user));
    }

    sort_summaries(summaries);
}

/// Presentation order for persisted summaries: date descending, then user
/// ascending within a date. Stable so paginating consumers see consistent
/// positions.
pub fn sort_summaries(summaries: &mut [DailySummary]) {
    summaries.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.user.cmp(&b.user)));
}

// ============================================================================
// Tests
// ============================================================================
