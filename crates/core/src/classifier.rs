// crates/core/src/classifier.rs
//! Rule-based status classification for commit analysis records.
//!
//! `classify` is a pure function: it never persists anything and never
//! fails. Appending a `StatusLogEntry` when the computed status differs
//! from the stored one is the caller's job.

use serde::{Deserialize, Serialize};

use crate::types::{CommitAnalysisRecord, CommitStatus, StatusCounts};

/// Reason returned while the assessment pipeline still owns the record.
const ANALYZING_REASON: &str = "AI models are currently analyzing this commit...";

/// Reason returned when no rule matched.
const NO_ISSUES_REASON: &str = "No issues detected";

/// Outcome of classifying one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub status: CommitStatus,
    pub reason: String,
}

/// Classify a record into a severity tier with a human-readable reason.
///
/// Precedence, in order:
/// 1. A manually reviewed record keeps its stored status — human judgment
///    always wins over rule evaluation.
/// 2. A record still `analyzing` is reported as such without evaluating
///    any rule.
/// 3. Otherwise the rule battery runs in fixed order; every matched reason
///    is kept (comma-joined, rule order) and the final status is the most
///    severe tier triggered.
pub fn classify(record: &CommitAnalysisRecord) -> Classification {
    if record.manually_reviewed {
        let reason = match record.status_log.last() {
            Some(entry) => format!("Manually reviewed - {}", entry.reason),
            None => "Manually reviewed".to_string(),
        };
        return Classification {
            status: record.status,
            reason,
        };
    }

    if record.status == CommitStatus::Analyzing {
        return Classification {
            status: CommitStatus::Analyzing,
            reason: ANALYZING_REASON.to_string(),
        };
    }

    let mut status = CommitStatus::Ok;
    let mut reasons: Vec<&'static str> = Vec::new();
    let mut hit = |tier: CommitStatus, reason: &'static str| {
        reasons.push(reason);
        if tier.severity() > status.severity() {
            status = tier;
        }
    };

    let avg = &record.averages;
    let total_lines = record.total_lines();

    if avg.code_quality < 2.0 {
        hit(CommitStatus::Error, "Very low code quality");
    } else if avg.code_quality < 3.0 {
        hit(CommitStatus::Abnormal, "Low code quality");
    }

    if avg.complexity > 4.5 {
        hit(CommitStatus::Error, "Very high complexity");
    } else if avg.complexity > 3.5 {
        hit(CommitStatus::Abnormal, "High complexity");
    }

    if avg.ai_percentage > 90.0 {
        hit(CommitStatus::Abnormal, "Very high AI usage (>90%)");
    }

    if total_lines > 5000 {
        hit(CommitStatus::Error, "Very large commit (>5000 lines)");
    } else if total_lines > 2000 {
        hit(CommitStatus::Abnormal, "Large commit (>2000 lines)");
    }

    if avg.estimated_hours > 100.0 {
        hit(CommitStatus::Abnormal, "Unusually high time estimate");
    }

    if record.author.is_empty() || record.author == "unknown" {
        hit(CommitStatus::Abnormal, "Unknown user");
    }

    if record.project.is_empty() || record.project == "unknown" {
        hit(CommitStatus::Abnormal, "Unknown project");
    }

    let message = record.commit_message.to_lowercase();
    if message.contains("test")
        || message.contains("temp")
        || (message.contains("fix typo") && total_lines > 100)
    {
        hit(CommitStatus::Abnormal, "Suspicious commit message pattern");
    }

    let reason = if reasons.is_empty() {
        NO_ISSUES_REASON.to_string()
    } else {
        reasons.join(", ")
    };

    Classification { status, reason }
}

/// Tally effective statuses across a record set for the alerts overview.
/// Uses `classify`, so manual-review and analyzing precedence apply.
pub fn status_counts(records: &[CommitAnalysisRecord]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for record in records {
        counts.record(classify(record).status);
    }
    counts
}

// ============================================================================
// Tests
// ============================================================================
