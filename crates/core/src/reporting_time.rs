// crates/core/src/reporting_time.rs
//! Reporting-timezone arithmetic.
//!
//! All rollup dates are calendar days at a fixed UTC−6 offset (the
//! deployment's reporting timezone). The offset is deliberately not
//! DST-adjusted: a single constant keeps "yesterday" stable across hosts
//! and re-runs, which matters more to the report consumers than wall-clock
//! precision around transitions.

use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Fixed reporting timezone offset, in hours relative to UTC.
pub const REPORTING_TZ_OFFSET_HOURS: i64 = -6;

/// Calendar day of `ts` in the reporting timezone.
pub fn reporting_date(ts: DateTime<Utc>) -> NaiveDate {
    (ts + Duration::hours(REPORTING_TZ_OFFSET_HOURS)).date_naive()
}

/// Yesterday relative to `now`, in the reporting timezone. The scheduled
/// nightly report processes this date.
pub fn reporting_yesterday(now: DateTime<Utc>) -> NaiveDate {
    reporting_date(now) - Duration::days(1)
}

/// Render a date as the canonical `YYYY-MM-DD` summary key.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Strictly parse a `YYYY-MM-DD` date argument.
///
/// Rejects anything that does not round-trip (wrong separators, missing
/// zero padding, trailing garbage) so an invalid argument can never be
/// silently reinterpreted as "process everything".
pub fn parse_report_date(s: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    (format_date(date) == s).then_some(date)
}
