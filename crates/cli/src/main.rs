// crates/cli/src/main.rs
//! commitlens binary.
//!
//! Drives the batch report pipeline and the classification sinks against
//! the shared SQLite store. The nightly cron invokes `commitlens report`
//! with no arguments (yesterday in the reporting timezone); everything
//! else is for on-demand use.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commitlens_core::{classify, status_counts, CommitStatus};
use commitlens_db::{generate_daily_report, Database, ReportScope};

#[derive(Parser)]
#[command(name = "commitlens", version, about = "Commit analytics: daily rollups and status classification")]
struct Cli {
    /// Path to the SQLite database. Defaults to the cache-dir database.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate daily summaries. With no flags, processes yesterday in
    /// the reporting timezone.
    Report {
        /// Regenerate one explicit date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "all")]
        date: Option<String>,
        /// Recompute across all history
        #[arg(long)]
        all: bool,
    },
    /// Classify one commit and print the result without persisting
    Classify {
        /// Commit hash
        hash: String,
    },
    /// Force a status onto a commit (marks it manually reviewed)
    SetStatus {
        /// Commit hash
        hash: String,
        /// New status: ok, abnormal, or error
        status: String,
        /// Who is making the change
        #[arg(long = "by")]
        changed_by: String,
        /// Why (defaults to "Manual status change")
        #[arg(long)]
        reason: Option<String>,
    },
    /// List persisted daily summaries
    Summaries {
        /// Restrict to one date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// Per-status record counts across the corpus
    StatusCounts,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let db = match &cli.db {
        Some(path) => Database::new(path).await,
        None => Database::open_default().await,
    }
    .context("failed to open database")?;

    match cli.command {
        Command::Report { date, all } => {
            let scope = if all {
                ReportScope::FullHistory
            } else {
                match date.as_deref() {
                    Some(s) => ReportScope::for_date_str(s)?,
                    None => ReportScope::Yesterday,
                }
            };
            match generate_daily_report(&db, scope).await {
                Ok(run) => {
                    println!(
                        "Daily report generated: {} day(s) processed, {} summaries written",
                        run.days_processed, run.summaries_generated
                    );
                    if run.failures > 0 {
                        println!("{} row(s) failed to merge, see logs", run.failures);
                        std::process::exit(1);
                    }
                }
                Err(e) => {
                    eprintln!("Report generation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Command::Classify { hash } => {
            let record = db
                .get_commit_record(&hash)
                .await?
                .with_context(|| format!("commit not found: {hash}"))?;
            let result = classify(&record);
            println!("{}: {}", result.status, result.reason);
        }
        Command::SetStatus {
            hash,
            status,
            changed_by,
            reason,
        } => {
            let Some(status) = CommitStatus::parse_str(&status) else {
                bail!("invalid status '{status}': must be ok, abnormal, or error");
            };
            let updated = db
                .set_commit_status(&hash, status, &changed_by, reason.as_deref())
                .await?;
            println!("Status updated successfully for {updated} commit(s)");
        }
        Command::Summaries { date } => {
            let summaries = match date.as_deref() {
                Some(d) => db.list_summaries_for_date(d).await?,
                None => db.list_daily_summaries().await?,
            };
            if summaries.is_empty() {
                println!("No summaries found");
            }
            for s in summaries {
                println!(
                    "{} {:<16} commits={:<3} hours={:<6.1} quality={:.2} complexity={:.2} projects=[{}]",
                    s.date,
                    s.user,
                    s.commit_count,
                    s.total_hours,
                    s.avg_code_quality,
                    s.avg_complexity,
                    s.projects.join(", ")
                );
            }
        }
        Command::StatusCounts => {
            let records = db.list_commit_records().await?;
            let counts = status_counts(&records);
            println!("error:     {}", counts.error);
            println!("abnormal:  {}", counts.abnormal);
            println!("ok:        {}", counts.ok);
            println!("analyzing: {}", counts.analyzing);
            println!("total:     {}", counts.total());
        }
    }

    Ok(())
}
