/// Inline SQL migrations for the commitlens database schema.
///
/// We use simple inline migrations rather than sqlx migration files
/// because the schema is small and self-contained.

pub const MIGRATIONS: &[&str] = &[
    // Migration 1: commits table. `commit_hash` is indexed but deliberately
    // not UNIQUE: the canonical store dedupes on ingest, and the rollup
    // dedupes defensively, so a pre-deduplication corpus must remain
    // representable.
    r#"
CREATE TABLE IF NOT EXISTS commits (
    id INTEGER PRIMARY KEY,
    commit_hash TEXT NOT NULL,
    commit_message TEXT NOT NULL DEFAULT '',
    author TEXT NOT NULL DEFAULT '',
    project TEXT NOT NULL DEFAULT '',
    organization TEXT NOT NULL DEFAULT '',
    commit_timestamp TEXT NOT NULL,
    analyzed_at TEXT NOT NULL,
    lines_added INTEGER NOT NULL DEFAULT 0,
    lines_deleted INTEGER NOT NULL DEFAULT 0,
    files_changed INTEGER NOT NULL DEFAULT 0,
    model_scores TEXT NOT NULL DEFAULT '[]',
    avg_code_quality REAL NOT NULL DEFAULT 0,
    avg_complexity REAL NOT NULL DEFAULT 0,
    avg_dev_level REAL NOT NULL DEFAULT 0,
    avg_estimated_hours REAL NOT NULL DEFAULT 0,
    avg_estimated_hours_with_ai REAL NOT NULL DEFAULT 0,
    avg_ai_percentage REAL NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'ok' CHECK (status IN ('ok', 'abnormal', 'error', 'analyzing')),
    manually_reviewed INTEGER NOT NULL DEFAULT 0,
    status_log TEXT NOT NULL DEFAULT '[]'
);
"#,
    // Migration 2: commits indexes
    r#"
CREATE INDEX IF NOT EXISTS idx_commits_hash ON commits(commit_hash);
"#,
    r#"
CREATE INDEX IF NOT EXISTS idx_commits_timestamp ON commits(commit_timestamp DESC);
"#,
    r#"
CREATE INDEX IF NOT EXISTS idx_commits_author ON commits(author);
"#,
    // Migration 3: daily_summaries table, one row per (date, user)
    r#"
CREATE TABLE IF NOT EXISTS daily_summaries (
    id INTEGER PRIMARY KEY,
    date TEXT NOT NULL,
    user TEXT NOT NULL,
    avg_code_quality REAL NOT NULL DEFAULT 0,
    avg_complexity REAL NOT NULL DEFAULT 0,
    avg_dev_level REAL NOT NULL DEFAULT 0,
    total_hours REAL NOT NULL DEFAULT 0,
    commit_count INTEGER NOT NULL DEFAULT 0,
    lines_added INTEGER NOT NULL DEFAULT 0,
    lines_deleted INTEGER NOT NULL DEFAULT 0,
    projects TEXT NOT NULL DEFAULT '[]',
    commit_hashes TEXT NOT NULL DEFAULT '[]',
    commit_indices TEXT NOT NULL DEFAULT '[]',
    UNIQUE(date, user)
);
"#,
    r#"
CREATE INDEX IF NOT EXISTS idx_summaries_date ON daily_summaries(date DESC);
"#,
];
