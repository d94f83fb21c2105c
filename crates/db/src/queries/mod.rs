// crates/db/src/queries/mod.rs
// Commit-corpus and daily-summary CRUD for the commitlens SQLite database.

mod commits;
pub(crate) mod row_types;
mod summaries;

pub use commits::StatusError;
