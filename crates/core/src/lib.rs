// crates/core/src/lib.rs
//! Commit analytics core: record types, rule-based status classification,
//! and the daily rollup aggregation. Pure logic only — persistence lives
//! in `commitlens-db`.

pub mod classifier;
pub mod paths;
pub mod reporting_time;
pub mod rollup;
pub mod types;

pub use classifier::*;
pub use reporting_time::*;
pub use rollup::*;
pub use types::*;
