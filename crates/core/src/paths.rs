// crates/core/src/paths.rs
//! Centralized path functions for all app storage locations.
//!
//! Single source of truth — eliminates ad-hoc `dirs::cache_dir().join(...)`
//! scattered across crates.

use std::path::PathBuf;

/// App cache root: `~/Library/Caches/commitlens/` (macOS) or
/// `~/.cache/commitlens/` (Linux).
pub fn app_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("commitlens"))
}

/// SQLite database file: `<app_cache_dir>/commitlens.db`.
pub fn db_path() -> Option<PathBuf> {
    app_cache_dir().map(|d| d.join("commitlens.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_cache_dir() {
        let dir = app_cache_dir();
        assert!(dir.is_some());
        assert!(dir.unwrap().to_string_lossy().contains("commitlens"));
    }

    #[test]
    fn test_db_path() {
        let path = db_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().ends_with("commitlens.db"));
    }
}
