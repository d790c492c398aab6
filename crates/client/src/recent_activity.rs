//! Recent-activity log kept in local key/value storage.
//!
//! Entries are `{ path, at }` with `at` in epoch milliseconds, newest first.
//! The data is cosmetic, so every read fails open: malformed storage gives
//! an empty list and malformed entries are skipped.

use std::{
    collections::HashMap,
    fs, io,
    path::PathBuf,
    sync::{Mutex, PoisonError},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Storage key.
pub const STORAGE_KEY: &str = "pt_recent_activity_v1";
/// Entries kept in storage.
pub const MAX_STORED: usize = 8;
/// Entries shown on the account page.
pub const MAX_DISPLAYED: usize = 6;

/// One visited page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Site-relative path, always starting with `/`.
    pub path: String,
    /// Visit time in epoch milliseconds; positive and finite.
    pub at: f64,
}

impl ActivityEntry {
    fn is_valid(&self) -> bool {
        self.path.starts_with('/') && self.at.is_finite() && self.at > 0.0
    }

    fn from_value(value: &Value) -> Option<Self> {
        let entry = Self {
            path: value.get("path")?.as_str()?.to_string(),
            at: value.get("at")?.as_f64()?,
        };
        entry.is_valid().then_some(entry)
    }
}

/// String key/value store in the style of browser local storage.
pub trait ActivityStorage: Send + Sync {
    /// Stored value, or `None` if missing or unreadable.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Store a value.
    fn set_item(&self, key: &str, value: &str) -> io::Result<()>;
}

/// In-memory storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ActivityStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> io::Result<()> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Storage backed by one file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `dir`, created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl ActivityStorage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set_item(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)
    }
}

/// The recent-activity log.
pub struct RecentActivity<S> {
    storage: S,
}

impl<S: ActivityStorage> RecentActivity<S> {
    /// Log over `storage`.
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Record a visit now. Paths without a leading `/` are ignored.
    pub fn record(&self, path: &str) {
        self.record_at(path, chrono::Utc::now().timestamp_millis() as f64);
    }

    /// Record a visit at `at` epoch milliseconds.
    pub fn record_at(&self, path: &str, at: f64) {
        let entry = ActivityEntry {
            path: path.to_string(),
            at,
        };
        if !entry.is_valid() {
            tracing::debug!(path = %path, "Ignoring invalid recent-activity entry");
            return;
        }

        let mut entries = self.read_all();
        entries.insert(0, entry);
        entries.truncate(MAX_STORED);

        let encoded = match serde_json::to_string(&entries) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::debug!(error = %e, "Failed to encode recent activity");
                return;
            }
        };
        if let Err(e) = self.storage.set_item(STORAGE_KEY, &encoded) {
            tracing::debug!(error = %e, "Failed to persist recent activity");
        }
    }

    /// All valid stored entries, newest first. Never fails.
    pub fn read_all(&self) -> Vec<ActivityEntry> {
        let Some(raw) = self.storage.get_item(STORAGE_KEY) else {
            return Vec::new();
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(items)) => items.iter().filter_map(ActivityEntry::from_value).collect(),
            Ok(_) | Err(_) => Vec::new(),
        }
    }

    /// Entries for the account page.
    pub fn for_display(&self) -> Vec<ActivityEntry> {
        let mut entries = self.read_all();
        entries.truncate(MAX_DISPLAYED);
        entries
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const T0: f64 = 1_700_000_000_000.0;

    fn log_with(raw: &str) -> RecentActivity<MemoryStorage> {
        let storage = MemoryStorage::new();
        storage.set_item(STORAGE_KEY, raw).unwrap();
        RecentActivity::new(storage)
    }

    #[test]
    fn test_round_trip_keeps_order() {
        let log = RecentActivity::new(MemoryStorage::new());
        for i in 0..5 {
            log.record_at(&format!("/peptide/{i}"), T0 + f64::from(i));
        }

        let paths: Vec<_> = log.read_all().into_iter().map(|e| e.path).collect();
        assert_eq!(
            paths,
            ["/peptide/4", "/peptide/3", "/peptide/2", "/peptide/1", "/peptide/0"]
        );
    }

    #[test]
    fn test_ninth_entry_drops_oldest() {
        let log = RecentActivity::new(MemoryStorage::new());
        for i in 0..9 {
            log.record_at(&format!("/p/{i}"), T0 + f64::from(i));
        }

        let entries = log.read_all();
        assert_eq!(entries.len(), MAX_STORED);
        assert_eq!(entries[0].path, "/p/8");
        assert_eq!(entries[MAX_STORED - 1].path, "/p/1");
    }

    #[test]
    fn test_display_shows_six() {
        let log = RecentActivity::new(MemoryStorage::new());
        for i in 0..8 {
            log.record_at(&format!("/p/{i}"), T0 + f64::from(i));
        }

        let shown = log.for_display();
        assert_eq!(shown.len(), MAX_DISPLAYED);
        assert_eq!(shown[0].path, "/p/7");
    }

    #[test]
    fn test_malformed_storage_fails_open() {
        assert!(log_with("not json").read_all().is_empty());
        assert!(log_with(r#"{"not":"an array"}"#).read_all().is_empty());
        assert!(RecentActivity::new(MemoryStorage::new()).read_all().is_empty());
    }

    #[test]
    fn test_invalid_entries_are_dropped() {
        let log = log_with(
            r#"[
                {"path":"x","at":123},
                {"path":"/x","at":0},
                {"path":"/x","at":-5},
                {"path":"/x","at":"1700000000000"},
                {"path":5,"at":1700000000000},
                "junk",
                {"path":"/x","at":1700000000000}
            ]"#,
        );

        assert_eq!(
            log.read_all(),
            vec![ActivityEntry {
                path: "/x".to_string(),
                at: T0,
            }]
        );
    }

    #[test]
    fn test_record_ignores_relative_path() {
        let log = RecentActivity::new(MemoryStorage::new());
        log.record_at("account", T0);
        log.record_at("/account", 0.0);

        assert!(log.read_all().is_empty());
    }

    #[test]
    fn test_record_replaces_malformed_storage() {
        let log = log_with("not json");
        log.record_at("/upgrade", T0);

        assert_eq!(log.read_all().len(), 1);
    }

    #[test]
    fn test_record_uses_current_time() {
        let log = RecentActivity::new(MemoryStorage::new());
        log.record("/account");

        let entries = log.read_all();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].at > T0);
    }

    #[test]
    fn test_file_storage_persists_between_instances() {
        let dir = std::env::temp_dir().join(format!("peptalk-activity-{}", uuid::Uuid::new_v4()));

        RecentActivity::new(FileStorage::new(&dir)).record_at("/account", T0);
        let reopened = RecentActivity::new(FileStorage::new(&dir));

        assert_eq!(reopened.read_all()[0].path, "/account");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
