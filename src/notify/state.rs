//! Persisted notification rate-limiter state.

use crate::error::{StorageError, StorageResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Counters behind the notification rate limits.
///
/// Invariant: `hourly_count` is the number of notifications counted
/// since `hour_window_start`; the gate resets it whenever the window
/// grows older than one hour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationState {
    pub hourly_count: u32,
    pub hour_window_start: DateTime<Utc>,
    pub per_host_last_sent: HashMap<String, DateTime<Utc>>,
}

impl Default for NotificationState {
    fn default() -> Self {
        Self {
            hourly_count: 0,
            hour_window_start: Utc::now(),
            per_host_last_sent: HashMap::new(),
        }
    }
}

impl NotificationState {
    /// Load state from disk. A missing or unreadable file yields fresh
    /// state; the limits then restart, which only errs toward sending.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not load notification state");
                return Self::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "corrupt notification state, starting fresh");
                Self::default()
            }
        }
    }

    /// Persist state to disk.
    pub fn save(&self, path: &Path) -> StorageResult<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        fs::write(path, content).map_err(|e| StorageError::WriteFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut state = NotificationState::default();
        state.hourly_count = 3;
        state
            .per_host_last_sent
            .insert("mail.example.com".to_string(), Utc::now());
        state.save(&path).unwrap();

        let loaded = NotificationState::load(&path);
        assert_eq!(loaded.hourly_count, 3);
        assert!(loaded.per_host_last_sent.contains_key("mail.example.com"));
    }

    #[test]
    fn test_missing_file_yields_fresh_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = NotificationState::load(&dir.path().join("absent.json"));
        assert_eq!(state.hourly_count, 0);
        assert!(state.per_host_last_sent.is_empty());
    }

    #[test]
    fn test_corrupt_file_yields_fresh_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();

        let state = NotificationState::load(&path);
        assert_eq!(state.hourly_count, 0);
    }
}
