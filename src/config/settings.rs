//! Application settings and paths.
//!
//! Settings are loaded once at startup into an immutable value that is
//! passed to every component needing it; nothing reads configuration
//! after the scan begins.

use crate::error::{ConfigError, ConfigResult};
use crate::notify::DispatchPolicy;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

static PATHS: OnceLock<Paths> = OnceLock::new();

/// XDG-compliant application directories.
#[derive(Debug, Clone)]
pub struct Paths {
    /// ~/.config/mailsweep
    pub config_dir: PathBuf,
    /// ~/.local/share/mailsweep
    pub data_dir: PathBuf,
}

impl Paths {
    /// The process-wide paths instance, created on first use.
    pub fn get() -> &'static Paths {
        PATHS.get_or_init(|| Self::new().expect("Failed to initialize paths"))
    }

    fn new() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "mailsweep", "mailsweep")
            .ok_or(ConfigError::DirectoryNotFound)?;

        let paths = Self {
            config_dir: project.config_dir().to_path_buf(),
            data_dir: project.data_dir().to_path_buf(),
        };

        fs::create_dir_all(&paths.config_dir)?;
        fs::create_dir_all(&paths.data_dir)?;

        Ok(paths)
    }

    /// Settings file location.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Persisted notification rate-limiter state.
    pub fn state_file(&self) -> PathBuf {
        self.data_dir.join("notify_state.json")
    }

    /// Execution log location.
    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("mailsweep.log")
    }
}

/// Scanner-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Destination port for every probe.
    pub port: u16,
    /// Connect and per-step read timeout in milliseconds.
    pub timeout_ms: u64,
    /// Name announced in the EHLO greeting.
    pub helo_name: String,
    /// Maximum connection attempts per second, 0 for unlimited.
    pub rate_limit: u32,
    /// How long to wait for workers at shutdown, in seconds.
    pub shutdown_grace_secs: u64,
    /// Master switch for operator notifications.
    pub notifications_enabled: bool,
    /// Hourly cap on notifications.
    pub max_notifications_per_hour: u32,
    /// Minimum spacing between notifications for one host, in seconds.
    pub min_notification_interval_secs: u64,
    /// Whether failed dispatches consume a notification slot.
    pub dispatch_policy: DispatchPolicy,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            port: 25,
            timeout_ms: 15_000,
            helo_name: "probe.local".to_string(),
            rate_limit: 0,
            shutdown_grace_secs: 5,
            notifications_enabled: true,
            max_notifications_per_hour: 10,
            min_notification_interval_secs: 300,
            dispatch_policy: DispatchPolicy::CountAttempts,
        }
    }
}

impl ScanSettings {
    /// Load settings from the default location.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::get().settings_file();
        if !file.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Save settings to the default location.
    pub fn save(&self) -> ConfigResult<()> {
        let file = Paths::get().settings_file();
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&file, content).map_err(|e| ConfigError::WriteFailed {
            path: file,
            reason: e.to_string(),
        })
    }

    /// Per-step probe timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Bound on waiting for workers to exit.
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = ScanSettings::default();
        assert_eq!(settings.port, 25);
        assert_eq!(settings.timeout_ms, 15_000);
        assert_eq!(settings.max_notifications_per_hour, 10);
        assert_eq!(settings.min_notification_interval_secs, 300);
    }

    #[test]
    fn test_settings_serialization() {
        let settings = ScanSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let parsed: ScanSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.port, settings.port);
        assert_eq!(parsed.dispatch_policy, settings.dispatch_policy);
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let parsed: ScanSettings = serde_json::from_str(r#"{"port": 587}"#).unwrap();
        assert_eq!(parsed.port, 587);
        assert_eq!(parsed.timeout_ms, 15_000);
    }
}
