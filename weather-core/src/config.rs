use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

/// Environment variable that overrides the configured access key.
pub const ACCESS_KEY_ENV: &str = "WEATHERSTACK_ACCESS_KEY";

pub const DEFAULT_HOST: &str = "api.weatherstack.com";
pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_REQUEST_CAPACITY: usize = 300;
pub const DEFAULT_RESPONSE_CAPACITY: usize = 3000;

/// Worker configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// access_key = "..."
/// host = "api.weatherstack.com"
/// port = 80
/// io_timeout_secs = 10
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub access_key: String,

    #[serde(default = "default_request_capacity")]
    pub request_capacity: usize,

    #[serde(default = "default_response_capacity")]
    pub response_capacity: usize,

    /// Deadline for each transport operation. Absent means none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub io_timeout_secs: Option<u64>,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_request_capacity() -> usize {
    DEFAULT_REQUEST_CAPACITY
}

fn default_response_capacity() -> usize {
    DEFAULT_RESPONSE_CAPACITY
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            access_key: String::new(),
            request_capacity: default_request_capacity(),
            response_capacity: default_response_capacity(),
            io_timeout_secs: None,
        }
    }
}

impl WorkerConfig {
    pub fn with_access_key(access_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            ..Self::default()
        }
    }

    /// Load config from the platform config directory.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    /// Load config from `path`, apply the environment override and validate it.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut cfg = Self::read_file(path)?;
        cfg.apply_access_key_override(std::env::var(ACCESS_KEY_ENV).ok());

        cfg.validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(cfg)
    }

    /// Parse the file at `path` as-is, without environment or validation.
    pub fn read_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Replace the access key with `value` unless it is unset or blank.
    pub fn apply_access_key_override(&mut self, value: Option<String>) {
        if let Some(key) = value.filter(|key| !key.trim().is_empty()) {
            self.access_key = key;
        }
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-worker")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.access_key.trim().is_empty() {
            bail!(
                "No access key configured.\n\
                 Hint: set `access_key` in the config file or export {ACCESS_KEY_ENV}."
            );
        }
        if self.host.trim().is_empty() {
            bail!("Host name must not be empty");
        }
        if self.port == 0 {
            bail!("Port must be non-zero");
        }
        if self.request_capacity == 0 || self.response_capacity == 0 {
            bail!("Request and response buffer capacities must be non-zero");
        }
        Ok(())
    }

    pub fn io_timeout(&self) -> Option<Duration> {
        self.io_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_weatherstack() {
        let cfg = WorkerConfig::default();
        assert_eq!(cfg.host, "api.weatherstack.com");
        assert_eq!(cfg.port, 80);
        assert_eq!(cfg.request_capacity, 300);
        assert_eq!(cfg.response_capacity, 3000);
        assert_eq!(cfg.io_timeout(), None);
    }

    #[test]
    fn minimal_toml_fills_in_defaults() {
        let cfg: WorkerConfig = toml::from_str("access_key = \"abc\"").unwrap();
        assert_eq!(cfg, WorkerConfig::with_access_key("abc"));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn blank_access_key_is_rejected() {
        let err = WorkerConfig::with_access_key("  ").validate().unwrap_err();
        assert!(err.to_string().contains("No access key configured"));
    }

    #[test]
    fn zero_port_and_capacity_are_rejected() {
        let mut cfg = WorkerConfig::with_access_key("abc");
        cfg.port = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = WorkerConfig::with_access_key("abc");
        cfg.response_capacity = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn timeout_is_passed_through_in_seconds() {
        let mut cfg = WorkerConfig::with_access_key("abc");
        cfg.io_timeout_secs = Some(7);
        assert_eq!(cfg.io_timeout(), Some(Duration::from_secs(7)));
    }

    #[test]
    fn save_then_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = WorkerConfig::with_access_key("FILE_KEY");
        cfg.port = 8080;
        cfg.io_timeout_secs = Some(5);
        cfg.save_to(&path).unwrap();

        let loaded = WorkerConfig::read_file(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn unset_override_keeps_file_key() {
        let mut cfg = WorkerConfig::with_access_key("FILE_KEY");
        cfg.apply_access_key_override(None);
        assert_eq!(cfg.access_key, "FILE_KEY");
    }

    #[test]
    fn blank_override_keeps_file_key() {
        let mut cfg = WorkerConfig::with_access_key("FILE_KEY");
        cfg.apply_access_key_override(Some(String::new()));
        cfg.apply_access_key_override(Some("  ".into()));
        assert_eq!(cfg.access_key, "FILE_KEY");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn non_blank_override_replaces_file_key() {
        let mut cfg = WorkerConfig::with_access_key("FILE_KEY");
        cfg.apply_access_key_override(Some("ENV_KEY".into()));
        assert_eq!(cfg.access_key, "ENV_KEY");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = WorkerConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
