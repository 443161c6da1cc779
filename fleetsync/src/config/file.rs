//! Configuration file handling for ~/.fleetsync/config.ini.
//!
//! Loads and saves user configuration with sensible defaults.
//! Settings structs live in [`super::settings`], constants in [`super::defaults`],
//! parsing in [`super::parser`], and serialization in [`super::writer`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use super::defaults::config_file_path;
use super::settings::ConfigFile;
use crate::feed::{AnimationConfig, ReconnectPolicy, SyncConfig, DEFAULT_EVENT_CAPACITY};

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load configuration from the default path (~/.fleetsync/config.ini).
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load() -> Result<Self, ConfigFileError> {
        let path = config_file_path();
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to the default path (~/.fleetsync/config.ini).
    pub fn save(&self) -> Result<(), ConfigFileError> {
        let path = config_file_path();
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Create the default config file if it doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn ensure_exists() -> Result<PathBuf, ConfigFileError> {
        let path = config_file_path();
        Self::ensure_exists_at(&path)?;
        Ok(path)
    }

    /// Create a default config file at `path` if none exists.
    ///
    /// Returns true if a file was written.
    pub fn ensure_exists_at(path: &Path) -> Result<bool, ConfigFileError> {
        if path.exists() {
            return Ok(false);
        }
        Self::default().save_to(path)?;
        Ok(true)
    }

    /// Runtime configuration for [`crate::feed::SyncContext`].
    pub fn sync_config(&self) -> SyncConfig {
        let duration = Duration::from_millis(self.animation.duration_ms);
        // Saturates for values set in code; the parser bounds file values.
        let frame_count = u64::from(self.animation.frame_rate)
            .saturating_mul(self.animation.duration_ms)
            .div_ceil(1000)
            .min(u64::from(u32::MAX)) as usize;

        SyncConfig {
            stream_url: self.stream.url.clone(),
            identity_property: self.stream.identity_property.clone(),
            reconnect: ReconnectPolicy {
                delay: Duration::from_millis(self.reconnect.delay_ms),
                max_attempts: self.reconnect.max_attempts,
            },
            animation: AnimationConfig {
                duration,
                frame_count,
                policy: self.animation.policy,
            },
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// HTTP timeout for the reference request.
    pub fn reference_timeout(&self) -> Duration {
        Duration::from_secs(self.reference.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::AnimationPolicy;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();

        assert_eq!(config.stream.url, "ws://localhost:4567/ws");
        assert_eq!(config.stream.identity_property, "vehicleCode");
        assert_eq!(config.reconnect.delay_ms, 3000);
        assert_eq!(config.reconnect.max_attempts, 5);
        assert_eq!(config.animation.duration_ms, 1000);
        assert_eq!(config.animation.policy, AnimationPolicy::Replace);
        assert_eq!(config.reference.url, "http://localhost:4567/locations");
        assert_eq!(config.simulation.url, "http://localhost:4567");
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let config = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_ensure_exists_at_writes_once() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.ini");

        assert!(ConfigFile::ensure_exists_at(&config_path).unwrap());
        assert!(config_path.exists());
        assert!(!ConfigFile::ensure_exists_at(&config_path).unwrap());
    }

    #[test]
    fn test_sync_config_defaults() {
        let sync = ConfigFile::default().sync_config();
        assert_eq!(sync, SyncConfig::default());
    }

    #[test]
    fn test_sync_config_frame_count_from_rate() {
        let mut config = ConfigFile::default();
        config.animation.duration_ms = 500;
        config.animation.frame_rate = 30;
        config.reconnect.delay_ms = 250;

        let sync = config.sync_config();
        assert_eq!(sync.animation.frame_count, 15);
        assert_eq!(sync.animation.duration, Duration::from_millis(500));
        assert_eq!(sync.reconnect.delay, Duration::from_millis(250));
    }

    #[test]
    fn test_sync_config_frame_count_saturates() {
        let mut config = ConfigFile::default();
        config.animation.duration_ms = 18_446_744_073_709_551;
        config.animation.frame_rate = 4_000_000_000;

        let animation = config.sync_config().animation;
        assert_eq!(animation.frame_count, u32::MAX as usize);
        assert!(animation.frame_interval() > Duration::ZERO);
    }
}
