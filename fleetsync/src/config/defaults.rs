//! Default values and constants for all configuration settings.
//!
//! Contains the `DEFAULT_*` constants that have no home in the library
//! modules, and the `ConfigFile::default()` implementation.

use std::path::PathBuf;

use super::settings::*;
use crate::feed::{
    AnimationPolicy, DEFAULT_ANIMATION_DURATION, DEFAULT_FRAME_COUNT, DEFAULT_IDENTITY_PROPERTY,
};
use crate::feed::connection::{
    DEFAULT_MAX_RECONNECT_ATTEMPTS, DEFAULT_RECONNECT_DELAY, DEFAULT_STREAM_URL,
};
use crate::reference::{DEFAULT_REFERENCE_TIMEOUT, DEFAULT_REFERENCE_URL};
use crate::simulation::DEFAULT_SIMULATION_URL;

/// Name of the config directory under the home directory.
pub const CONFIG_DIRECTORY_NAME: &str = ".fleetsync";

/// Config file name.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Default log file name (inside the config directory).
pub const DEFAULT_LOG_FILE_NAME: &str = "fleetsync.log";

/// Default animation frame rate (frames per second).
pub const DEFAULT_FRAME_RATE: u32 = 60;

/// Longest accepted animation run.
pub const MAX_ANIMATION_DURATION_MS: u64 = 60_000;

/// Highest accepted animation frame rate.
pub const MAX_FRAME_RATE: u32 = 1_000;

/// Get the path to the config directory (~/.fleetsync).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIRECTORY_NAME)
}

/// Get the path to the config file (~/.fleetsync/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

/// Default log file (~/.fleetsync/fleetsync.log).
pub fn default_log_file() -> PathBuf {
    config_directory().join(DEFAULT_LOG_FILE_NAME)
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            stream: StreamSettings {
                url: DEFAULT_STREAM_URL.to_string(),
                identity_property: DEFAULT_IDENTITY_PROPERTY.to_string(),
            },
            reconnect: ReconnectSettings {
                delay_ms: DEFAULT_RECONNECT_DELAY.as_millis() as u64,
                max_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            },
            animation: AnimationSettings {
                duration_ms: DEFAULT_ANIMATION_DURATION.as_millis() as u64,
                frame_rate: DEFAULT_FRAME_RATE,
                policy: AnimationPolicy::default(),
            },
            reference: ReferenceSettings {
                url: DEFAULT_REFERENCE_URL.to_string(),
                timeout: DEFAULT_REFERENCE_TIMEOUT.as_secs(),
            },
            simulation: SimulationSettings {
                url: DEFAULT_SIMULATION_URL.to_string(),
            },
            logging: LoggingSettings {
                file: default_log_file(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_frame_rate_matches_frame_count() {
        // One second at the default rate yields the default frame count.
        assert_eq!(DEFAULT_ANIMATION_DURATION.as_millis(), 1000);
        assert_eq!(DEFAULT_FRAME_RATE as usize, DEFAULT_FRAME_COUNT);
    }

    #[test]
    fn test_paths() {
        assert!(config_file_path().ends_with(".fleetsync/config.ini"));
        assert!(default_log_file().ends_with(".fleetsync/fleetsync.log"));
    }
}
