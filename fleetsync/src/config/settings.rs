//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;

use crate::feed::AnimationPolicy;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Live position stream
    pub stream: StreamSettings,
    /// Reconnect policy
    pub reconnect: ReconnectSettings,
    /// Frame animation
    pub animation: AnimationSettings,
    /// Reference locations endpoint
    pub reference: ReferenceSettings,
    /// Simulation control endpoint
    pub simulation: SimulationSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Stream configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSettings {
    /// WebSocket endpoint (`ws://` or `wss://`)
    pub url: String,
    /// Feature property holding the entity identity
    pub identity_property: String,
}

/// Reconnect configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectSettings {
    /// Delay before each reconnect attempt, in milliseconds.
    pub delay_ms: u64,
    /// Reconnect attempts before giving up.
    pub max_attempts: u32,
}

/// Animation configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationSettings {
    /// Length of one animation run, in milliseconds.
    pub duration_ms: u64,
    /// Frames per second during a run.
    pub frame_rate: u32,
    /// Behaviour when a snapshot arrives mid-animation.
    pub policy: AnimationPolicy,
}

/// Reference locations configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSettings {
    /// Locations endpoint.
    pub url: String,
    /// HTTP timeout in seconds.
    pub timeout: u64,
}

/// Simulation control configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationSettings {
    /// Base URL of the simulation server.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Log file path.
    pub file: PathBuf,
}
