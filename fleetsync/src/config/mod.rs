//! User configuration (~/.fleetsync/config.ini).
//!
//! # Example
//!
//! ```ignore
//! use fleetsync::config::ConfigFile;
//! use fleetsync::feed::SyncContext;
//!
//! let config = ConfigFile::load()?;
//! let context = SyncContext::new(config.sync_config());
//! ```

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::{
    config_directory, config_file_path, default_log_file, CONFIG_FILE_NAME, DEFAULT_FRAME_RATE,
    MAX_ANIMATION_DURATION_MS, MAX_FRAME_RATE,
};
pub use file::ConfigFileError;
pub use settings::{
    AnimationSettings, ConfigFile, LoggingSettings, ReconnectSettings, ReferenceSettings,
    SimulationSettings, StreamSettings,
};
