//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use fleetsync::config::ConfigFileError;
use fleetsync::reference::ReferenceDataError;
use fleetsync::simulation::SimulationError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to load reference locations
    Reference(ReferenceDataError),
    /// Simulation control request failed
    Simulation(SimulationError),
    /// The stream gave up reconnecting
    StreamFailed(String),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Reference(ReferenceDataError::HttpError(_))
            | CliError::Simulation(SimulationError::HttpError(_))
            | CliError::StreamFailed(_) => {
                eprintln!();
                eprintln!("Common issues:");
                eprintln!("  1. The position server is not running (default: localhost:4567)");
                eprintln!("  2. The URLs in ~/.fleetsync/config.ini point to the wrong host");
                eprintln!("  3. The simulation is stopped: try 'fleetsync simulation start'");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Reference(e) => write!(f, "Failed to load reference locations: {}", e),
            CliError::Simulation(e) => write!(f, "Simulation control failed: {}", e),
            CliError::StreamFailed(msg) => write!(f, "Position stream failed: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Reference(e) => Some(e),
            CliError::Simulation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<ReferenceDataError> for CliError {
    fn from(e: ReferenceDataError) -> Self {
        CliError::Reference(e)
    }
}

impl From<SimulationError> for CliError {
    fn from(e: SimulationError) -> Self {
        CliError::Simulation(e)
    }
}
