//! Simulation actions and status.

use std::fmt;
use std::str::FromStr;

use super::error::SimulationError;

/// Administrative action sent to the upstream simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationAction {
    Start,
    Pause,
    Stop,
}

impl SimulationAction {
    /// Path segment of the action endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Stop => "stop",
        }
    }

    /// Status of the simulation once the action succeeded.
    pub fn resulting_status(&self) -> SimulationStatus {
        match self {
            Self::Start => SimulationStatus::Running,
            Self::Pause => SimulationStatus::Paused,
            Self::Stop => SimulationStatus::Stopped,
        }
    }
}

impl fmt::Display for SimulationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SimulationAction {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "pause" => Ok(Self::Pause),
            "stop" => Ok(Self::Stop),
            other => Err(SimulationError::UnknownAction(other.to_string())),
        }
    }
}

/// Upstream simulation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimulationStatus {
    #[default]
    Stopped,
    Running,
    Paused,
}

impl SimulationStatus {
    /// True when the stream should be connected.
    pub fn is_streaming(&self) -> bool {
        *self == Self::Running
    }
}

impl fmt::Display for SimulationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "Stopped"),
            Self::Running => write!(f, "Running"),
            Self::Paused => write!(f, "Paused"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parse() {
        assert_eq!("start".parse::<SimulationAction>(), Ok(SimulationAction::Start));
        assert_eq!("PAUSE".parse::<SimulationAction>(), Ok(SimulationAction::Pause));
        assert_eq!(
            "reset".parse::<SimulationAction>(),
            Err(SimulationError::UnknownAction("reset".into()))
        );
    }

    #[test]
    fn test_resulting_status() {
        assert_eq!(SimulationAction::Start.resulting_status(), SimulationStatus::Running);
        assert_eq!(SimulationAction::Pause.resulting_status(), SimulationStatus::Paused);
        assert_eq!(SimulationAction::Stop.resulting_status(), SimulationStatus::Stopped);
        assert!(SimulationStatus::Running.is_streaming());
        assert!(!SimulationStatus::Paused.is_streaming());
    }
}
