//! Simulation control command.

use clap::ValueEnum;
use fleetsync::simulation::{HttpSimulationClient, SimulationAction, SimulationClient};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Simulation action selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ActionArg {
    /// Start (or resume) the simulation
    Start,
    /// Pause the simulation
    Pause,
    /// Stop the simulation
    Stop,
}

impl From<ActionArg> for SimulationAction {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Start => SimulationAction::Start,
            ActionArg::Pause => SimulationAction::Pause,
            ActionArg::Stop => SimulationAction::Stop,
        }
    }
}

/// Send one action and print the resulting status.
pub async fn run(runner: &CliRunner, action: ActionArg) -> Result<(), CliError> {
    runner.log_startup("simulation");

    let client = HttpSimulationClient::new(&runner.config().simulation.url)?;
    let status = client.send(action.into()).await?;

    println!("Simulation status: {}", status);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_mapping() {
        assert_eq!(SimulationAction::from(ActionArg::Start), SimulationAction::Start);
        assert_eq!(SimulationAction::from(ActionArg::Pause), SimulationAction::Pause);
        assert_eq!(SimulationAction::from(ActionArg::Stop), SimulationAction::Stop);
    }
}
