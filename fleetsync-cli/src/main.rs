//! fleetsync CLI - Command-line interface
//!
//! Watches the live position feed and drives the simulation and reference
//! services that sit next to it.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::simulation::ActionArg;
use commands::watch::WatchArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "fleetsync")]
#[command(version = fleetsync::VERSION)]
#[command(about = "Follow a live fleet position feed", long_about = None)]
struct Cli {
    /// Also log to the terminal
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream positions and print frames as they are rendered
    Watch(WatchArgs),

    /// List reference locations
    Locations,

    /// Control the upstream simulation
    Simulation {
        /// Action to send
        #[arg(value_enum)]
        action: ActionArg,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = dispatch(cli).await {
        e.exit();
    }
}

async fn dispatch(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Runs without logging so a broken file can still be inspected.
        Commands::Config { command } => commands::config::run(command),
        Commands::Watch(args) => {
            let runner = CliRunner::new(cli.verbose)?;
            commands::watch::run(&runner, args).await
        }
        Commands::Locations => {
            let runner = CliRunner::new(cli.verbose)?;
            commands::locations::run(&runner).await
        }
        Commands::Simulation { action } => {
            let runner = CliRunner::new(cli.verbose)?;
            commands::simulation::run(&runner, action).await
        }
    }
}
