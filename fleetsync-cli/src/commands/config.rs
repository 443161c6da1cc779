//! Configuration management CLI commands.
//!
//! Provides `config path`, `config show` and `config init`.

use clap::Subcommand;
use fleetsync::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Show the effective configuration (file values over defaults)
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(),
        ConfigCommands::Show => run_show(),
        ConfigCommands::Init { force } => run_init(force),
    }
}

fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path().display());
    Ok(())
}

fn run_show() -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let sync = config.sync_config();

    println!("Configuration Settings");
    println!("======================");
    println!();
    println!("[stream]");
    println!("  url = {}", config.stream.url);
    println!("  identity_property = {}", config.stream.identity_property);
    println!();
    println!("[reconnect]");
    println!("  delay_ms = {}", config.reconnect.delay_ms);
    println!("  max_attempts = {}", config.reconnect.max_attempts);
    println!();
    println!("[animation]");
    println!("  duration_ms = {}", config.animation.duration_ms);
    println!(
        "  frame_rate = {} ({} frames per snapshot)",
        config.animation.frame_rate, sync.animation.frame_count
    );
    println!("  policy = {}", config.animation.policy);
    println!();
    println!("[reference]");
    println!("  url = {}", config.reference.url);
    println!("  timeout = {}", config.reference.timeout);
    println!();
    println!("[simulation]");
    println!("  url = {}", config.simulation.url);
    println!();
    println!("[logging]");
    println!("  file = {}", config.logging.file.display());

    Ok(())
}

fn run_init(force: bool) -> Result<(), CliError> {
    let path = config_file_path();

    if path.exists() && !force {
        println!("Configuration file already exists: {}", path.display());
        println!("Use --force to overwrite it with defaults.");
        return Ok(());
    }

    ConfigFile::default().save_to(&path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
