//! Reference locations command.

use fleetsync::config::ConfigFile;
use fleetsync::reference::{HttpReferenceClient, ReferenceClient};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Reference client for the `[reference]` section.
pub fn reference_client(config: &ConfigFile) -> Result<HttpReferenceClient, CliError> {
    Ok(HttpReferenceClient::new(
        &config.reference.url,
        config.reference_timeout(),
    )?)
}

/// Fetch and print the reference locations.
pub async fn run(runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("locations");
    let config = runner.config();

    let client = reference_client(config)?;
    let locations = client.fetch_locations().await?;

    println!("{} reference locations from {}", locations.len(), client.url());
    println!();
    println!("{:<12} {:<28} {:>12} {:>12}", "TYPE", "NAME", "LONGITUDE", "LATITUDE");

    for location in &locations {
        let kind = location
            .kind
            .as_ref()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "-".to_string());
        let name = location.name.as_deref().unwrap_or("-");
        println!(
            "{:<12} {:<28} {:>12.6} {:>12.6}",
            kind, name, location.position.longitude, location.position.latitude
        );
    }

    Ok(())
}
