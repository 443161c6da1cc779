//! Live feed command.
//!
//! Opens the position stream and prints what a map view would render:
//! status changes, errors, fit-to-view hints, and frame summaries (or every
//! frame as GeoJSON with `--json`). Followed entities get an overlay whose
//! interpolated position is reported with each summary. Reference locations
//! are loaded once before the stream opens.

use clap::Args;
use fleetsync::feed::{
    EntityId, OverlayHandle, SharedOverlay, Snapshot, SyncContext, SyncEvent,
};
use fleetsync::simulation::{HttpSimulationClient, SimulationAction, SimulationClient};
use tokio::sync::broadcast::error::RecvError;

use super::locations::reference_client;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Frames between two summary lines (one second at the default rate).
const FRAME_SUMMARY_INTERVAL: u64 = 60;

/// Arguments for `watch`.
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Stream URL (overrides [stream] url)
    #[arg(long)]
    pub url: Option<String>,

    /// Entity to follow; may be repeated
    #[arg(long = "follow", value_name = "ID")]
    pub follow: Vec<String>,

    /// Print every frame as a GeoJSON feature collection
    #[arg(long)]
    pub json: bool,

    /// Start the simulation before connecting
    #[arg(long)]
    pub start: bool,
}

/// An entity the user asked to follow.
struct Followed {
    id: EntityId,
    overlay: SharedOverlay,
    attached: bool,
}

/// Watch the feed until Ctrl-C or reconnect exhaustion.
pub async fn run(runner: &CliRunner, args: WatchArgs) -> Result<(), CliError> {
    runner.log_startup("watch");

    let mut sync_config = runner.config().sync_config();
    if let Some(url) = args.url {
        sync_config.stream_url = url;
    }

    let context = SyncContext::new(sync_config);
    let mut events = context.subscribe();

    // Failures arrive as a reference-data error event and are not fatal.
    let reference = reference_client(runner.config())?;
    if context.load_reference(&reference).await.is_err() {
        tracing::debug!(url = reference.url(), "Continuing without reference locations");
    }

    let mut followed: Vec<Followed> = args
        .follow
        .iter()
        .map(|id| Followed {
            id: EntityId::new(id.as_str()),
            overlay: SharedOverlay::new(),
            attached: false,
        })
        .collect();

    if args.start {
        let client = HttpSimulationClient::new(&runner.config().simulation.url)?;
        let status = client.send(SimulationAction::Start).await?;
        println!("Simulation status: {}", status);
        context.apply_simulation_status(status).await;
    } else {
        context.open().await;
    }

    let mut frames: u64 = 0;
    let outcome = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!();
                println!("Interrupted, closing stream");
                break Ok(());
            }
            event = events.recv() => match event {
                Ok(SyncEvent::Frame(frame)) => {
                    frames += 1;
                    attach_overlays(&context, &mut followed, &frame);
                    if args.json {
                        println!("{}", frame.to_geojson());
                    } else if frames % FRAME_SUMMARY_INTERVAL == 1 {
                        print_summary(frames, &frame, &followed);
                    }
                }
                Ok(SyncEvent::Status(state)) => {
                    eprintln!("Status: {}", state);
                }
                Ok(SyncEvent::Error(error)) => {
                    eprintln!("[{}] {}", error.kind(), error);
                    if error.is_fatal() {
                        break Err(CliError::StreamFailed(error.to_string()));
                    }
                }
                Ok(SyncEvent::FitToView(bounds)) => {
                    let center = bounds.center();
                    eprintln!(
                        "Fit to view: lon {:.5}..{:.5}, lat {:.5}..{:.5} (center {:.5}, {:.5})",
                        bounds.min_lon, bounds.max_lon, bounds.min_lat, bounds.max_lat,
                        center.longitude, center.latitude
                    );
                }
                Ok(SyncEvent::ReferenceLocations(locations)) => {
                    eprintln!("Reference locations: {}", locations.len());
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Watch output fell behind, frames skipped");
                }
                Err(RecvError::Closed) => break Ok(()),
            }
        }
    };

    context.shutdown().await;

    outcome
}

/// Open overlays for followed entities once they appear in a frame.
fn attach_overlays(context: &SyncContext, followed: &mut [Followed], frame: &Snapshot) {
    for entry in followed.iter_mut().filter(|f| !f.attached) {
        if let Some(position) = frame.position_of(&entry.id) {
            let overlay = entry.overlay.clone();
            context.toggle_overlay_at(&entry.id, position, move |_, _| {
                Box::new(overlay) as Box<dyn OverlayHandle>
            });
            entry.attached = true;
            tracing::info!(entity = %entry.id, "Following entity");
        }
    }
}

fn print_summary(frames: u64, frame: &Snapshot, followed: &[Followed]) {
    println!("frame {:>8}  entities {:>4}", frames, frame.len());
    for entry in followed {
        match entry.overlay.position() {
            Some(p) => println!(
                "  {:<16} {:>12.6} {:>12.6}",
                entry.id.as_str(),
                p.longitude,
                p.latitude
            ),
            None => println!("  {:<16} (not seen yet)", entry.id.as_str()),
        }
    }
}
