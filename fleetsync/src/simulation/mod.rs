//! Upstream simulation control.
//!
//! The position server runs a simulation that can be started, paused and
//! stopped over HTTP. The stream should only be connected while the
//! simulation runs; see [`crate::feed::SyncContext::apply_simulation_status`].

mod client;
mod error;
mod model;

pub use client::{HttpSimulationClient, SimulationClient, DEFAULT_SIMULATION_URL};
pub use error::SimulationError;
pub use model::{SimulationAction, SimulationStatus};
