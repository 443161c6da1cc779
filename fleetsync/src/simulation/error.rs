//! Error types for simulation control.

use thiserror::Error;

/// Errors returned by the simulation control endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// The server rejected the action. `message` is the response body, or a
    /// generic message when the body is empty.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Unknown action name.
    #[error("Unknown simulation action '{0}' (expected start, pause or stop)")]
    UnknownAction(String),
}
