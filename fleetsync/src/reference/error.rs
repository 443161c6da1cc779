//! Error types for the reference-location client.

use thiserror::Error;

use crate::feed::ValidationError;

/// Errors that can occur while loading reference locations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceDataError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// The server answered with a non-success status.
    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The body is not JSON.
    #[error("Failed to parse response: {0}")]
    JsonError(String),

    /// The body is JSON but not a valid location collection.
    #[error("Invalid location collection: {0}")]
    Invalid(#[from] ValidationError),
}
