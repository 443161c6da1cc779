//! Error types for the live position feed.

use std::fmt;

use thiserror::Error;

/// A received payload that does not describe a valid snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The message is not valid JSON.
    #[error("Message is not valid JSON: {0}")]
    InvalidJson(String),

    /// The payload is not an object tagged as a feature collection.
    #[error("Payload is not a FeatureCollection")]
    NotACollection,

    /// The collection has no `features` array.
    #[error("FeatureCollection has no features array")]
    MissingFeatures,

    /// A feature has no geometry coordinates.
    #[error("Feature {index} has no geometry")]
    MissingGeometry { index: usize },

    /// A feature's coordinates are not two numbers.
    #[error("Feature {index} has non-numeric coordinates")]
    NonNumericCoordinate { index: usize },

    /// A feature lacks the identity property.
    #[error("Feature {index} is missing identity property '{property}'")]
    MissingIdentity { index: usize, property: String },

    /// Two features share an identity.
    #[error("Feature {index} repeats identity '{id}'")]
    DuplicateIdentity { index: usize, id: String },
}

/// Failure reported by a stream transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The connection could not be established.
    #[error("Failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    /// The established connection failed.
    #[error("Stream error: {0}")]
    Stream(String),
}

/// Error category surfaced to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A malformed snapshot was received and ignored.
    Validation,
    /// The transport failed or closed; a reconnect may follow.
    Transport,
    /// All reconnect attempts were used up; manual `open()` required.
    ReconnectExhausted,
    /// The one-shot reference location fetch failed.
    ReferenceData,
}

impl ErrorKind {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Transport => "transport",
            Self::ReconnectExhausted => "reconnect-exhausted",
            Self::ReferenceData => "reference-data",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error delivered on the consumer error channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Invalid snapshot; the connection stays open.
    #[error("Invalid snapshot: {0}")]
    Validation(#[from] ValidationError),

    /// The transport reported an error.
    #[error("{0}")]
    TransportError(TransportError),

    /// The transport was closed by the remote side.
    #[error("Stream closed{}", closed_suffix(.0))]
    TransportClosed(Option<String>),

    /// The reconnect budget is spent.
    #[error("Could not reconnect after {attempts} attempts")]
    ReconnectExhausted { attempts: u32 },

    /// Failed to load the reference locations.
    #[error("Failed to load reference locations: {0}")]
    ReferenceData(String),
}

impl SyncError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::TransportError(_) | Self::TransportClosed(_) => ErrorKind::Transport,
            Self::ReconnectExhausted { .. } => ErrorKind::ReconnectExhausted,
            Self::ReferenceData(_) => ErrorKind::ReferenceData,
        }
    }

    /// True if the subsystem stops until the consumer reopens it.
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::ReconnectExhausted
    }
}

fn closed_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(r) if !r.is_empty() => format!(": {r}"),
        _ => String::new(),
    }
}

impl From<TransportError> for SyncError {
    fn from(e: TransportError) -> Self {
        SyncError::TransportError(e)
    }
}
