//! Consumer-facing events.

use std::sync::Arc;

use super::connection::ConnectionState;
use super::error::SyncError;
use super::snapshot::{BoundingBox, Snapshot};
use crate::reference::ReferenceCollection;

/// Event broadcast to every subscriber of a [`super::SyncContext`].
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// A frame to render.
    Frame(Snapshot),

    /// The connection changed state.
    Status(ConnectionState),

    /// Something went wrong; see [`SyncError::kind`].
    Error(SyncError),

    /// Framing hint: the region covering the first snapshot after a (re)connect.
    FitToView(BoundingBox),

    /// Reference locations finished loading.
    ReferenceLocations(Arc<ReferenceCollection>),
}

impl SyncEvent {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Frame(_) => "frame",
            Self::Status(_) => "status",
            Self::Error(_) => "error",
            Self::FitToView(_) => "fit-to-view",
            Self::ReferenceLocations(_) => "reference-locations",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label() {
        assert_eq!(SyncEvent::Status(ConnectionState::Open).label(), "status");
        assert_eq!(
            SyncEvent::Error(SyncError::ReferenceData("timeout".into())).label(),
            "error"
        );
        assert_eq!(
            SyncEvent::ReferenceLocations(Arc::new(ReferenceCollection::default())).label(),
            "reference-locations"
        );
    }
}
