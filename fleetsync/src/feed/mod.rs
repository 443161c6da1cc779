//! Real-time position feed.
//!
//! Ingests a live stream of entity positions, keeps the connection alive
//! with a bounded reconnect policy, validates each snapshot, and turns
//! successive snapshots into smoothly interpolated frames.
//!
//! # Architecture
//!
//! ```text
//! Transport (WebSocket)
//!     │
//!     └── ConnectionManager ── SnapshotValidator
//!             │
//!             └── mpsc::Sender<ConnectionEvent>
//!                     │
//!                     └── SyncController ── interpolate() ── AnimationRun
//!                             │
//!                             ├── EntityOverlayRegistry (open overlays follow frames)
//!                             │
//!                             └── broadcast::Sender<SyncEvent> → consumers
//! ```
//!
//! [`SyncContext`] wires the pieces together for one consumer.

mod config;
pub mod connection;
mod context;
mod controller;
mod error;
mod events;
mod interpolator;
mod overlay;
mod snapshot;
mod validator;

pub use config::{
    AnimationConfig, AnimationPolicy, SyncConfig, DEFAULT_ANIMATION_DURATION,
    DEFAULT_EVENT_CAPACITY, DEFAULT_FRAME_COUNT,
};
pub use connection::{ConnectionEvent, ConnectionManager, ConnectionState, ReconnectPolicy};
pub use context::SyncContext;
pub use controller::{AnimationRun, FramePublisher, SyncController};
pub use error::{ErrorKind, SyncError, TransportError, ValidationError};
pub use events::SyncEvent;
pub use interpolator::{interpolate, Frames};
pub use overlay::{
    EntityOverlayRegistry, OverlayHandle, SharedOverlay, SharedOverlayRegistry, ToggleOutcome,
};
pub use snapshot::{BoundingBox, EntityId, EntityPosition, Position, Snapshot};
pub use validator::{
    feature_position, validate_collection, SnapshotValidator, DEFAULT_IDENTITY_PROPERTY,
};
