//! Sync context - owns one connection, one controller and the overlays.
//!
//! A context replaces the module-wide singletons of a typical map view: the
//! socket, the retained snapshot and the overlay map all live here, and
//! consumers interact through [`SyncContext`] methods and a broadcast
//! subscription.
//!
//! # Usage
//!
//! ```ignore
//! let context = SyncContext::new(SyncConfig::default());
//! let mut events = context.subscribe();
//! context.open().await;
//!
//! while let Ok(event) = events.recv().await {
//!     if let SyncEvent::Frame(frame) = event {
//!         render(&frame);
//!     }
//! }
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use super::config::SyncConfig;
use super::connection::{
    ConnectionEvent, ConnectionManager, ConnectionState, Transport, WebSocketTransport,
};
use super::controller::{FramePublisher, SyncController};
use super::error::SyncError;
use super::events::SyncEvent;
use super::overlay::{EntityOverlayRegistry, OverlayHandle, SharedOverlayRegistry, ToggleOutcome};
use super::snapshot::{EntityId, Position, Snapshot};
use super::validator::SnapshotValidator;
use crate::reference::{ReferenceClient, ReferenceCollection, ReferenceDataError};
use crate::simulation::SimulationStatus;

/// Capacity of the manager-to-controller channel.
const CONNECTION_CHANNEL_CAPACITY: usize = 256;

/// Real-time position sync for one consumer.
pub struct SyncContext {
    manager: ConnectionManager,

    /// Same channel the manager writes to, for events that must be ordered
    /// after everything the manager already sent.
    connection_tx: Option<mpsc::Sender<ConnectionEvent>>,

    publisher: Arc<FramePublisher>,
    controller: Option<JoinHandle<()>>,
}

impl SyncContext {
    /// Create a context streaming from `config.stream_url` over WebSocket.
    ///
    /// Must be called within a tokio runtime. The connection stays `Idle`
    /// until [`open`](Self::open).
    pub fn new(config: SyncConfig) -> Self {
        let transport = WebSocketTransport::new(config.stream_url.clone());
        Self::with_transport(config, transport)
    }

    /// Create a context with a custom transport.
    pub fn with_transport<T: Transport>(config: SyncConfig, transport: T) -> Self {
        let (events_tx, _) = broadcast::channel(config.event_capacity.max(1));
        let overlays: SharedOverlayRegistry = Arc::new(Mutex::new(EntityOverlayRegistry::new()));
        let publisher = Arc::new(FramePublisher::new(events_tx, overlays));

        let (connection_tx, connection_rx) = mpsc::channel(CONNECTION_CHANNEL_CAPACITY);
        let manager = ConnectionManager::start(
            transport,
            SnapshotValidator::new(config.identity_property.clone()),
            config.reconnect,
            connection_tx.clone(),
        );

        let controller = SyncController::new(config.animation, Arc::clone(&publisher));
        let controller = tokio::spawn(controller.run(connection_rx));

        tracing::info!(
            endpoint = manager.endpoint(),
            identity = %config.identity_property,
            "Sync context created"
        );

        Self {
            manager,
            connection_tx: Some(connection_tx),
            publisher,
            controller: Some(controller),
        }
    }

    /// Subscribe to frames, status changes, errors and hints.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.publisher.subscribe()
    }

    /// Open the stream. Returns false if already connecting or open.
    pub async fn open(&self) -> bool {
        self.manager.open().await
    }

    /// Close the stream and cancel any pending reconnect.
    ///
    /// Subscribers receive `Status(Idle)` after every event of the closed
    /// connection.
    pub async fn close(&self) {
        self.manager.close().await;
        if let Some(tx) = &self.connection_tx {
            let _ = tx.send(ConnectionEvent::Status(ConnectionState::Idle)).await;
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.manager.state()
    }

    /// Reconnect attempts since the last successful open.
    pub fn reconnect_attempts(&self) -> u32 {
        self.manager.attempts()
    }

    /// The frame most recently published.
    pub fn last_frame(&self) -> Option<Snapshot> {
        self.publisher.last_published()
    }

    /// Overlay registry moved by every frame.
    pub fn overlays(&self) -> SharedOverlayRegistry {
        Arc::clone(self.publisher.overlays())
    }

    /// Toggle the overlay of an entity at its last published position.
    ///
    /// Returns `None` if the entity is not in the last frame.
    pub fn toggle_overlay<F>(&self, id: &EntityId, open_handle: F) -> Option<ToggleOutcome>
    where
        F: FnOnce(&EntityId, Position) -> Box<dyn OverlayHandle>,
    {
        let position = self.last_frame()?.position_of(id)?;
        Some(self.toggle_overlay_at(id, position, open_handle))
    }

    /// Toggle the overlay of an entity at an explicit position.
    pub fn toggle_overlay_at<F>(&self, id: &EntityId, position: Position, open_handle: F) -> ToggleOutcome
    where
        F: FnOnce(&EntityId, Position) -> Box<dyn OverlayHandle>,
    {
        self.publisher.overlays().lock().toggle(id, position, open_handle)
    }

    /// Close the overlay of an entity. Returns true if one was open.
    pub fn remove_overlay(&self, id: &EntityId) -> bool {
        self.publisher.overlays().lock().remove_if_open(id)
    }

    /// True if the entity has an open overlay.
    pub fn has_overlay(&self, id: &EntityId) -> bool {
        self.publisher.overlays().lock().has(id)
    }

    /// Follow the upstream simulation status.
    ///
    /// `Running` replaces any existing connection with a fresh one; `Paused`
    /// and `Stopped` close it.
    pub async fn apply_simulation_status(&self, status: SimulationStatus) {
        tracing::info!(%status, "Applying simulation status");
        if self.state() != ConnectionState::Idle {
            self.close().await;
        }
        if status.is_streaming() {
            self.open().await;
        }
    }

    /// Fetch reference locations and publish them.
    ///
    /// Failures are published as `reference-data` errors and never affect
    /// the connection.
    pub async fn load_reference<C: ReferenceClient>(
        &self,
        client: &C,
    ) -> Result<Arc<ReferenceCollection>, ReferenceDataError> {
        match client.fetch_locations().await {
            Ok(collection) => {
                let collection = Arc::new(collection);
                tracing::info!(locations = collection.len(), "Reference locations loaded");
                self.publisher
                    .publish(SyncEvent::ReferenceLocations(Arc::clone(&collection)));
                Ok(collection)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load reference locations");
                self.publisher
                    .publish(SyncEvent::Error(SyncError::ReferenceData(e.to_string())));
                Err(e)
            }
        }
    }

    /// Close the connection, close every overlay and stop all tasks.
    pub async fn shutdown(mut self) {
        self.close().await;
        self.publisher.overlays().lock().close_all();

        // The controller stops once both senders are gone.
        self.manager.shutdown().await;
        self.connection_tx = None;

        if let Some(handle) = self.controller.take() {
            if let Err(e) = handle.await {
                tracing::error!("Sync controller task panicked: {}", e);
            }
        }
        tracing::info!("Sync context shut down");
    }
}

impl Drop for SyncContext {
    fn drop(&mut self) {
        if let Some(handle) = self.controller.take() {
            handle.abort();
        }
    }
}
