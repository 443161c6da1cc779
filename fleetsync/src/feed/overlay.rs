//! Per-entity overlay handles (info popups and similar UI objects).
//!
//! The registry holds at most one [`OverlayHandle`] per entity. Consumers
//! open and close handles in response to user interaction; the sync
//! controller moves open handles along with every published frame.
//!
//! Handles are never expired automatically: an overlay stays open even when
//! its entity is missing from the feed, until it is toggled closed.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::snapshot::{EntityId, Position, Snapshot};

/// A UI object anchored at an entity's position.
pub trait OverlayHandle: Send {
    /// Move the overlay to a new position.
    fn set_position(&mut self, position: Position);

    /// Called once when the overlay is removed from the registry.
    fn close(&mut self) {}
}

/// Result of [`EntityOverlayRegistry::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// A new handle was created.
    Opened,
    /// The existing handle was closed.
    Closed,
}

/// Registry of open overlays keyed by entity identity.
#[derive(Default)]
pub struct EntityOverlayRegistry {
    handles: HashMap<EntityId, Box<dyn OverlayHandle>>,
}

impl std::fmt::Debug for EntityOverlayRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityOverlayRegistry")
            .field("open", &self.handles.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl EntityOverlayRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an overlay for `id`, or close it if one is already open.
    ///
    /// `open_handle` is only invoked when a new handle is needed; it receives
    /// the entity's current position.
    pub fn toggle<F>(&mut self, id: &EntityId, position: Position, open_handle: F) -> ToggleOutcome
    where
        F: FnOnce(&EntityId, Position) -> Box<dyn OverlayHandle>,
    {
        if self.remove_if_open(id) {
            return ToggleOutcome::Closed;
        }

        let mut handle = open_handle(id, position);
        handle.set_position(position);
        self.handles.insert(id.clone(), handle);
        tracing::debug!(entity = %id, "Overlay opened");
        ToggleOutcome::Opened
    }

    /// Close and remove the overlay for `id`. Returns true if one was open.
    pub fn remove_if_open(&mut self, id: &EntityId) -> bool {
        match self.handles.remove(id) {
            Some(mut handle) => {
                handle.close();
                tracing::debug!(entity = %id, "Overlay closed");
                true
            }
            None => false,
        }
    }

    /// Move the overlay for `id`. No-op if none is open.
    pub fn update_position(&mut self, id: &EntityId, position: Position) {
        if let Some(handle) = self.handles.get_mut(id) {
            handle.set_position(position);
        }
    }

    /// True if an overlay is open for `id`.
    pub fn has(&self, id: &EntityId) -> bool {
        self.handles.contains_key(id)
    }

    /// Move every open overlay whose entity appears in `frame`.
    pub fn refresh(&mut self, frame: &Snapshot) {
        if self.handles.is_empty() {
            return;
        }
        for entity in frame {
            self.update_position(&entity.id, entity.position);
        }
    }

    /// Identities with an open overlay.
    pub fn open_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.handles.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of open overlays.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// True if no overlay is open.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Close every overlay.
    pub fn close_all(&mut self) {
        for (_, mut handle) in self.handles.drain() {
            handle.close();
        }
    }
}

/// Overlay registry shared between the controller and consumers.
pub type SharedOverlayRegistry = Arc<Mutex<EntityOverlayRegistry>>;

/// Clonable overlay that records where it was last placed.
///
/// Keep one clone and hand the other to the registry to observe the
/// interpolated position of a followed entity.
#[derive(Debug, Clone, Default)]
pub struct SharedOverlay {
    inner: Arc<Mutex<SharedOverlayState>>,
}

#[derive(Debug, Default)]
struct SharedOverlayState {
    position: Option<Position>,
    updates: u64,
    closed: bool,
}

impl SharedOverlay {
    /// Create an overlay with no position yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last position applied to the overlay.
    pub fn position(&self) -> Option<Position> {
        self.inner.lock().position
    }

    /// Number of position updates received.
    pub fn updates(&self) -> u64 {
        self.inner.lock().updates
    }

    /// True once the registry has closed the overlay.
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }
}

impl OverlayHandle for SharedOverlay {
    fn set_position(&mut self, position: Position) {
        let mut state = self.inner.lock();
        state.position = Some(position);
        state.updates += 1;
    }

    fn close(&mut self) {
        self.inner.lock().closed = true;
    }
}
