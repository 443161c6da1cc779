//! Sync controller - turns validated snapshots into paced frames.
//!
//! The controller consumes [`ConnectionEvent`]s one at a time, in arrival
//! order, and publishes [`SyncEvent`]s to subscribers:
//!
//! - The first snapshot is published as-is, with a fit-to-view hint.
//! - Empty snapshots are skipped and never replace the retained one.
//! - Every later snapshot starts an [`AnimationRun`] that publishes
//!   `frame_count + 1` interpolated frames over the configured duration.
//! - The retained snapshot is replaced as soon as a snapshot arrives, not
//!   when its animation finishes.
//!
//! Each published frame also moves the open overlays.
//!
//! # Overlapping Runs
//!
//! With [`AnimationPolicy::Replace`] only the newest run may publish. Runs
//! carry a generation number which the publisher checks under its lock, so a
//! replaced run cannot sneak a frame in after its successor started.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::config::{AnimationConfig, AnimationPolicy};
use super::connection::{ConnectionEvent, ConnectionState};
use super::events::SyncEvent;
use super::interpolator::{interpolate, Frames};
use super::overlay::SharedOverlayRegistry;
use super::snapshot::Snapshot;

/// Publishes events and frames to subscribers and overlays.
pub struct FramePublisher {
    events: broadcast::Sender<SyncEvent>,
    overlays: SharedOverlayRegistry,
    state: Mutex<PublisherState>,
}

#[derive(Default)]
struct PublisherState {
    last_published: Option<Snapshot>,
    generation: u64,
}

impl FramePublisher {
    /// Create a publisher.
    pub fn new(events: broadcast::Sender<SyncEvent>, overlays: SharedOverlayRegistry) -> Self {
        Self {
            events,
            overlays,
            state: Mutex::new(PublisherState::default()),
        }
    }

    /// Broadcast a non-frame event. Dropped silently without subscribers.
    pub fn publish(&self, event: SyncEvent) {
        if let Err(unsent) = self.events.send(event) {
            tracing::trace!(event = unsent.0.label(), "No subscribers, event dropped");
        }
    }

    /// Publish a frame unconditionally.
    pub fn publish_frame(&self, frame: Snapshot) {
        self.publish_run_frame(None, frame);
    }

    /// Publish a frame from a run. Returns false if the run was superseded.
    ///
    /// `generation` is `None` for runs that are never superseded.
    fn publish_run_frame(&self, generation: Option<u64>, frame: Snapshot) -> bool {
        let mut state = self.state.lock();
        if let Some(g) = generation {
            if g != state.generation {
                return false;
            }
        }

        self.overlays.lock().refresh(&frame);
        state.last_published = Some(frame.clone());
        let _ = self.events.send(SyncEvent::Frame(frame));
        true
    }

    /// Invalidate all runs and return the generation for the next one.
    fn next_generation(&self) -> u64 {
        let mut state = self.state.lock();
        state.generation += 1;
        state.generation
    }

    /// The frame most recently published.
    pub fn last_published(&self) -> Option<Snapshot> {
        self.state.lock().last_published.clone()
    }

    /// Create a new subscriber.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Registry refreshed by every frame.
    pub fn overlays(&self) -> &SharedOverlayRegistry {
        &self.overlays
    }
}

/// A task publishing one frame sequence at a fixed pace.
pub struct AnimationRun {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl AnimationRun {
    /// Spawn a run publishing `frames`, one every `interval`.
    ///
    /// The first frame is published immediately. A zero interval publishes
    /// everything at once.
    fn spawn(
        frames: Frames,
        interval: Duration,
        publisher: Arc<FramePublisher>,
        generation: Option<u64>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let total = frames.len();

            if interval.is_zero() {
                for frame in frames {
                    if token.is_cancelled() || !publisher.publish_run_frame(generation, frame) {
                        return;
                    }
                }
                return;
            }

            let mut ticker = tokio::time::interval(interval);
            for (index, frame) in frames.enumerate() {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        tracing::trace!(index, total, "Animation run cancelled");
                        return;
                    }
                    _ = ticker.tick() => {}
                }

                if !publisher.publish_run_frame(generation, frame) {
                    tracing::trace!(index, total, "Animation run superseded");
                    return;
                }
            }
            tracing::trace!(total, "Animation run complete");
        });

        Self { cancel, handle }
    }

    /// Stop publishing.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// True once the run has published its last frame or stopped.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Snapshot-to-frame controller.
pub struct SyncController {
    config: AnimationConfig,
    publisher: Arc<FramePublisher>,

    /// Most recent snapshot (`S_prev`).
    previous: Option<Snapshot>,

    /// True until the first non-empty snapshot after a (re)connect.
    fit_pending: bool,

    runs: Vec<AnimationRun>,
}

impl SyncController {
    /// Create a controller with no retained snapshot.
    pub fn new(config: AnimationConfig, publisher: Arc<FramePublisher>) -> Self {
        Self {
            config,
            publisher,
            previous: None,
            fit_pending: true,
            runs: Vec::new(),
        }
    }

    /// The retained snapshot.
    pub fn previous(&self) -> Option<&Snapshot> {
        self.previous.as_ref()
    }

    /// Handle one connection event.
    pub fn handle_event(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Status(state) => {
                if state == ConnectionState::Open && self.previous.is_some() {
                    self.fit_pending = true;
                }
                self.publisher.publish(SyncEvent::Status(state));
            }
            ConnectionEvent::Snapshot(snapshot) => self.on_snapshot(snapshot),
            ConnectionEvent::Error(error) => self.publisher.publish(SyncEvent::Error(error)),
        }
    }

    /// Consume connection events until every sender is gone.
    pub async fn run(mut self, mut events: mpsc::Receiver<ConnectionEvent>) {
        tracing::debug!(
            frame_count = self.config.frame_count,
            duration_ms = self.config.duration.as_millis() as u64,
            policy = %self.config.policy,
            "Sync controller started"
        );

        while let Some(event) = events.recv().await {
            self.handle_event(event);
        }

        self.cancel_runs();
        tracing::debug!("Sync controller stopped");
    }

    fn on_snapshot(&mut self, snapshot: Snapshot) {
        // Nothing to draw; keep the retained snapshot to animate from.
        if snapshot.is_empty() {
            tracing::debug!("Empty snapshot skipped");
            return;
        }

        match self.previous.take() {
            None => {
                tracing::debug!(entities = snapshot.len(), "First snapshot, publishing directly");
                self.publisher.publish_frame(snapshot.clone());
            }
            Some(previous) => self.animate(previous, &snapshot),
        }

        if self.fit_pending {
            if let Some(bounds) = snapshot.bounds() {
                tracing::debug!(?bounds, "Fit to view");
                self.publisher.publish(SyncEvent::FitToView(bounds));
                self.fit_pending = false;
            }
        }

        self.previous = Some(snapshot);
    }

    fn animate(&mut self, previous: Snapshot, next: &Snapshot) {
        let interval = self.config.frame_interval();

        let run = match self.config.policy {
            AnimationPolicy::Replace => {
                self.cancel_runs();
                let generation = self.publisher.next_generation();
                let source = self.publisher.last_published().unwrap_or(previous);
                let frames = interpolate(Some(&source), next, self.config.frame_count);
                AnimationRun::spawn(frames, interval, Arc::clone(&self.publisher), Some(generation))
            }
            AnimationPolicy::Overlap => {
                self.runs.retain(|run| !run.is_finished());
                let frames = interpolate(Some(&previous), next, self.config.frame_count);
                AnimationRun::spawn(frames, interval, Arc::clone(&self.publisher), None)
            }
        };

        tracing::trace!(entities = next.len(), active_runs = self.runs.len() + 1, "Animation started");
        self.runs.push(run);
    }

    fn cancel_runs(&mut self) {
        for run in self.runs.drain(..) {
            run.cancel();
        }
    }
}

impl Drop for SyncController {
    fn drop(&mut self) {
        self.cancel_runs();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::error::{SyncError, TransportError};
    use crate::feed::overlay::{EntityOverlayRegistry, OverlayHandle, SharedOverlay};
    use crate::feed::snapshot::{EntityId, EntityPosition, Position};

    fn snapshot(entities: &[(&str, f64, f64)]) -> Snapshot {
        Snapshot::new(
            entities
                .iter()
                .map(|(id, lon, lat)| EntityPosition::new(*id, Position::new(*lon, *lat)))
                .collect(),
        )
    }

    fn controller(policy: AnimationPolicy) -> (SyncController, broadcast::Receiver<SyncEvent>, Arc<FramePublisher>) {
        let (tx, rx) = broadcast::channel(1024);
        let overlays = Arc::new(Mutex::new(EntityOverlayRegistry::new()));
        let publisher = Arc::new(FramePublisher::new(tx, overlays));
        let config = AnimationConfig {
            policy,
            ..Default::default()
        };
        (SyncController::new(config, Arc::clone(&publisher)), rx, publisher)
    }

    fn drain_frames(rx: &mut broadcast::Receiver<SyncEvent>) -> Vec<Snapshot> {
        let mut frames = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let SyncEvent::Frame(frame) = event {
                frames.push(frame);
            }
        }
        frames
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1500)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_snapshot_published_with_fit() {
        let (mut controller, mut rx, _) = controller(AnimationPolicy::Replace);
        let s0 = snapshot(&[("V1", -76.0, -12.0), ("V2", -77.0, -11.0)]);

        controller.handle_event(ConnectionEvent::Snapshot(s0.clone()));

        assert_eq!(rx.try_recv().unwrap(), SyncEvent::Frame(s0.clone()));
        match rx.try_recv().unwrap() {
            SyncEvent::FitToView(bounds) => {
                assert_eq!(bounds.min_lon, -77.0);
                assert_eq!(bounds.max_lat, -11.0);
            }
            other => panic!("expected fit hint, got {:?}", other),
        }

        settle().await;
        assert!(rx.try_recv().is_err(), "no interpolation for the first snapshot");
        assert_eq!(controller.previous(), Some(&s0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_snapshot_animates_sixty_one_frames() {
        let (mut controller, mut rx, _) = controller(AnimationPolicy::Replace);
        let s0 = snapshot(&[("V1", -76.0, -12.0)]);
        let s1 = snapshot(&[("V1", -76.1, -12.1)]);

        controller.handle_event(ConnectionEvent::Snapshot(s0.clone()));
        drain_frames(&mut rx);

        let start = tokio::time::Instant::now();
        controller.handle_event(ConnectionEvent::Snapshot(s1.clone()));
        assert_eq!(controller.previous(), Some(&s1), "retained snapshot replaced at once");

        settle().await;
        let frames = drain_frames(&mut rx);
        assert_eq!(frames.len(), 61);
        assert_eq!(frames[0], s0);
        assert_eq!(frames[60], s1);

        let mid = frames[30].position_of(&EntityId::from("V1")).unwrap();
        assert!((mid.longitude - -76.05).abs() < 1e-9);
        assert!((mid.latitude - -12.05).abs() < 1e-9);
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_frames_paced_over_duration() {
        let (mut controller, mut rx, _) = controller(AnimationPolicy::Replace);
        controller.handle_event(ConnectionEvent::Snapshot(snapshot(&[("V1", 0.0, 0.0)])));
        drain_frames(&mut rx);

        controller.handle_event(ConnectionEvent::Snapshot(snapshot(&[("V1", 1.0, 1.0)])));
        tokio::time::sleep(Duration::from_millis(500)).await;
        let first_half = drain_frames(&mut rx).len();
        assert!((29..=32).contains(&first_half), "published {}", first_half);

        settle().await;
        assert_eq!(first_half + drain_frames(&mut rx).len(), 61);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replace_restarts_from_last_published_frame() {
        let (mut controller, mut rx, publisher) = controller(AnimationPolicy::Replace);
        let s2 = snapshot(&[("V1", 3.0, 3.0)]);

        controller.handle_event(ConnectionEvent::Snapshot(snapshot(&[("V1", 0.0, 0.0)])));
        controller.handle_event(ConnectionEvent::Snapshot(snapshot(&[("V1", 1.0, 1.0)])));
        tokio::time::sleep(Duration::from_millis(500)).await;
        drain_frames(&mut rx);
        let last_before = publisher.last_published().unwrap();

        controller.handle_event(ConnectionEvent::Snapshot(s2.clone()));
        settle().await;

        let frames = drain_frames(&mut rx);
        assert_eq!(frames.len(), 61, "old run stopped publishing");
        assert_eq!(frames[0], last_before);
        assert_eq!(frames[60], s2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlap_runs_interleave() {
        let (mut controller, mut rx, _) = controller(AnimationPolicy::Overlap);
        let s2 = snapshot(&[("V1", 3.0, 3.0)]);

        controller.handle_event(ConnectionEvent::Snapshot(snapshot(&[("V1", 0.0, 0.0)])));
        drain_frames(&mut rx);
        controller.handle_event(ConnectionEvent::Snapshot(snapshot(&[("V1", 1.0, 1.0)])));
        controller.handle_event(ConnectionEvent::Snapshot(s2.clone()));
        assert_eq!(controller.previous(), Some(&s2));

        settle().await;
        let frames = drain_frames(&mut rx);
        assert_eq!(frames.len(), 122);
        assert!(frames.contains(&s2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_frames_move_open_overlays() {
        let (mut controller, mut rx, publisher) = controller(AnimationPolicy::Replace);
        let followed = SharedOverlay::new();
        let handle = followed.clone();
        publisher.overlays().lock().toggle(
            &EntityId::from("V1"),
            Position::new(-76.0, -12.0),
            move |_, _| Box::new(handle) as Box<dyn OverlayHandle>,
        );

        controller.handle_event(ConnectionEvent::Snapshot(snapshot(&[("V1", -76.0, -12.0)])));
        controller.handle_event(ConnectionEvent::Snapshot(snapshot(&[("V1", -76.1, -12.1)])));
        settle().await;
        drain_frames(&mut rx);

        assert_eq!(followed.position(), Some(Position::new(-76.1, -12.1)));
        // One placement at open, one for the first frame, 61 for the run.
        assert_eq!(followed.updates(), 63);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fit_after_reconnect() {
        let (mut controller, mut rx, _) = controller(AnimationPolicy::Replace);
        controller.handle_event(ConnectionEvent::Snapshot(snapshot(&[("V1", 0.0, 0.0)])));
        controller.handle_event(ConnectionEvent::Snapshot(snapshot(&[("V1", 1.0, 1.0)])));
        settle().await;

        let fits = |rx: &mut broadcast::Receiver<SyncEvent>| {
            let mut n = 0;
            while let Ok(event) = rx.try_recv() {
                if matches!(event, SyncEvent::FitToView(_)) {
                    n += 1;
                }
            }
            n
        };
        assert_eq!(fits(&mut rx), 1);

        controller.handle_event(ConnectionEvent::Error(SyncError::TransportError(
            TransportError::Stream("reset".into()),
        )));
        controller.handle_event(ConnectionEvent::Status(ConnectionState::Reconnecting));
        controller.handle_event(ConnectionEvent::Status(ConnectionState::Connecting));
        controller.handle_event(ConnectionEvent::Status(ConnectionState::Open));
        controller.handle_event(ConnectionEvent::Snapshot(snapshot(&[("V1", 2.0, 2.0)])));
        controller.handle_event(ConnectionEvent::Snapshot(snapshot(&[("V1", 3.0, 3.0)])));
        settle().await;

        assert_eq!(fits(&mut rx), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_first_snapshot_is_skipped() {
        let (mut controller, mut rx, _) = controller(AnimationPolicy::Replace);
        controller.handle_event(ConnectionEvent::Snapshot(Snapshot::empty()));
        assert!(rx.try_recv().is_err());
        assert!(controller.previous().is_none());

        let s0 = snapshot(&[("V1", 1.0, 1.0)]);
        controller.handle_event(ConnectionEvent::Snapshot(s0.clone()));
        assert_eq!(rx.try_recv().unwrap(), SyncEvent::Frame(s0));
        assert!(matches!(rx.try_recv().unwrap(), SyncEvent::FitToView(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_snapshot_keeps_previous_for_interpolation() {
        let (mut controller, mut rx, _) = controller(AnimationPolicy::Replace);
        let s0 = snapshot(&[("V1", -76.0, -12.0)]);
        controller.handle_event(ConnectionEvent::Snapshot(s0.clone()));
        drain_frames(&mut rx);

        controller.handle_event(ConnectionEvent::Snapshot(Snapshot::empty()));
        assert_eq!(controller.previous(), Some(&s0));

        controller.handle_event(ConnectionEvent::Snapshot(snapshot(&[("V1", -76.1, -12.1)])));
        settle().await;

        let frames = drain_frames(&mut rx);
        assert_eq!(frames.len(), 61);
        assert_eq!(
            frames[0].position_of(&EntityId::from("V1")),
            Some(Position::new(-76.0, -12.0))
        );
        assert!(frames.iter().all(|f| !f.is_empty()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_and_errors_forwarded() {
        let (mut controller, mut rx, _) = controller(AnimationPolicy::Replace);
        controller.handle_event(ConnectionEvent::Status(ConnectionState::Connecting));
        controller.handle_event(ConnectionEvent::Error(SyncError::TransportClosed(None)));

        assert_eq!(
            rx.try_recv().unwrap(),
            SyncEvent::Status(ConnectionState::Connecting)
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            SyncEvent::Error(SyncError::TransportClosed(None))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_frame_count_publishes_target_only() {
        let (tx, mut rx) = broadcast::channel(16);
        let overlays = Arc::new(Mutex::new(EntityOverlayRegistry::new()));
        let publisher = Arc::new(FramePublisher::new(tx, overlays));
        let config = AnimationConfig {
            frame_count: 0,
            ..Default::default()
        };
        let mut controller = SyncController::new(config, publisher);
        let s1 = snapshot(&[("V1", 1.0, 1.0)]);

        controller.handle_event(ConnectionEvent::Snapshot(snapshot(&[("V1", 0.0, 0.0)])));
        drain_frames(&mut rx);
        controller.handle_event(ConnectionEvent::Snapshot(s1.clone()));
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(drain_frames(&mut rx), vec![s1]);
    }
}
