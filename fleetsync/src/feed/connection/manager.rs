//! Connection manager - owns the stream connection and its retry policy.
//!
//! The manager runs a single driver task that owns the transport stream and
//! the [`ConnectionMachine`]. Public calls (`open`, `close`) are sent to the
//! driver as commands, so every state transition happens in one place and in
//! order with transport events.
//!
//! # Events
//!
//! The driver reports to its consumer over an mpsc channel, in arrival
//! order:
//!
//! - [`ConnectionEvent::Status`] on every state transition (except `close()`)
//! - [`ConnectionEvent::Snapshot`] for each valid message
//! - [`ConnectionEvent::Error`] for invalid messages, transport failures and
//!   reconnect exhaustion
//!
//! # Shutdown
//!
//! `close()` returns only after the driver has cancelled any pending
//! reconnect timer and closed the stream; nothing is emitted afterwards until
//! the next `open()`. Dropping the manager stops the driver.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::state::{ConnectionMachine, ConnectionState, LossAction, ReconnectPolicy};
use super::transport::{MessageStream, Transport, TransportEvent};
use crate::feed::error::SyncError;
use crate::feed::snapshot::Snapshot;
use crate::feed::validator::SnapshotValidator;

/// Event emitted by the connection manager.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    /// The state machine changed state.
    Status(ConnectionState),
    /// A validated snapshot arrived.
    Snapshot(Snapshot),
    /// Something went wrong (see [`SyncError::kind`]).
    Error(SyncError),
}

enum Command {
    Open(oneshot::Sender<bool>),
    Close(oneshot::Sender<()>),
}

/// Handle to the connection driver task.
pub struct ConnectionManager {
    commands: mpsc::UnboundedSender<Command>,
    machine: Arc<Mutex<ConnectionMachine>>,
    endpoint: String,
    driver: Option<JoinHandle<()>>,
}

impl ConnectionManager {
    /// Start the driver task. The connection stays `Idle` until [`open`](Self::open).
    pub fn start<T: Transport>(
        transport: T,
        validator: SnapshotValidator,
        policy: ReconnectPolicy,
        events: mpsc::Sender<ConnectionEvent>,
    ) -> Self {
        let machine = Arc::new(Mutex::new(ConnectionMachine::new(policy)));
        let (commands, command_rx) = mpsc::unbounded_channel();
        let endpoint = transport.endpoint().to_string();

        let driver = Driver {
            transport,
            validator,
            machine: Arc::clone(&machine),
            events,
            commands: command_rx,
        };

        Self {
            commands,
            machine,
            endpoint,
            driver: Some(tokio::spawn(driver.run())),
        }
    }

    /// Open the connection.
    ///
    /// Returns false if the connection was already connecting or open. When
    /// called during `Reconnecting`, the pending timer is dropped and a
    /// connection attempt starts now.
    pub async fn open(&self) -> bool {
        let (ack, done) = oneshot::channel();
        if self.commands.send(Command::Open(ack)).is_err() {
            return false;
        }
        done.await.unwrap_or(false)
    }

    /// Close the connection and cancel any pending reconnect.
    pub async fn close(&self) {
        let (ack, done) = oneshot::channel();
        if self.commands.send(Command::Close(ack)).is_ok() {
            let _ = done.await;
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.machine.lock().state()
    }

    /// Reconnect attempts since the last successful open.
    pub fn attempts(&self) -> u32 {
        self.machine.lock().attempts()
    }

    /// Endpoint this manager connects to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Close the connection and wait for the driver task to exit.
    pub async fn shutdown(&mut self) {
        self.close().await;
        let (closed, _) = mpsc::unbounded_channel();
        drop(std::mem::replace(&mut self.commands, closed));
        if let Some(handle) = self.driver.take() {
            if let Err(e) = handle.await {
                tracing::error!("Connection driver task panicked: {}", e);
            }
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if let Some(handle) = self.driver.take() {
            handle.abort();
        }
    }
}

/// What the driver is doing between events.
enum Phase<S> {
    /// Idle, closed or failed: only commands wake the driver.
    Waiting,
    /// A connection attempt is in flight.
    Connecting,
    /// Connected; reading messages.
    Open(S),
    /// Sleeping until the reconnect deadline.
    Reconnecting(Instant),
}

struct Driver<T: Transport> {
    transport: T,
    validator: SnapshotValidator,
    machine: Arc<Mutex<ConnectionMachine>>,
    events: mpsc::Sender<ConnectionEvent>,
    commands: mpsc::UnboundedReceiver<Command>,
}

impl<T: Transport> Driver<T> {
    async fn run(mut self) {
        tracing::debug!(endpoint = self.transport.endpoint(), "Connection driver started");

        let mut phase: Phase<T::Stream> = Phase::Waiting;

        loop {
            if self.events.is_closed() {
                tracing::debug!("Connection event channel closed, stopping driver");
                break;
            }

            let next = match phase {
                Phase::Waiting => match self.commands.recv().await {
                    Some(command) => self.on_command(command, Phase::Waiting).await,
                    None => None,
                },

                Phase::Connecting => {
                    tokio::select! {
                        biased;
                        command = self.commands.recv() => match command {
                            Some(command) => self.on_command(command, Phase::Connecting).await,
                            None => None,
                        },
                        result = self.transport.connect() => match result {
                            Ok(stream) => Some(self.on_opened(stream).await),
                            Err(e) => Some(self.on_lost(SyncError::TransportError(e)).await),
                        },
                    }
                }

                Phase::Open(mut stream) => {
                    tokio::select! {
                        biased;
                        command = self.commands.recv() => match command {
                            Some(command) => self.on_command(command, Phase::Open(stream)).await,
                            None => {
                                stream.close().await;
                                None
                            }
                        },
                        event = stream.next_event() => Some(self.on_transport_event(event, stream).await),
                    }
                }

                Phase::Reconnecting(deadline) => {
                    tokio::select! {
                        biased;
                        command = self.commands.recv() => match command {
                            Some(command) => self.on_command(command, Phase::Reconnecting(deadline)).await,
                            None => None,
                        },
                        _ = tokio::time::sleep_until(deadline) => Some(self.on_retry_due().await),
                    }
                }
            };

            match next {
                Some(p) => phase = p,
                None => break,
            }
        }

        tracing::debug!("Connection driver stopped");
    }

    /// Apply a command. `None` stops the driver.
    async fn on_command(&mut self, command: Command, current: Phase<T::Stream>) -> Option<Phase<T::Stream>> {
        match command {
            Command::Open(ack) => {
                let started = self.machine.lock().open();
                if !started {
                    tracing::debug!("open() ignored, connection already active");
                    let _ = ack.send(false);
                    return Some(current);
                }

                if let Phase::Reconnecting(_) = current {
                    tracing::debug!("Pending reconnect superseded by open()");
                }
                tracing::info!(endpoint = self.transport.endpoint(), "Connecting to position stream");
                self.emit(ConnectionEvent::Status(ConnectionState::Connecting)).await;
                let _ = ack.send(true);
                Some(Phase::Connecting)
            }
            Command::Close(ack) => {
                if let Phase::Open(mut stream) = current {
                    stream.close().await;
                }
                self.machine.lock().close();
                tracing::info!("Position stream closed");
                let _ = ack.send(());
                Some(Phase::Waiting)
            }
        }
    }

    async fn on_opened(&mut self, stream: T::Stream) -> Phase<T::Stream> {
        self.machine.lock().transport_opened();
        tracing::info!(endpoint = self.transport.endpoint(), "Position stream connected");
        self.emit(ConnectionEvent::Status(ConnectionState::Open)).await;
        Phase::Open(stream)
    }

    async fn on_transport_event(&mut self, event: TransportEvent, stream: T::Stream) -> Phase<T::Stream> {
        match event {
            TransportEvent::Message(text) => {
                match self.validator.validate_text(&text) {
                    Ok(snapshot) => {
                        tracing::trace!(entities = snapshot.len(), "Snapshot received");
                        self.emit(ConnectionEvent::Snapshot(snapshot)).await;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Discarding invalid snapshot");
                        self.emit(ConnectionEvent::Error(e.into())).await;
                    }
                }
                Phase::Open(stream)
            }
            TransportEvent::Closed(reason) => self.on_lost(SyncError::TransportClosed(reason)).await,
            TransportEvent::Error(message) => {
                self.on_lost(SyncError::TransportError(
                    crate::feed::error::TransportError::Stream(message),
                ))
                .await
            }
        }
    }

    async fn on_lost(&mut self, error: SyncError) -> Phase<T::Stream> {
        tracing::warn!(error = %error, "Position stream lost");
        self.emit(ConnectionEvent::Error(error)).await;

        let action = self.machine.lock().transport_lost();
        match action {
            LossAction::Retry { attempt, delay } => {
                tracing::info!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Scheduling reconnect"
                );
                self.emit(ConnectionEvent::Status(ConnectionState::Reconnecting)).await;
                Phase::Reconnecting(Instant::now() + delay)
            }
            LossAction::GiveUp { attempts } => {
                tracing::error!(attempts, "Reconnect attempts exhausted");
                self.emit(ConnectionEvent::Status(ConnectionState::Failed)).await;
                self.emit(ConnectionEvent::Error(SyncError::ReconnectExhausted { attempts }))
                    .await;
                Phase::Waiting
            }
            LossAction::Ignored => Phase::Waiting,
        }
    }

    async fn on_retry_due(&mut self) -> Phase<T::Stream> {
        let (retrying, attempt) = {
            let mut machine = self.machine.lock();
            (machine.retry_due(), machine.attempts())
        };
        if !retrying {
            return Phase::Waiting;
        }
        tracing::info!(attempt, "Reconnecting to position stream");
        self.emit(ConnectionEvent::Status(ConnectionState::Connecting)).await;
        Phase::Connecting
    }

    async fn emit(&self, event: ConnectionEvent) {
        if self.events.send(event).await.is_err() {
            tracing::trace!("Connection event dropped, receiver gone");
        }
    }
}
