//! Streaming connection lifecycle.
//!
//! - [`ConnectionMachine`] - pure state machine with the reconnect policy
//! - [`Transport`] / [`MessageStream`] - socket abstraction
//! - [`WebSocketTransport`] - production transport
//! - [`ConnectionManager`] - driver task that ties them together

mod manager;
mod state;
mod transport;
mod websocket;

pub use manager::{ConnectionEvent, ConnectionManager};
pub use state::{
    ConnectionMachine, ConnectionState, LossAction, ReconnectPolicy,
    DEFAULT_MAX_RECONNECT_ATTEMPTS, DEFAULT_RECONNECT_DELAY,
};
pub use transport::{MessageStream, Transport, TransportEvent};
pub use websocket::{WebSocketMessageStream, WebSocketTransport, DEFAULT_STREAM_URL};
