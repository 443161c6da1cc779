//! Stream transport abstraction.
//!
//! The [`Transport`] trait hides the concrete socket so the connection
//! manager can be driven by the WebSocket implementation in production and by
//! scripted streams in tests.

use std::future::Future;

use crate::feed::error::TransportError;

/// Event read from an established stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A text message carrying one serialized snapshot.
    Message(String),

    /// The remote side closed the stream (terminal).
    Closed(Option<String>),

    /// The stream failed (terminal).
    Error(String),
}

/// Factory for stream connections to one endpoint.
pub trait Transport: Send + Sync + 'static {
    /// Connected stream type.
    type Stream: MessageStream;

    /// Endpoint description used in logs.
    fn endpoint(&self) -> &str;

    /// Open a new connection.
    fn connect(&self) -> impl Future<Output = Result<Self::Stream, TransportError>> + Send;
}

/// An established, ordered stream of inbound events.
pub trait MessageStream: Send + 'static {
    /// Wait for the next event.
    ///
    /// After a terminal event the stream must not be polled again.
    fn next_event(&mut self) -> impl Future<Output = TransportEvent> + Send;

    /// Close the stream from our side.
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}
