//! WebSocket transport over `tokio-tungstenite`.

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::transport::{MessageStream, Transport, TransportEvent};
use crate::feed::error::TransportError;

/// Default stream endpoint of the position server.
pub const DEFAULT_STREAM_URL: &str = "ws://localhost:4567/ws";

/// Transport that connects to a WebSocket endpoint.
#[derive(Debug, Clone)]
pub struct WebSocketTransport {
    url: String,
}

impl WebSocketTransport {
    /// Create a transport for `url` (`ws://` or `wss://`).
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Default for WebSocketTransport {
    fn default() -> Self {
        Self::new(DEFAULT_STREAM_URL)
    }
}

impl Transport for WebSocketTransport {
    type Stream = WebSocketMessageStream;

    fn endpoint(&self) -> &str {
        &self.url
    }

    async fn connect(&self) -> Result<WebSocketMessageStream, TransportError> {
        let (socket, response) =
            connect_async(self.url.as_str())
                .await
                .map_err(|e| TransportError::Connect {
                    url: self.url.clone(),
                    reason: e.to_string(),
                })?;

        tracing::debug!(
            url = %self.url,
            status = %response.status(),
            "WebSocket handshake complete"
        );

        Ok(WebSocketMessageStream { socket })
    }
}

/// Established WebSocket connection.
pub struct WebSocketMessageStream {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl MessageStream for WebSocketMessageStream {
    async fn next_event(&mut self) -> TransportEvent {
        loop {
            match self.socket.next().await {
                Some(Ok(Message::Text(text))) => return TransportEvent::Message(text.to_string()),
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => return TransportEvent::Message(text),
                    Err(_) => {
                        tracing::trace!(len = bytes.len(), "Ignoring non-UTF-8 binary frame");
                    }
                },
                Some(Ok(Message::Close(frame))) => {
                    return TransportEvent::Closed(frame.map(|f| f.reason.to_string()));
                }
                Some(Ok(_)) => {
                    // Ping/pong and raw frames carry no snapshot data.
                }
                Some(Err(e)) => return TransportEvent::Error(e.to_string()),
                None => return TransportEvent::Closed(None),
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.socket.close(None).await {
            tracing::trace!(error = %e, "WebSocket close handshake failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint() {
        let transport = WebSocketTransport::default();
        assert_eq!(transport.endpoint(), "ws://localhost:4567/ws");
    }

    #[tokio::test]
    async fn test_connect_refused_is_connect_error() {
        // Port 9 (discard) is closed on test machines.
        let transport = WebSocketTransport::new("ws://127.0.0.1:9/ws");
        let result = transport.connect().await;
        assert!(matches!(result, Err(TransportError::Connect { .. })));
    }

    #[tokio::test]
    async fn test_invalid_url_is_connect_error() {
        let transport = WebSocketTransport::new("not a url");
        let result = transport.connect().await;
        assert!(matches!(result, Err(TransportError::Connect { .. })));
    }
}
