//! WebSocket connection and event loop.
//!
//! This module owns the binary WebSocket to the backend. A single spawned
//! task reads every inbound frame in receipt order and hands it to an
//! [`InboundSink`]; outbound frames are queued to the same task.
//!
//! # Event Loop
//!
//! The connection spawns a tokio task that handles:
//!
//! - Incoming binary frames from the backend
//! - Outgoing frames from the client
//! - Local shutdown and remote close

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, trace, warn};
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Types
// ============================================================================

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Receiver of everything a connection reads.
///
/// Both callbacks run on the connection's reader task and must not block.
pub trait InboundSink: Send + Sync + 'static {
    /// Called once per complete binary frame, in receipt order.
    fn on_frame(&self, frame: &[u8]);

    /// Called once when the reader task ends.
    fn on_disconnect(&self);
}

// ============================================================================
// ConnectionStatus
// ============================================================================

/// Transport status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// No socket.
    #[default]
    Closed,
    /// WebSocket handshake in progress.
    Connecting,
    /// Frames may be sent.
    Active,
}

// ============================================================================
// ConnectionCommand
// ============================================================================

/// Internal commands for the event loop.
enum ConnectionCommand {
    /// Write one binary frame.
    Send(Vec<u8>),
    /// Close the socket.
    Shutdown,
}

// ============================================================================
// Connection
// ============================================================================

/// Binary WebSocket connection to the backend.
///
/// Dropping the connection shuts it down.
pub struct Connection {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ConnectionCommand>,
    /// Status signal (shared with event loop).
    status: Arc<watch::Sender<ConnectionStatus>>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Opens a WebSocket to `url` and starts the event loop.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionTimeout`] if the handshake does not finish within `connect_timeout`
    /// - [`Error::Connection`] if the TCP connection cannot be made
    /// - [`Error::WebSocket`] if the server rejects the upgrade
    pub async fn open(
        url: &Url,
        connect_timeout: Duration,
        sink: Arc<dyn InboundSink>,
    ) -> Result<Self> {
        let (status, _) = watch::channel(ConnectionStatus::Connecting);
        let status = Arc::new(status);

        debug!(%url, "Opening WebSocket");

        let ws_stream = match timeout(connect_timeout, connect_async(url.as_str())).await {
            Ok(Ok((ws_stream, _response))) => ws_stream,
            Ok(Err(WsError::Io(e))) => {
                status.send_replace(ConnectionStatus::Closed);
                return Err(Error::connection(format!("WebSocket connect failed: {e}")));
            }
            Ok(Err(e)) => {
                status.send_replace(ConnectionStatus::Closed);
                return Err(e.into());
            }
            Err(_) => {
                status.send_replace(ConnectionStatus::Closed);
                return Err(Error::connection_timeout(
                    connect_timeout.as_millis() as u64,
                ));
            }
        };

        info!(%url, "WebSocket connection established");

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        status.send_replace(ConnectionStatus::Active);

        tokio::spawn(Self::run_event_loop(
            ws_stream,
            command_rx,
            Arc::clone(&status),
            sink,
        ));

        Ok(Self { command_tx, status })
    }

    /// Returns the current status.
    #[inline]
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    /// Returns a receiver observing status changes.
    #[must_use]
    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    /// Queues one binary frame for sending.
    ///
    /// # Errors
    ///
    /// [`Error::NotConnected`] if the connection is not active.
    pub fn send(&self, frame: Vec<u8>) -> Result<()> {
        if self.status() != ConnectionStatus::Active {
            return Err(Error::NotConnected);
        }

        self.command_tx
            .send(ConnectionCommand::Send(frame))
            .map_err(|_| Error::NotConnected)
    }

    /// Shuts down the connection.
    ///
    /// The status is `Closed` when this returns. Idempotent.
    pub fn shutdown(&self) {
        let previous = self.status.send_replace(ConnectionStatus::Closed);
        if previous != ConnectionStatus::Closed {
            debug!("Connection shutdown requested");
        }
        let _ = self.command_tx.send(ConnectionCommand::Shutdown);
    }

    /// Event loop that handles WebSocket I/O.
    async fn run_event_loop(
        ws_stream: WsStream,
        mut command_rx: mpsc::UnboundedReceiver<ConnectionCommand>,
        status: Arc<watch::Sender<ConnectionStatus>>,
        sink: Arc<dyn InboundSink>,
    ) {
        let (mut ws_write, mut ws_read) = ws_stream.split();

        loop {
            tokio::select! {
                // Incoming frames from backend
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Binary(data))) => {
                            trace!(len = data.len(), "Frame received");
                            sink.on_frame(&data);
                        }

                        Some(Ok(Message::Text(text))) => {
                            warn!(len = text.len(), "Ignoring text frame");
                        }

                        Some(Ok(Message::Close(_))) => {
                            debug!("WebSocket closed by remote");
                            break;
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            break;
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            break;
                        }

                        // Ignore Ping, Pong, raw Frame
                        _ => {}
                    }
                }

                // Commands from client
                command = command_rx.recv() => {
                    match command {
                        Some(ConnectionCommand::Send(frame)) => {
                            let len = frame.len();
                            if let Err(e) = ws_write.send(Message::Binary(frame.into())).await {
                                warn!(error = %e, "Failed to send frame");
                                break;
                            }
                            trace!(len, "Frame sent");
                        }

                        Some(ConnectionCommand::Shutdown) => {
                            debug!("Shutdown command received");
                            let _ = ws_write.close().await;
                            break;
                        }

                        None => {
                            debug!("Command channel closed");
                            break;
                        }
                    }
                }
            }
        }

        status.send_replace(ConnectionStatus::Closed);
        sink.on_disconnect();

        debug!("Event loop terminated");
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ============================================================================
// Tests
// ============================================================================
