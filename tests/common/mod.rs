//! In-process mock backend for integration tests.
//!
//! The mock accepts any number of WebSocket connections. Every binary
//! frame it receives is recorded and passed to a handler, whose replies
//! are sent back in order. `RegisterViewer` is acknowledged automatically
//! unless the handler answers it.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing_subscriber::EnvFilter;

use icd_client::protocol::frame::encode_payload;
use icd_client::{
    Client, FrameHeader, MessageType, Payload, RegisterViewer, RegisterViewerAck, RequestId,
    SessionId, SessionType,
};

/// Session id the mock assigns to new sessions.
pub const MOCK_SESSION_ID: SessionId = SessionId::new(7);

// ============================================================================
// Setup
// ============================================================================

/// Initialises test logging from `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Inbound
// ============================================================================

/// One frame the client sent.
#[derive(Debug, Clone)]
pub struct Inbound {
    pub header: FrameHeader,
    pub body: Vec<u8>,
}

impl Inbound {
    pub fn message_type(&self) -> MessageType {
        self.header.message_type
    }

    pub fn body<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("request body")
    }
}

// ============================================================================
// Reply
// ============================================================================

/// What the mock does in response to a frame.
pub enum Reply {
    /// Send a message echoing the request id.
    Message(Payload),
    /// Send raw bytes.
    Raw(Vec<u8>),
    /// Wait before the next reply.
    Delay(Duration),
    /// Close the socket.
    Close,
}

impl Reply {
    pub fn message(payload: impl Into<Payload>) -> Self {
        Self::Message(payload.into())
    }
}

type Handler = dyn Fn(&Inbound) -> Vec<Reply> + Send + Sync;

// ============================================================================
// MockBackend
// ============================================================================

pub struct MockBackend {
    url: String,
    received: Arc<Mutex<Vec<Inbound>>>,
    task: JoinHandle<()>,
}

impl MockBackend {
    /// Starts a backend on a random local port.
    pub async fn start(handler: impl Fn(&Inbound) -> Vec<Reply> + Send + Sync + 'static) -> Self {
        init_tracing();

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let received = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<Handler> = Arc::new(handler);

        let task = {
            let received = Arc::clone(&received);
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    tokio::spawn(serve(stream, Arc::clone(&handler), Arc::clone(&received)));
                }
            })
        };

        Self {
            url: format!("ws://127.0.0.1:{port}"),
            received,
            task,
        }
    }

    /// Starts a backend that only acknowledges registration.
    pub async fn silent() -> Self {
        Self::start(|_| Vec::new()).await
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Types of every frame received so far, in order.
    pub fn received_types(&self) -> Vec<MessageType> {
        self.received
            .lock()
            .iter()
            .map(Inbound::message_type)
            .collect()
    }

    /// Every frame received so far.
    pub fn received(&self) -> Vec<Inbound> {
        self.received.lock().clone()
    }

    /// A disconnected client for this backend.
    pub fn client(&self) -> Client {
        Client::builder()
            .url(self.url.clone())
            .request_timeout(Duration::from_secs(5))
            .build()
            .expect("client")
    }

    /// A client that has completed registration.
    pub async fn connected_client(&self) -> Client {
        let client = self.client();
        client.connect().await.expect("connect");
        client
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(stream: TcpStream, handler: Arc<Handler>, received: Arc<Mutex<Vec<Inbound>>>) {
    let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
        return;
    };

    while let Some(Ok(message)) = ws.next().await {
        let WsMessage::Binary(frame) = message else {
            continue;
        };
        let Ok((header, body)) = FrameHeader::parse(&frame) else {
            continue;
        };
        let inbound = Inbound {
            header,
            body: body.to_vec(),
        };
        received.lock().push(inbound.clone());

        let mut replies = handler(&inbound);
        if replies.is_empty() && inbound.message_type() == MessageType::RegisterViewer {
            replies.push(register_ack(&inbound.body()));
        }

        for reply in replies {
            let frame = match reply {
                Reply::Message(payload) => {
                    encode_payload(&payload, inbound.header.request_id).expect("encode")
                }
                Reply::Raw(bytes) => bytes,
                Reply::Delay(delay) => {
                    tokio::time::sleep(delay).await;
                    continue;
                }
                Reply::Close => {
                    let _ = ws.close(None).await;
                    return;
                }
            };
            if ws.send(WsMessage::Binary(frame.into())).await.is_err() {
                return;
            }
        }
    }
}

/// Successful registration ack for `request`.
pub fn register_ack(request: &RegisterViewer) -> Reply {
    let (session_id, session_type) = if request.session_id.is_new() {
        (MOCK_SESSION_ID, SessionType::New)
    } else {
        (request.session_id, SessionType::Resumed)
    };

    Reply::message(RegisterViewerAck {
        session_id,
        success: true,
        session_type,
        server_feature_flags: 1,
        ..Default::default()
    })
}

/// Encodes a push message outside any request.
pub fn push_frame(payload: impl Into<Payload>) -> Vec<u8> {
    encode_payload(&payload.into(), RequestId::new(0)).expect("encode")
}
