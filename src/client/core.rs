//! ICD client handle.
//!
//! The [`Client`] owns one backend session: the transport connection, the
//! router every inbound frame passes through, and the session state.
//! Handles are cheap to clone and all share the same session.
//!
//! # Example
//!
//! ```no_run
//! use icd_client::{Client, CompletionPolicy, MessageType, OpenFile};
//!
//! # async fn example() -> icd_client::Result<()> {
//! let client = Client::builder().url("ws://localhost:3002").build()?;
//! client.connect().await?;
//!
//! let histogram = client.stream(CompletionPolicy::count(MessageType::RegionHistogramData, 1));
//! let ack = client
//!     .request(&OpenFile {
//!         directory: "set_QA".to_string(),
//!         file: "M17_SWex.fits".to_string(),
//!         hdu: "0".to_string(),
//!         ..Default::default()
//!     })
//!     .await?;
//! assert!(ack.success);
//! histogram.collect().await?;
//!
//! client.close();
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::RequestIdGenerator;
use crate::protocol::{
    InboundMessage, Message, MessageKind, MessageType, OutboundMessage, RegisterViewer,
    UnaryRequest, frame,
};
use crate::router::{Diagnostic, ResponsePredicate, Router, Subscription};
use crate::transport::Connection;

use super::builder::ClientBuilder;
use super::config::ClientConfig;
use super::session::{Session, SessionState};
use super::stream::{CompletionPolicy, Stream};

// ============================================================================
// RequestOptions
// ============================================================================

/// Per-call options for [`Client::request_with`].
pub struct RequestOptions<R> {
    timeout: Option<Duration>,
    predicate: Option<Box<dyn Fn(&R) -> bool + Send + Sync>>,
}

impl<R> Default for RequestOptions<R> {
    fn default() -> Self {
        Self {
            timeout: None,
            predicate: None,
        }
    }
}

impl<R> fmt::Debug for RequestOptions<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("timeout", &self.timeout)
            .field("has_predicate", &self.predicate.is_some())
            .finish()
    }
}

impl<R: InboundMessage> RequestOptions<R> {
    /// Creates options using the client's default timeout and FIFO matching.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the request timeout.
    #[inline]
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Accepts only responses for which `predicate` returns `true`.
    ///
    /// Use this to tell apart concurrent requests of the same type, e.g.
    /// two `OpenFile` calls with different file ids.
    #[inline]
    #[must_use]
    pub fn matching(mut self, predicate: impl Fn(&R) -> bool + Send + Sync + 'static) -> Self {
        self.predicate = Some(Box::new(predicate));
        self
    }

    fn into_parts(self) -> (Option<Duration>, Option<ResponsePredicate>) {
        let predicate = self.predicate.map(|predicate| -> ResponsePredicate {
            Box::new(move |message: &Message| {
                message.get::<R>().is_some_and(|response| predicate(response))
            })
        });
        (self.timeout, predicate)
    }
}

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for the client.
pub(crate) struct ClientInner {
    /// Validated configuration.
    pub config: ClientConfig,

    /// Inbound message router.
    pub router: Arc<Router>,

    /// Current transport connection.
    pub connection: Mutex<Option<Connection>>,

    /// Lifecycle state.
    pub state: Mutex<SessionState>,

    /// Registered session, while active.
    pub session: Mutex<Option<Session>>,

    /// Outbound request id source.
    pub request_ids: RequestIdGenerator,
}

// ============================================================================
// Client
// ============================================================================

/// Handle to one ICD backend session.
///
/// The client is responsible for:
/// - Opening the connection and registering the viewer
/// - Correlating unary requests with their responses
/// - Publishing streamed messages to subscribers
/// - Failing everything in flight on close
#[derive(Clone)]
pub struct Client {
    /// Shared inner state.
    pub(crate) inner: Arc<ClientInner>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("url", &self.inner.config.url.as_str())
            .field("state", &self.state())
            .field("pending", &self.pending_count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Client - Lifecycle
// ============================================================================

impl Client {
    /// Creates a configuration builder for the client.
    #[inline]
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a disconnected client from a validated configuration.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        let router = Router::new(config.max_pending_requests);
        Self {
            inner: Arc::new(ClientInner {
                config,
                router,
                connection: Mutex::new(None),
                state: Mutex::new(SessionState::Disconnected),
                session: Mutex::new(None),
                request_ids: RequestIdGenerator::new(),
            }),
        }
    }

    /// Returns the client configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Connects to the backend and registers the viewer.
    ///
    /// The state is `Active` only once `RegisterViewerAck` reports success.
    ///
    /// # Errors
    ///
    /// - [`Error::Protocol`] if the client is not disconnected
    /// - [`Error::ConnectionTimeout`] / [`Error::Connection`] if the socket fails
    /// - [`Error::Backend`] if the backend rejects the registration
    /// - [`Error::RequestTimeout`] if the registration is not acknowledged
    pub async fn connect(&self) -> Result<Session> {
        {
            let mut state = self.inner.state.lock();
            let current = *state;
            let busy = match current {
                SessionState::Disconnected => false,
                SessionState::Connecting => true,
                SessionState::Active => self.inner.router.is_open(),
            };
            if busy {
                return Err(Error::protocol(format!("Cannot connect while {current:?}")));
            }
            *state = SessionState::Connecting;
        }

        let epoch = self.inner.router.open();
        info!(url = %self.inner.config.url, epoch, "Connecting");

        match self.establish(epoch).await {
            Ok(session) => {
                info!(
                    session_id = %session.id,
                    session_type = ?session.session_type,
                    "Session registered"
                );
                Ok(session)
            }
            Err(e) => {
                warn!(error = %e, "Connect failed");
                self.close();
                Err(e)
            }
        }
    }

    async fn establish(&self, epoch: u64) -> Result<Session> {
        let config = &self.inner.config;
        let connection = Connection::open(
            &config.url,
            config.connect_timeout,
            self.inner.router.sink(epoch),
        )
        .await?;
        *self.inner.connection.lock() = Some(connection);

        let ack = self
            .call(
                &RegisterViewer {
                    session_id: config.session_id,
                    api_key: config.api_key.clone(),
                    client_feature_flags: config.client_feature_flags,
                },
                RequestOptions::new(),
            )
            .await?;

        if !ack.success {
            return Err(Error::backend(ack.message));
        }

        let session = Session::from(&ack);
        let mut state = self.inner.state.lock();
        if self.inner.router.active_epoch() != Some(epoch) {
            return Err(Error::ConnectionClosed);
        }
        *state = SessionState::Active;
        *self.inner.session.lock() = Some(session);
        Ok(session)
    }

    /// Returns the lifecycle state.
    ///
    /// Reports `Disconnected` as soon as the connection is lost, even
    /// before [`close`](Self::close) is called.
    #[must_use]
    pub fn state(&self) -> SessionState {
        let state = *self.inner.state.lock();
        if state == SessionState::Active && !self.inner.router.is_open() {
            return SessionState::Disconnected;
        }
        state
    }

    /// Returns the registered session while active.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        if self.state().is_active() {
            *self.inner.session.lock()
        } else {
            None
        }
    }

    /// Closes the session.
    ///
    /// Every pending request fails with [`Error::ConnectionClosed`] exactly
    /// once, every subscription ends, the received counter resets and the
    /// socket is shut down. No message of this connection is delivered
    /// after this returns. Idempotent.
    pub fn close(&self) {
        let connection = self.inner.connection.lock().take();
        let failed = self.inner.router.close();
        if let Some(connection) = connection {
            connection.shutdown();
        }

        let previous = std::mem::take(&mut *self.inner.state.lock());
        self.inner.session.lock().take();

        if previous != SessionState::Disconnected {
            info!(failed, "Client closed");
        }
    }
}

// ============================================================================
// Client - Messaging
// ============================================================================

impl Client {
    /// Sends a unary request and waits for its response.
    ///
    /// Concurrent requests of the same type are matched first come, first
    /// served; use [`request_with`](Self::request_with) to disambiguate.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] if the session is not active
    /// - [`Error::Protocol`] if too many requests are pending
    /// - [`Error::RequestTimeout`] if no response arrives in time
    /// - [`Error::ConnectionClosed`] if the connection closes first
    /// - [`Error::Backend`] if the response rejects the request
    pub async fn request<Q: UnaryRequest>(&self, message: &Q) -> Result<Q::Response> {
        self.request_with(message, RequestOptions::new()).await
    }

    /// Sends a unary request with per-call options.
    ///
    /// # Errors
    ///
    /// Same as [`request`](Self::request).
    pub async fn request_with<Q: UnaryRequest>(
        &self,
        message: &Q,
        options: RequestOptions<Q::Response>,
    ) -> Result<Q::Response> {
        if !self.state().is_active() {
            return Err(Error::NotConnected);
        }
        self.call(message, options).await
    }

    async fn call<Q: UnaryRequest>(
        &self,
        message: &Q,
        options: RequestOptions<Q::Response>,
    ) -> Result<Q::Response> {
        let expected = <Q::Response as InboundMessage>::MESSAGE_TYPE;
        let (timeout, predicate) = options.into_parts();
        let timeout = timeout.unwrap_or(self.inner.config.request_timeout);

        let request_id = self.inner.request_ids.next();
        let frame = frame::encode(message, request_id)?;

        let pending = self
            .inner
            .router
            .register(request_id, expected, predicate, timeout)?;
        self.send_frame(frame)?;
        trace!(%request_id, message_type = %Q::MESSAGE_TYPE, "Request sent");

        let response = pending.wait().await?;

        if let Some(reason) = response.payload.rejection() {
            debug!(%request_id, %expected, reason, "Request rejected by backend");
            return Err(Error::backend(reason));
        }

        let actual = response.message_type();
        response.into_inner::<Q::Response>().ok_or_else(|| {
            Error::protocol(format!("Expected {expected}, resolved with {actual}"))
        })
    }

    /// Sends a fire-and-forget command.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if the message expects a response
    /// - [`Error::NotConnected`] if the session is not active
    pub fn send_command<C: OutboundMessage>(&self, command: &C) -> Result<()> {
        if C::MESSAGE_TYPE.kind() != MessageKind::Command {
            return Err(Error::invalid_argument(format!(
                "{} expects a response; use request()",
                C::MESSAGE_TYPE
            )));
        }
        if !self.state().is_active() {
            return Err(Error::NotConnected);
        }

        let request_id = self.inner.request_ids.next();
        self.send_frame(frame::encode(command, request_id)?)?;
        trace!(%request_id, message_type = %C::MESSAGE_TYPE, "Command sent");
        Ok(())
    }

    fn send_frame(&self, frame: Vec<u8>) -> Result<()> {
        let connection = self.inner.connection.lock();
        connection
            .as_ref()
            .ok_or(Error::NotConnected)?
            .send(frame)
    }

    /// Number of unary requests awaiting a response.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.router.pending_count()
    }
}

// ============================================================================
// Client - Streams
// ============================================================================

impl Client {
    /// Subscribes to one or more stream channels as one ordered queue.
    ///
    /// Delivery is live only: messages dispatched before this call are not
    /// replayed, so subscribe before sending the request that triggers them.
    #[must_use]
    pub fn subscribe(&self, types: &[MessageType]) -> Subscription {
        self.inner.router.subscribe(types)
    }

    /// Subscribes to the channels `policy` needs and returns a collector.
    ///
    /// The subscription is taken immediately.
    #[must_use]
    pub fn stream(&self, policy: CompletionPolicy) -> Stream {
        let subscription = self.subscribe(&policy.message_types());
        Stream::new(subscription, policy)
    }

    /// Number of frames dispatched since the last close.
    ///
    /// Strictly increases with every inbound frame.
    #[inline]
    #[must_use]
    pub fn message_receiving(&self) -> u64 {
        self.inner.router.message_receiving()
    }

    /// Returns `true` if no frame arrives during `window`.
    ///
    /// This is how the absence of a message is asserted.
    pub async fn is_quiet_for(&self, window: Duration) -> bool {
        let before = self.message_receiving();
        tokio::time::sleep(window).await;
        self.message_receiving() == before
    }

    /// Subscribes to router diagnostics.
    #[must_use]
    pub fn diagnostics(&self) -> broadcast::Receiver<Diagnostic> {
        self.inner.router.diagnostics()
    }
}

// ============================================================================
// Tests
// ============================================================================
