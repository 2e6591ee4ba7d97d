//! Inbound message router.
//!
//! The router is the single point every inbound frame passes through. It
//! decodes the frame, then either resolves the pending request the frame
//! answers or publishes it to the subscribers of its stream channel.
//!
//! # Epochs
//!
//! Each transport connection is bound to a router epoch. Frames carry the
//! epoch of the connection that read them, and [`Router::dispatch`] drops
//! any frame whose epoch is no longer active. Closing the router retires
//! the epoch under the same lock dispatch runs under, so once
//! [`Router::close`] returns no frame of the old connection is delivered.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `correlation` | Pending unary requests, FIFO per response type |
//! | `channels` | Stream channels and subscriptions |

// ============================================================================
// Submodules
// ============================================================================

/// Request/response correlation.
pub mod correlation;

/// Stream channels.
pub mod channels;

// ============================================================================
// Imports
// ============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, error, info, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::RequestId;
use crate::protocol::{ErrorData, ErrorSeverity, Message, MessageType, frame};
use crate::transport::InboundSink;

use channels::{ChannelRegistry, SubscriberId};
use correlation::{CorrelationTable, PendingId, PendingRequest};

// ============================================================================
// Re-exports
// ============================================================================

pub use channels::Subscription;
pub use correlation::ResponsePredicate;

// ============================================================================
// Constants
// ============================================================================

/// Capacity of the diagnostics broadcast channel.
const DIAGNOSTICS_CAPACITY: usize = 64;

// ============================================================================
// Diagnostic
// ============================================================================

/// Noteworthy router events that do not belong to any caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// An inbound frame could not be decoded and was dropped.
    DecodeFailed {
        /// Decoder error text.
        reason: String,
    },
    /// A unary response matched no pending request and was dropped.
    UnmatchedResponse {
        /// Type of the dropped response.
        message_type: MessageType,
        /// Request id from its header.
        request_id: RequestId,
    },
    /// The connection ended without a local `close`.
    Disconnected,
}

// ============================================================================
// Dispatched
// ============================================================================

/// What [`Router::dispatch`] did with a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// The frame resolved a pending request.
    Resolved,
    /// The frame was published to this many subscribers.
    Published(usize),
    /// A unary frame with no matching pending request.
    Unmatched,
    /// The frame failed to decode.
    Malformed,
    /// The frame belongs to a retired connection.
    Stale,
}

// ============================================================================
// Router
// ============================================================================

#[derive(Debug, Default)]
struct RouterState {
    epoch: Option<u64>,
    correlation: CorrelationTable,
    channels: ChannelRegistry,
}

/// Routes decoded inbound messages to pending requests and subscribers.
#[derive(Debug)]
pub struct Router {
    state: Mutex<RouterState>,
    received: AtomicU64,
    next_epoch: AtomicU64,
    next_pending: AtomicU64,
    max_pending: usize,
    diagnostics: broadcast::Sender<Diagnostic>,
}

impl Router {
    /// Creates a closed router.
    #[must_use]
    pub fn new(max_pending: usize) -> Arc<Self> {
        let (diagnostics, _) = broadcast::channel(DIAGNOSTICS_CAPACITY);
        Arc::new(Self {
            state: Mutex::new(RouterState::default()),
            received: AtomicU64::new(0),
            next_epoch: AtomicU64::new(0),
            next_pending: AtomicU64::new(0),
            max_pending,
            diagnostics,
        })
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Starts a new epoch and returns it.
    ///
    /// Frames tagged with any earlier epoch are dropped from now on.
    pub fn open(&self) -> u64 {
        let epoch = self.next_epoch.fetch_add(1, Ordering::Relaxed) + 1;
        self.state.lock().epoch = Some(epoch);
        debug!(epoch, "Router epoch opened");
        epoch
    }

    /// Retires the active epoch.
    ///
    /// Fails every pending request with [`Error::ConnectionClosed`], ends
    /// every subscription and resets the received counter. Returns the
    /// number of requests failed. Idempotent.
    pub fn close(&self) -> usize {
        self.close_epoch(None).unwrap_or(0)
    }

    /// Closes the router if `epoch` is still active.
    ///
    /// Called when a connection ends on its own. A reader task that
    /// outlived its connection cannot retire a newer epoch.
    pub fn disconnect(&self, epoch: u64) {
        if self.close_epoch(Some(epoch)).is_none() {
            return;
        }
        info!(epoch, "Connection lost");
        let _ = self.diagnostics.send(Diagnostic::Disconnected);
    }

    /// Retires the active epoch if it equals `expected`, or whatever is
    /// active when `expected` is `None`.
    ///
    /// The epoch check and the drain share one lock. Returns `None` when
    /// `expected` is no longer active.
    fn close_epoch(&self, expected: Option<u64>) -> Option<usize> {
        let pending = {
            let mut state = self.state.lock();
            if expected.is_some() && state.epoch != expected {
                return None;
            }
            let epoch = state.epoch.take();
            let pending = state.correlation.drain();
            state.channels.close_all();
            self.received.store(0, Ordering::SeqCst);
            if let Some(epoch) = epoch {
                debug!(epoch, "Router epoch closed");
            }
            pending
        };

        let count = pending.len();
        for request in pending {
            request.reject(Error::ConnectionClosed);
        }
        if count > 0 {
            debug!(count, "Failed pending requests on close");
        }
        Some(count)
    }

    /// Returns the active epoch.
    #[inline]
    #[must_use]
    pub fn active_epoch(&self) -> Option<u64> {
        self.state.lock().epoch
    }

    /// Returns `true` while an epoch is active.
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.active_epoch().is_some()
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Decodes and routes one inbound frame read under `epoch`.
    pub fn dispatch(&self, epoch: u64, frame: &[u8]) -> Dispatched {
        let mut state = self.state.lock();
        if state.epoch != Some(epoch) {
            trace!(epoch, "Dropping frame from retired connection");
            return Dispatched::Stale;
        }

        self.received.fetch_add(1, Ordering::SeqCst);

        match frame::decode(frame) {
            Ok(message) => self.route(&mut state, message),
            Err(e) => {
                warn!(error = %e, len = frame.len(), "Dropping undecodable frame");
                let _ = self.diagnostics.send(Diagnostic::DecodeFailed {
                    reason: e.to_string(),
                });
                Dispatched::Malformed
            }
        }
    }

    fn route(&self, state: &mut RouterState, message: Message) -> Dispatched {
        let message_type = message.message_type();
        let request_id = message.request_id;

        if message_type.is_unary() {
            return match state.correlation.take_match(&message) {
                Some(pending) => {
                    trace!(
                        %message_type,
                        %request_id,
                        elapsed_ms = pending.created_at.elapsed().as_millis() as u64,
                        "Response resolved"
                    );
                    pending.resolve(message);
                    Dispatched::Resolved
                }
                None => {
                    warn!(%message_type, %request_id, "Response for unknown request");
                    let _ = self.diagnostics.send(Diagnostic::UnmatchedResponse {
                        message_type,
                        request_id,
                    });
                    Dispatched::Unmatched
                }
            };
        }

        if let Some(data) = message.get::<ErrorData>() {
            log_error_data(data);
        }

        let delivered = state.channels.publish(&message);
        trace!(%message_type, delivered, "Stream message published");
        Dispatched::Published(delivered)
    }

    /// Number of frames dispatched since the last close.
    #[inline]
    #[must_use]
    pub fn message_receiving(&self) -> u64 {
        self.received.load(Ordering::SeqCst)
    }

    /// Subscribes to router diagnostics.
    #[must_use]
    pub fn diagnostics(&self) -> broadcast::Receiver<Diagnostic> {
        self.diagnostics.subscribe()
    }

    // ========================================================================
    // Correlation
    // ========================================================================

    /// Registers a pending unary request that gives up after `timeout`.
    ///
    /// Must be called before the request frame is sent.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] if no epoch is active
    /// - [`Error::Protocol`] if too many requests are pending
    pub fn register(
        self: &Arc<Self>,
        request_id: RequestId,
        expected: MessageType,
        predicate: Option<ResponsePredicate>,
        timeout: Duration,
    ) -> Result<PendingResponse> {
        let (sink, receiver) = oneshot::channel();
        let id = PendingId(self.next_pending.fetch_add(1, Ordering::Relaxed));

        {
            let mut state = self.state.lock();
            if state.epoch.is_none() {
                return Err(Error::NotConnected);
            }

            let pending = state.correlation.len();
            if pending >= self.max_pending {
                warn!(pending, max = self.max_pending, "Too many pending requests");
                return Err(Error::protocol(format!(
                    "Too many pending requests: {pending}/{}",
                    self.max_pending
                )));
            }

            state.correlation.insert(PendingRequest {
                id,
                request_id,
                expected,
                predicate,
                sink,
                created_at: Instant::now(),
            });
        }

        Ok(PendingResponse {
            id,
            request_id,
            expected,
            timeout,
            receiver,
            router: Arc::downgrade(self),
        })
    }

    /// Removes a pending request. Returns `true` if it was still pending.
    pub(crate) fn cancel(&self, id: PendingId) -> bool {
        self.state.lock().correlation.remove(id).is_some()
    }

    /// Number of pending requests.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.state.lock().correlation.len()
    }

    // ========================================================================
    // Channels
    // ========================================================================

    /// Subscribes to one or more stream channels as one ordered queue.
    ///
    /// Subscribing works whether or not a connection is open; the
    /// subscription ends at the next [`close`](Self::close).
    #[must_use]
    pub fn subscribe(self: &Arc<Self>, types: &[MessageType]) -> Subscription {
        let (id, receiver) = self.state.lock().channels.subscribe(types);
        trace!(?types, "Subscribed");
        Subscription::new(id, types.to_vec(), receiver, Arc::downgrade(self))
    }

    pub(crate) fn unsubscribe(&self, id: SubscriberId, types: &[MessageType]) {
        self.state.lock().channels.unsubscribe(id, types);
    }

    /// Number of subscribers on a channel.
    #[must_use]
    pub fn subscriber_count(&self, message_type: MessageType) -> usize {
        self.state.lock().channels.subscriber_count(message_type)
    }

    /// Binds an inbound sink to `epoch`.
    #[must_use]
    pub fn sink(self: &Arc<Self>, epoch: u64) -> Arc<dyn InboundSink> {
        Arc::new(EpochSink {
            router: Arc::clone(self),
            epoch,
        })
    }
}

fn log_error_data(data: &ErrorData) {
    let tags = data.tags.join(",");
    match data.severity {
        ErrorSeverity::Debug => debug!(%tags, message = %data.message, "Backend error report"),
        ErrorSeverity::Info => info!(%tags, message = %data.message, "Backend error report"),
        ErrorSeverity::Warning => warn!(%tags, message = %data.message, "Backend error report"),
        ErrorSeverity::Error | ErrorSeverity::Critical => {
            error!(%tags, message = %data.message, "Backend error report");
        }
    }
}

// ============================================================================
// EpochSink
// ============================================================================

/// Feeds one connection's frames into the router under its epoch.
struct EpochSink {
    router: Arc<Router>,
    epoch: u64,
}

impl InboundSink for EpochSink {
    fn on_frame(&self, frame: &[u8]) {
        self.router.dispatch(self.epoch, frame);
    }

    fn on_disconnect(&self) {
        self.router.disconnect(self.epoch);
    }
}

// ============================================================================
// PendingResponse
// ============================================================================

/// Future side of a registered request.
///
/// Dropping it before resolution removes the request from the table.
#[derive(Debug)]
pub struct PendingResponse {
    id: PendingId,
    request_id: RequestId,
    expected: MessageType,
    timeout: Duration,
    receiver: oneshot::Receiver<Result<Message>>,
    router: Weak<Router>,
}

impl PendingResponse {
    /// Request id of the outbound frame.
    #[inline]
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Timeout given at registration.
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Waits for the response.
    ///
    /// # Errors
    ///
    /// - [`Error::RequestTimeout`] if nothing matches within the registered timeout
    /// - [`Error::ConnectionClosed`] if the connection closes first
    pub async fn wait(mut self) -> Result<Message> {
        let timeout = self.timeout;
        match tokio::time::timeout(timeout, &mut self.receiver).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::ConnectionClosed),
            Err(_) => {
                debug!(request_id = %self.request_id, expected = %self.expected, "Request timed out");
                Err(Error::request_timeout(
                    self.request_id,
                    self.expected,
                    timeout.as_millis() as u64,
                ))
            }
        }
    }
}

impl Drop for PendingResponse {
    fn drop(&mut self) {
        if let Some(router) = self.router.upgrade()
            && router.cancel(self.id)
        {
            trace!(request_id = %self.request_id, "Removed abandoned request");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
