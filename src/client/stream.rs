//! Composite completion over stream channels.
//!
//! A [`Stream`] subscribes to one or more channels and collects messages
//! until its [`CompletionPolicy`] is satisfied:
//!
//! | Policy | Completes when |
//! |--------|----------------|
//! | `count(type, n)` | `n` messages of `type` arrived |
//! | `raster_tiles(n)` | 2 tile syncs and `n - 2` tiles arrived, any interleaving |
//! | `progress(type)` | a message reports `progress >= 1` |
//! | `until(type, f)` | `f` accepts a message |
//!
//! The collected messages keep the exact order the router dispatched them,
//! across channels.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::protocol::{InboundMessage, Message, MessageType};
use crate::router::Subscription;

// ============================================================================
// Types
// ============================================================================

/// Completion test for [`CompletionPolicy::Until`].
pub type MessageFilter = Arc<dyn Fn(&Message) -> bool + Send + Sync>;

/// Syncs bracketing every raster tile burst.
const RASTER_SYNC_COUNT: usize = 2;

// ============================================================================
// CompletionPolicy
// ============================================================================

/// When a [`Stream`] is done.
#[derive(Clone)]
pub enum CompletionPolicy {
    /// Exactly `count` messages of one type.
    Count {
        /// Channel.
        message_type: MessageType,
        /// Messages to collect.
        count: usize,
    },
    /// Two channels merged into one ordered sequence, each with its own count.
    Merged {
        /// Data channel.
        data: MessageType,
        /// Data messages to collect.
        data_count: usize,
        /// Marker channel.
        sync: MessageType,
        /// Marker messages to collect.
        sync_count: usize,
    },
    /// Every message of one type up to and including the first `done` accepts.
    Until {
        /// Channel.
        message_type: MessageType,
        /// Completion test.
        done: MessageFilter,
    },
}

impl fmt::Debug for CompletionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count {
                message_type,
                count,
            } => f
                .debug_struct("Count")
                .field("message_type", message_type)
                .field("count", count)
                .finish(),
            Self::Merged {
                data,
                data_count,
                sync,
                sync_count,
            } => f
                .debug_struct("Merged")
                .field("data", data)
                .field("data_count", data_count)
                .field("sync", sync)
                .field("sync_count", sync_count)
                .finish(),
            Self::Until { message_type, .. } => f
                .debug_struct("Until")
                .field("message_type", message_type)
                .finish_non_exhaustive(),
        }
    }
}

impl CompletionPolicy {
    /// Collects exactly `count` messages of `message_type`.
    #[inline]
    #[must_use]
    pub fn count(message_type: MessageType, count: usize) -> Self {
        Self::Count {
            message_type,
            count,
        }
    }

    /// Collects one raster tile burst of `total` messages.
    ///
    /// A burst is the opening and closing `RasterTileSync` plus
    /// `total - 2` `RasterTileData` messages, in whatever order they arrive.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `total < 2`.
    pub fn raster_tiles(total: usize) -> Result<Self> {
        let Some(tiles) = total.checked_sub(RASTER_SYNC_COUNT) else {
            return Err(Error::invalid_argument(format!(
                "raster tile burst needs at least {RASTER_SYNC_COUNT} messages, got {total}"
            )));
        };

        Ok(Self::Merged {
            data: MessageType::RasterTileData,
            data_count: tiles,
            sync: MessageType::RasterTileSync,
            sync_count: RASTER_SYNC_COUNT,
        })
    }

    /// Collects messages of `message_type` until one reports completion.
    #[must_use]
    pub fn progress(message_type: MessageType) -> Self {
        Self::until(message_type, |message| message.payload.is_complete())
    }

    /// Collects messages of `message_type` until `done` accepts one.
    #[must_use]
    pub fn until(
        message_type: MessageType,
        done: impl Fn(&Message) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::Until {
            message_type,
            done: Arc::new(done),
        }
    }

    /// Channels this policy listens on.
    #[must_use]
    pub fn message_types(&self) -> Vec<MessageType> {
        match self {
            Self::Count { message_type, .. } | Self::Until { message_type, .. } => {
                vec![*message_type]
            }
            Self::Merged { data, sync, .. } => vec![*sync, *data],
        }
    }
}

// ============================================================================
// Collector
// ============================================================================

/// Pure completion state machine behind [`Stream`].
#[derive(Debug)]
pub struct Collector {
    policy: CompletionPolicy,
    collected: Vec<Message>,
    data_seen: usize,
    sync_seen: usize,
    done: bool,
}

impl Collector {
    /// Creates a collector with nothing observed.
    #[must_use]
    pub fn new(policy: CompletionPolicy) -> Self {
        let done = match &policy {
            CompletionPolicy::Count { count, .. } => *count == 0,
            CompletionPolicy::Merged {
                data_count,
                sync_count,
                ..
            } => *data_count == 0 && *sync_count == 0,
            CompletionPolicy::Until { .. } => false,
        };

        Self {
            policy,
            collected: Vec::new(),
            data_seen: 0,
            sync_seen: 0,
            done,
        }
    }

    /// Feeds one message. Returns `true` once the policy is satisfied.
    ///
    /// Messages that do not count toward the policy, and anything after
    /// completion, are ignored.
    pub fn observe(&mut self, message: Message) -> bool {
        if self.done {
            return true;
        }

        let message_type = message.message_type();
        match &self.policy {
            CompletionPolicy::Count {
                message_type: wanted,
                count,
            } => {
                if message_type == *wanted {
                    self.collected.push(message);
                    self.done = self.collected.len() >= *count;
                }
            }
            CompletionPolicy::Merged {
                data,
                data_count,
                sync,
                sync_count,
            } => {
                if message_type == *data && self.data_seen < *data_count {
                    self.data_seen += 1;
                    self.collected.push(message);
                } else if message_type == *sync && self.sync_seen < *sync_count {
                    self.sync_seen += 1;
                    self.collected.push(message);
                }
                self.done = self.data_seen >= *data_count && self.sync_seen >= *sync_count;
            }
            CompletionPolicy::Until {
                message_type: wanted,
                done,
            } => {
                if message_type == *wanted {
                    let finished = done(&message);
                    self.collected.push(message);
                    self.done = finished;
                }
            }
        }

        self.done
    }

    /// Returns `true` once the policy is satisfied.
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.done
    }

    /// Messages collected so far, in arrival order.
    #[inline]
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.collected
    }

    /// Consumes the collector, returning what it collected.
    #[must_use]
    pub fn into_messages(self) -> Vec<Message> {
        self.collected
    }
}

// ============================================================================
// Stream
// ============================================================================

/// Subscription plus completion policy.
///
/// Create with [`Client::stream`](super::Client::stream) before sending
/// the request that triggers the messages.
#[derive(Debug)]
pub struct Stream {
    subscription: Subscription,
    collector: Collector,
    timeout: Option<Duration>,
}

impl Stream {
    pub(crate) fn new(subscription: Subscription, policy: CompletionPolicy) -> Self {
        Self {
            subscription,
            collector: Collector::new(policy),
            timeout: None,
        }
    }

    /// Gives up after `timeout`.
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Waits until the policy is satisfied.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the connection closes first
    /// - [`Error::Timeout`] if the timeout elapses first
    pub async fn collect(mut self) -> Result<Vec<Message>> {
        let Self {
            subscription,
            collector,
            timeout,
        } = &mut self;

        let run = async {
            while !collector.is_complete() {
                let message = subscription.recv().await?;
                collector.observe(message);
            }
            Ok::<(), Error>(())
        };

        match *timeout {
            Some(limit) => tokio::time::timeout(limit, run).await.map_err(|_| {
                Error::timeout("stream collect", limit.as_millis() as u64)
            })??,
            None => run.await?,
        }

        Ok(self.collector.into_messages())
    }

    /// Like [`collect`](Self::collect), keeping only the `T` messages.
    ///
    /// # Errors
    ///
    /// Same as [`collect`](Self::collect).
    pub async fn collect_as<T: InboundMessage>(self) -> Result<Vec<T>> {
        let messages = self.collect().await?;
        Ok(messages
            .into_iter()
            .filter_map(Message::into_inner::<T>)
            .collect())
    }
}

// ============================================================================
// Tests
// ============================================================================
