//! Stream channels and subscriptions.
//!
//! Every streamed message type has one channel. A [`Subscription`] may
//! listen on several channels at once and still receives their messages
//! in a single queue, in the exact order the router dispatched them.

// ============================================================================
// Imports
// ============================================================================

use std::pin::Pin;
use std::sync::Weak;
use std::task::{Context, Poll};

use rustc_hash::FxHashMap;
use tokio::sync::mpsc;
use tracing::trace;

use crate::error::{Error, Result};
use crate::protocol::{Message, MessageType};

use super::Router;

// ============================================================================
// Types
// ============================================================================

/// Registry-local id of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SubscriberId(u64);

#[derive(Debug)]
struct Subscriber {
    id: SubscriberId,
    sender: mpsc::UnboundedSender<Message>,
}

// ============================================================================
// ChannelRegistry
// ============================================================================

/// Subscribers of each stream channel, in subscription order.
///
/// Channel entries outlive the connection: closing only drops the
/// subscriber queues.
#[derive(Debug, Default)]
pub(crate) struct ChannelRegistry {
    channels: FxHashMap<MessageType, Vec<Subscriber>>,
    next_id: u64,
}

impl ChannelRegistry {
    /// Adds one subscriber listening on every type in `types`.
    pub fn subscribe(
        &mut self,
        types: &[MessageType],
    ) -> (SubscriberId, mpsc::UnboundedReceiver<Message>) {
        self.next_id += 1;
        let id = SubscriberId(self.next_id);
        let (sender, receiver) = mpsc::unbounded_channel();

        for &message_type in types {
            let subscribers = self.channels.entry(message_type).or_default();
            if subscribers.iter().all(|s| s.id != id) {
                subscribers.push(Subscriber {
                    id,
                    sender: sender.clone(),
                });
            }
        }

        (id, receiver)
    }

    /// Removes a subscriber from the given channels.
    pub fn unsubscribe(&mut self, id: SubscriberId, types: &[MessageType]) {
        for message_type in types {
            if let Some(subscribers) = self.channels.get_mut(message_type) {
                subscribers.retain(|s| s.id != id);
            }
        }
    }

    /// Delivers `message` to every subscriber of its channel.
    ///
    /// Returns the number of subscribers reached.
    pub fn publish(&mut self, message: &Message) -> usize {
        let Some(subscribers) = self.channels.get_mut(&message.message_type()) else {
            return 0;
        };

        let mut delivered = 0;
        subscribers.retain(|subscriber| {
            if subscriber.sender.send(message.clone()).is_ok() {
                delivered += 1;
                true
            } else {
                trace!(message_type = %message.message_type(), "Dropping closed subscriber");
                false
            }
        });
        delivered
    }

    /// Drops every subscriber queue; pending receivers observe the end.
    pub fn close_all(&mut self) {
        for subscribers in self.channels.values_mut() {
            subscribers.clear();
        }
    }

    /// Number of subscribers on a channel.
    #[inline]
    pub fn subscriber_count(&self, message_type: MessageType) -> usize {
        self.channels.get(&message_type).map_or(0, Vec::len)
    }
}

// ============================================================================
// Subscription
// ============================================================================

/// Ordered queue of streamed messages from one or more channels.
///
/// Dropping the subscription unsubscribes it.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    types: Vec<MessageType>,
    receiver: mpsc::UnboundedReceiver<Message>,
    router: Weak<Router>,
}

impl Subscription {
    pub(crate) fn new(
        id: SubscriberId,
        types: Vec<MessageType>,
        receiver: mpsc::UnboundedReceiver<Message>,
        router: Weak<Router>,
    ) -> Self {
        Self {
            id,
            types,
            receiver,
            router,
        }
    }

    /// Channels this subscription listens on.
    #[inline]
    #[must_use]
    pub fn message_types(&self) -> &[MessageType] {
        &self.types
    }

    /// Waits for the next message.
    ///
    /// # Errors
    ///
    /// [`Error::ConnectionClosed`] once the connection closes and the
    /// queue is drained.
    pub async fn recv(&mut self) -> Result<Message> {
        self.receiver.recv().await.ok_or(Error::ConnectionClosed)
    }

    /// Returns the next queued message without waiting.
    pub fn try_recv(&mut self) -> Option<Message> {
        self.receiver.try_recv().ok()
    }

    /// Stops listening. Already queued messages are discarded.
    pub fn unsubscribe(self) {}
}

impl futures_util::Stream for Subscription {
    type Item = Message;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(router) = self.router.upgrade() {
            router.unsubscribe(self.id, &self.types);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::RequestId;
    use crate::protocol::{RasterTileData, RasterTileSync, RegionHistogramData};

    fn tile() -> Message {
        Message::new(RequestId::new(0), RasterTileData::default())
    }

    fn sync() -> Message {
        Message::new(RequestId::new(0), RasterTileSync::default())
    }

    #[test]
    fn test_publish_preserves_cross_channel_order() {
        let mut registry = ChannelRegistry::default();
        let (_, mut rx) =
            registry.subscribe(&[MessageType::RasterTileSync, MessageType::RasterTileData]);

        registry.publish(&sync());
        registry.publish(&tile());
        registry.publish(&tile());
        registry.publish(&sync());

        let order: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|m| m.message_type())
            .collect();
        assert_eq!(
            order,
            vec![
                MessageType::RasterTileSync,
                MessageType::RasterTileData,
                MessageType::RasterTileData,
                MessageType::RasterTileSync,
            ]
        );
    }

    #[test]
    fn test_publish_fans_out() {
        let mut registry = ChannelRegistry::default();
        let (_, mut first) = registry.subscribe(&[MessageType::RasterTileData]);
        let (_, mut second) = registry.subscribe(&[MessageType::RasterTileData]);

        assert_eq!(registry.publish(&tile()), 2);
        assert!(first.try_recv().is_ok());
        assert!(second.try_recv().is_ok());
    }

    #[test]
    fn test_publish_without_subscribers() {
        let mut registry = ChannelRegistry::default();
        let message = Message::new(RequestId::new(0), RegionHistogramData::default());
        assert_eq!(registry.publish(&message), 0);
    }

    #[test]
    fn test_closed_receivers_are_pruned() {
        let mut registry = ChannelRegistry::default();
        let (_, rx) = registry.subscribe(&[MessageType::RasterTileData]);
        drop(rx);

        assert_eq!(registry.publish(&tile()), 0);
        assert_eq!(registry.subscriber_count(MessageType::RasterTileData), 0);
    }

    #[test]
    fn test_duplicate_types_subscribe_once() {
        let mut registry = ChannelRegistry::default();
        let (_, mut rx) =
            registry.subscribe(&[MessageType::RasterTileData, MessageType::RasterTileData]);

        registry.publish(&tile());
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unsubscribe_and_close_all() {
        let mut registry = ChannelRegistry::default();
        let (id, _rx) = registry.subscribe(&[MessageType::RasterTileData]);
        let (_, mut other) = registry.subscribe(&[MessageType::RasterTileSync]);

        registry.unsubscribe(id, &[MessageType::RasterTileData]);
        assert_eq!(registry.subscriber_count(MessageType::RasterTileData), 0);

        registry.close_all();
        assert_eq!(registry.subscriber_count(MessageType::RasterTileSync), 0);
        assert!(matches!(
            other.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }
}
