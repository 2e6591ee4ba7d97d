//! Request/response correlation table.
//!
//! Pending unary calls are queued per expected response type. An inbound
//! response resolves the oldest entry of its type whose predicate accepts
//! it; entries without a predicate accept anything of their type.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

use rustc_hash::FxHashMap;
use tokio::sync::oneshot;

use crate::error::{Error, Result};
use crate::identifiers::RequestId;
use crate::protocol::{Message, MessageType};

// ============================================================================
// Types
// ============================================================================

/// Caller-supplied filter disambiguating concurrent same-type requests.
pub type ResponsePredicate = Box<dyn Fn(&Message) -> bool + Send + Sync>;

/// Channel resolving a pending request.
pub(crate) type ResponseSink = oneshot::Sender<Result<Message>>;

/// Table-local id of a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct PendingId(pub(crate) u64);

// ============================================================================
// PendingRequest
// ============================================================================

/// One in-flight unary call.
pub(crate) struct PendingRequest {
    /// Table-local id.
    pub id: PendingId,
    /// Request id written into the outbound frame.
    pub request_id: RequestId,
    /// Response type that resolves this request.
    pub expected: MessageType,
    /// Optional correlation predicate.
    pub predicate: Option<ResponsePredicate>,
    /// Resolution channel.
    pub sink: ResponseSink,
    /// When the request was registered.
    pub created_at: Instant,
}

impl PendingRequest {
    /// Returns `true` if `message` may resolve this request.
    fn accepts(&self, message: &Message) -> bool {
        self.predicate
            .as_ref()
            .is_none_or(|predicate| predicate(message))
    }

    /// Resolves the request with a response.
    pub fn resolve(self, message: Message) {
        let _ = self.sink.send(Ok(message));
    }

    /// Rejects the request.
    pub fn reject(self, error: Error) {
        let _ = self.sink.send(Err(error));
    }
}

impl fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRequest")
            .field("id", &self.id)
            .field("request_id", &self.request_id)
            .field("expected", &self.expected)
            .field("has_predicate", &self.predicate.is_some())
            .field("created_at", &self.created_at)
            .finish()
    }
}

// ============================================================================
// CorrelationTable
// ============================================================================

/// FIFO queues of pending requests keyed by expected response type.
#[derive(Debug, Default)]
pub(crate) struct CorrelationTable {
    queues: FxHashMap<MessageType, VecDeque<PendingRequest>>,
    len: usize,
}

impl CorrelationTable {
    /// Enqueues a pending request behind older ones of the same type.
    pub fn insert(&mut self, pending: PendingRequest) {
        self.queues
            .entry(pending.expected)
            .or_default()
            .push_back(pending);
        self.len += 1;
    }

    /// Removes and returns the oldest request `message` resolves.
    ///
    /// Entries whose caller has already gone away are discarded on the
    /// way, so they never swallow a response.
    pub fn take_match(&mut self, message: &Message) -> Option<PendingRequest> {
        let queue = self.queues.get_mut(&message.message_type())?;

        let before = queue.len();
        queue.retain(|pending| !pending.sink.is_closed());
        self.len -= before - queue.len();

        let index = queue.iter().position(|pending| pending.accepts(message))?;
        let pending = queue.remove(index)?;
        self.len -= 1;
        Some(pending)
    }

    /// Removes a request by id.
    pub fn remove(&mut self, id: PendingId) -> Option<PendingRequest> {
        for queue in self.queues.values_mut() {
            if let Some(index) = queue.iter().position(|pending| pending.id == id) {
                self.len -= 1;
                return queue.remove(index);
            }
        }
        None
    }

    /// Removes every pending request, oldest first.
    pub fn drain(&mut self) -> Vec<PendingRequest> {
        let mut pending: Vec<_> = self
            .queues
            .values_mut()
            .flat_map(|queue| queue.drain(..))
            .collect();
        pending.sort_by_key(|p| p.id);
        self.len = 0;
        pending
    }

    /// Number of pending requests.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing is pending.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{OpenFileAck, SetRegionAck};

    fn pending(
        id: u64,
        expected: MessageType,
        predicate: Option<ResponsePredicate>,
    ) -> (PendingRequest, oneshot::Receiver<Result<Message>>) {
        let (sink, rx) = oneshot::channel();
        let pending = PendingRequest {
            id: PendingId(id),
            request_id: RequestId::new(id as u32),
            expected,
            predicate,
            sink,
            created_at: Instant::now(),
        };
        (pending, rx)
    }

    fn open_file_ack(file_id: i32) -> Message {
        Message::new(
            RequestId::new(0),
            OpenFileAck {
                success: true,
                file_id,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_fifo_without_predicate() {
        let mut table = CorrelationTable::default();
        let (first, _rx1) = pending(1, MessageType::OpenFileAck, None);
        let (second, _rx2) = pending(2, MessageType::OpenFileAck, None);
        table.insert(first);
        table.insert(second);

        let matched = table.take_match(&open_file_ack(0)).expect("match");
        assert_eq!(matched.id, PendingId(1));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_predicate_selects_entry() {
        let mut table = CorrelationTable::default();
        let (first, _rx1) = pending(
            1,
            MessageType::OpenFileAck,
            Some(Box::new(|m: &Message| m.payload.file_id() == Some(0))),
        );
        let (second, _rx2) = pending(
            2,
            MessageType::OpenFileAck,
            Some(Box::new(|m: &Message| m.payload.file_id() == Some(1))),
        );
        table.insert(first);
        table.insert(second);

        let matched = table.take_match(&open_file_ack(1)).expect("match");
        assert_eq!(matched.id, PendingId(2));

        let matched = table.take_match(&open_file_ack(0)).expect("match");
        assert_eq!(matched.id, PendingId(1));
        assert!(table.is_empty());
    }

    #[test]
    fn test_no_match_for_other_type() {
        let mut table = CorrelationTable::default();
        let (first, _rx) = pending(1, MessageType::SetRegionAck, None);
        table.insert(first);

        assert!(table.take_match(&open_file_ack(0)).is_none());

        let region_ack = Message::new(RequestId::new(0), SetRegionAck::default());
        assert!(table.take_match(&region_ack).is_some());
    }

    #[test]
    fn test_abandoned_entries_are_skipped() {
        let mut table = CorrelationTable::default();
        let (first, rx1) = pending(1, MessageType::OpenFileAck, None);
        let (second, _rx2) = pending(2, MessageType::OpenFileAck, None);
        table.insert(first);
        table.insert(second);
        drop(rx1);

        let matched = table.take_match(&open_file_ack(0)).expect("match");
        assert_eq!(matched.id, PendingId(2));
        assert!(table.is_empty());
    }

    #[test]
    fn test_remove_by_id() {
        let mut table = CorrelationTable::default();
        let (first, _rx1) = pending(1, MessageType::OpenFileAck, None);
        let (second, _rx2) = pending(2, MessageType::SetRegionAck, None);
        table.insert(first);
        table.insert(second);

        assert!(table.remove(PendingId(2)).is_some());
        assert!(table.remove(PendingId(2)).is_none());
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn test_drain_rejects_in_order() {
        let mut table = CorrelationTable::default();
        let (first, rx1) = pending(1, MessageType::SetRegionAck, None);
        let (second, rx2) = pending(2, MessageType::OpenFileAck, None);
        table.insert(second);
        table.insert(first);

        let drained = table.drain();
        assert_eq!(
            drained.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![PendingId(1), PendingId(2)]
        );
        for pending in drained {
            pending.reject(Error::ConnectionClosed);
        }

        assert!(matches!(rx1.await, Ok(Err(Error::ConnectionClosed))));
        assert!(matches!(rx2.await, Ok(Err(Error::ConnectionClosed))));
        assert!(table.is_empty());
    }
}
