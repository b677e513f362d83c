//! In-process publish/subscribe broker
//!
//! Decouples mutation handlers from subscription streams. Topics are named
//! channels created lazily on first use; each listener gets its own bounded
//! queue fed by a tokio broadcast channel, so a slow consumer never blocks a
//! publisher. On overflow the oldest undelivered events are dropped for the
//! lagging listener only (broadcast's ring-buffer semantics); the stream
//! skips the gap and continues with newer events.
//!
//! There is no persistence or replay: events published while a topic has no
//! listeners are dropped.

use std::collections::HashMap;

use futures::Stream;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

/// Topic-keyed broadcast broker for payloads of type `T`.
pub struct EventBroker<T> {
    topics: RwLock<HashMap<String, broadcast::Sender<T>>>,
    capacity: usize,
}

impl<T: Clone + Send + 'static> EventBroker<T> {
    /// Create a broker whose per-listener queues hold up to `capacity`
    /// undelivered events.
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Deliver `payload` to every listener currently registered on `topic`,
    /// in registration order. Fire-and-forget: returns immediately and never
    /// fails, even when the topic has no listeners.
    pub fn publish(&self, topic: &str, payload: T) {
        let topics = self.topics.read();
        if let Some(tx) = topics.get(topic) {
            // Err means zero receivers right now; the event is simply dropped.
            let _ = tx.send(payload);
        }
    }

    /// Register a new listener on `topic`. Events published after this call
    /// are delivered to the returned handle; earlier events are never
    /// replayed. Dropping the handle unsubscribes.
    pub fn subscribe(&self, topic: &str) -> Listener<T> {
        let mut topics = self.topics.write();
        let tx = topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        Listener { rx: tx.subscribe() }
    }

    /// Number of listeners currently registered on `topic`.
    pub fn listener_count(&self, topic: &str) -> usize {
        self.topics
            .read()
            .get(topic)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}

/// A consumer-owned handle to an active subscription.
///
/// Each listener receives its own independent sequence of payloads, in
/// publish order. Dropping the handle deregisters it from the topic; an
/// in-flight publish to a listener being dropped neither blocks nor errors.
pub struct Listener<T> {
    rx: broadcast::Receiver<T>,
}

impl<T: Clone + Send + 'static> Listener<T> {
    /// Turn the handle into a lazy stream of payloads. Lag gaps (overflowed
    /// queue) are skipped silently per the drop-oldest policy.
    pub fn into_stream(self) -> impl Stream<Item = T> {
        BroadcastStream::new(self.rx).filter_map(|result| result.ok())
    }

    /// Await the next payload, or `None` once the topic's channel is closed.
    pub async fn recv(&mut self) -> Option<T> {
        loop {
            match self.rx.recv().await {
                Ok(payload) => return Some(payload),
                // Overflow: skip the gap and keep reading newer events.
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking poll for an already-delivered payload.
    pub fn try_recv(&mut self) -> Option<T> {
        loop {
            match self.rx.try_recv() {
                Ok(payload) => return Some(payload),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn every_listener_receives_events_in_publish_order() {
        let broker = EventBroker::new(16);
        let mut first = broker.subscribe("topic");
        let mut second = broker.subscribe("topic");

        broker.publish("topic", 1u32);
        broker.publish("topic", 2u32);
        broker.publish("topic", 3u32);

        for listener in [&mut first, &mut second] {
            assert_eq!(listener.recv().await, Some(1));
            assert_eq!(listener.recv().await, Some(2));
            assert_eq!(listener.recv().await, Some(3));
        }
    }

    #[tokio::test]
    async fn publish_without_listeners_is_a_no_op() {
        let broker = EventBroker::new(16);
        broker.publish("topic", 42u32);

        // No replay: a later subscriber starts with an empty sequence.
        let mut listener = broker.subscribe("topic");
        broker.publish("topic", 7u32);
        assert_eq!(listener.recv().await, Some(7));
        assert_eq!(listener.try_recv(), None);
    }

    #[tokio::test]
    async fn dropped_listener_stops_receiving() {
        let broker = EventBroker::new(16);
        let first = broker.subscribe("topic");
        let mut second = broker.subscribe("topic");
        assert_eq!(broker.listener_count("topic"), 2);

        drop(first);
        assert_eq!(broker.listener_count("topic"), 1);

        broker.publish("topic", 9u32);
        assert_eq!(second.recv().await, Some(9));
    }

    #[tokio::test]
    async fn topics_are_independent() {
        let broker = EventBroker::new(16);
        let mut added = broker.subscribe("added");
        let mut removed = broker.subscribe("removed");

        broker.publish("added", 1u32);
        broker.publish("removed", 2u32);

        assert_eq!(added.recv().await, Some(1));
        assert_eq!(added.try_recv(), None);
        assert_eq!(removed.recv().await, Some(2));
    }

    #[tokio::test]
    async fn overflow_drops_oldest_for_the_lagging_listener() {
        let broker = EventBroker::new(2);
        let mut listener = broker.subscribe("topic");

        for i in 0..5u32 {
            broker.publish("topic", i);
        }

        // Only the two newest fit; the gap is skipped, order preserved.
        assert_eq!(listener.recv().await, Some(3));
        assert_eq!(listener.recv().await, Some(4));
        assert_eq!(listener.try_recv(), None);
    }

    #[tokio::test]
    async fn stream_adapter_yields_payloads() {
        let broker = EventBroker::new(16);
        let listener = broker.subscribe("topic");
        broker.publish("topic", "hello".to_string());

        let mut stream = Box::pin(listener.into_stream());
        assert_eq!(stream.next().await, Some("hello".to_string()));
    }
}
