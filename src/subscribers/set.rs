//! # Non-blocking event fan-out to multiple subscribers.
//!
//! Provides [`SubscriberSet`]: distributes events to multiple subscribers
//! concurrently without blocking the publisher.
//!
//! ## Architecture
//! ```text
//! emit(event)
//!     │
//!     ├──► [queue 1] ──► worker 1 ──► subscriber1.on_event()
//!     │    (bounded)         └──────► panic → SubscriberPanicked
//!     ├──► [queue 2] ──► worker 2 ──► subscriber2.on_event()
//!     │    (bounded)
//!     └──► [queue N] ──► worker N ──► subscriberN.on_event()
//!          (bounded)
//! ```
//!
//! ## Rules
//! - **No cross-subscriber ordering**: subscriber A may process event N while B processes N+5
//! - **Overflow**: event dropped for that subscriber only, `SubscriberOverflow` published
//!   naming the lost hub event and the subscriber's running loss count
//! - **Non-blocking**: `emit()` returns immediately (uses `try_send`)
//! - **Isolation**: slow/panicking subscriber doesn't affect others
//! - **Per-subscriber FIFO**: each subscriber sees events in order
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a subscriber uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event, EventKind, panic_message};
use crate::subscribers::Subscribe;

/// Per-subscriber channel metadata.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
    /// Hub events this subscriber never saw.
    lost: AtomicUsize,
}

/// Fan-out coordinator for multiple event subscribers.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker task per subscriber.
    ///
    /// Must be called within a Tokio runtime when `subs` is non-empty.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, rx) = mpsc::channel::<Arc<Event>>(cap);

            workers.push(tokio::spawn(Self::drive(sub, rx, bus.clone())));
            channels.push(SubscriberChannel {
                name,
                sender: tx,
                lost: AtomicUsize::new(0),
            });
        }
        Self {
            channels,
            workers,
            bus,
        }
    }

    /// Feeds one subscriber until its channel closes; panics are reported, not propagated.
    async fn drive(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
        while let Some(ev) = rx.recv().await {
            let handled = std::panic::AssertUnwindSafe(sub.on_event(ev.as_ref()))
                .catch_unwind()
                .await;
            if let Err(panic) = handled {
                bus.publish(Event::subscriber_panicked(sub.name(), panic_message(panic.as_ref())));
            }
        }
    }

    /// Emits a pre-allocated `Arc<Event>` to all subscribers.
    ///
    /// - Uses `try_send` (non-blocking)
    /// - On queue full/closed: drops the event for that subscriber, bumps its loss
    ///   count and publishes `SubscriberOverflow` naming the lost event
    /// - A lost `SubscriberOverflow` is counted but not reported again.
    pub fn emit_arc(&self, event: Arc<Event>) {
        for channel in &self.channels {
            let reason = match channel.sender.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            let total = channel.lost.fetch_add(1, Ordering::Relaxed) + 1;
            if event.kind != EventKind::SubscriberOverflow {
                self.bus.publish(Event::subscriber_overflow(
                    channel.name,
                    reason,
                    &event,
                    total,
                ));
            }
        }
    }

    /// Number of events the named subscriber has lost to overflow.
    #[must_use]
    pub fn lost(&self, subscriber: &str) -> usize {
        self.channels
            .iter()
            .filter(|channel| channel.name == subscriber)
            .map(|channel| channel.lost.load(Ordering::Relaxed))
            .sum()
    }

    /// Emits an event to all subscribers (clones the event).
    pub fn emit(&self, event: &Event) {
        self.emit_arc(Arc::new(event.clone()));
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Gracefully shuts down all subscriber workers.
    ///
    /// 1. Drops all channel senders (workers see channel closed)
    /// 2. Awaits all worker tasks to finish
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedSender;

    struct Forwarding(UnboundedSender<EventKind>);

    #[async_trait]
    impl Subscribe for Forwarding {
        async fn on_event(&self, ev: &Event) {
            let _ = self.0.send(ev.kind);
        }
        fn name(&self) -> &'static str {
            "forwarding"
        }
    }

    struct Panicking;

    #[async_trait]
    impl Subscribe for Panicking {
        async fn on_event(&self, _ev: &Event) {
            panic!("subscriber exploded");
        }
        fn name(&self) -> &'static str {
            "panicking"
        }
    }

    #[tokio::test]
    async fn test_emit_reaches_every_subscriber_in_order() {
        let bus = Bus::new(16);
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let set = SubscriberSet::new(vec![Arc::new(Forwarding(tx))], bus);
        assert_eq!(set.len(), 1);

        set.emit(&Event::new(EventKind::HubConfigured));
        set.emit(&Event::new(EventKind::BatchForwarded));

        assert_eq!(rx.recv().await, Some(EventKind::HubConfigured));
        assert_eq!(rx.recv().await, Some(EventKind::BatchForwarded));
        set.shutdown().await;
    }

    #[tokio::test]
    async fn test_panicking_subscriber_is_reported() {
        let bus = Bus::new(16);
        let mut bus_rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Panicking)], bus);

        set.emit(&Event::new(EventKind::HubStopped));

        let ev = tokio::time::timeout(Duration::from_secs(1), bus_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ev.kind, EventKind::SubscriberPanicked);
        assert_eq!(ev.subscriber.as_deref(), Some("panicking"));
        assert_eq!(ev.reason.as_deref(), Some("subscriber exploded"));
    }

    struct Stalled;

    #[async_trait]
    impl Subscribe for Stalled {
        async fn on_event(&self, _ev: &Event) {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        fn name(&self) -> &'static str {
            "stalled"
        }
        fn queue_capacity(&self) -> usize {
            1
        }
    }

    #[tokio::test]
    async fn test_overflow_names_lost_event_and_counts() {
        let bus = Bus::new(16);
        let mut bus_rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Stalled)], bus);

        set.emit(&Event::new(EventKind::WorkerStarted));
        let lost = Event::new(EventKind::BatchForwarded);
        set.emit(&lost);
        set.emit(&Event::new(EventKind::FlushCompleted));

        let first = bus_rx.recv().await.unwrap();
        assert_eq!(first.kind, EventKind::SubscriberOverflow);
        assert_eq!(first.subscriber.as_deref(), Some("stalled"));
        assert_eq!(first.count, Some(1));
        let expected = format!("full: BatchForwarded #{}", lost.seq);
        assert_eq!(first.reason.as_deref(), Some(expected.as_str()));

        let second = bus_rx.recv().await.unwrap();
        assert_eq!(second.count, Some(2));
        assert_eq!(set.lost("stalled"), 2);
        assert_eq!(set.lost("other"), 0);
    }

    #[test]
    fn test_empty_set_needs_no_runtime() {
        let set = SubscriberSet::new(Vec::new(), Bus::new(1));
        assert!(set.is_empty());
    }
}
