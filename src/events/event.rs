//! # Runtime events emitted by the hub and its forwarding worker.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Lifecycle events**: reconfiguration and worker start/stop
//! - **Delivery events**: batches handed to routers, queue overflow
//! - **Failure events**: router/preprocessor/worker failures that the hub suppresses
//! - **Subscriber events**: problems inside the subscriber fan-out itself
//!
//! Nothing the hub swallows is silent: every suppressed failure or dropped item
//! is published here so a [`Subscribe`](crate::Subscribe) implementation can log
//! or count it.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use eventhub::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::RouterForwardFailed)
//!     .with_router("disk")
//!     .with_reason("disk full")
//!     .with_count(12);
//!
//! assert_eq!(ev.kind, EventKind::RouterForwardFailed);
//! assert_eq!(ev.router.as_deref(), Some("disk"));
//! assert_eq!(ev.count, Some(12));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of hub events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `reason`: why, and which hub event was lost (e.g. "full: BatchForwarded #42")
    /// - `count`: events this subscriber has lost so far
    SubscriberOverflow,

    // === Lifecycle events ===
    /// A configuration was installed and its routers started.
    ///
    /// Sets:
    /// - `count`: number of routers in the configuration
    HubConfigured,

    /// The hub was reconfigured to "no configuration"; events are retained.
    HubStopped,

    /// A reconfiguration observed its cancellation token; hub state is undefined.
    ReconfigureCanceled,

    /// A forwarding worker was spawned for a configuration.
    WorkerStarted,

    /// A forwarding worker exited after cancellation.
    WorkerStopped,

    // === Delivery events ===
    /// Items were dropped because the queue was at capacity.
    ///
    /// Sets:
    /// - `count`: number of dropped items
    QueueOverflow,

    /// A batch was handed to every router of the active configuration.
    ///
    /// Sets:
    /// - `count`: number of events in the batch
    BatchForwarded,

    /// All flushable routers were flushed after the flush barrier was reached.
    ///
    /// Sets:
    /// - `count`: number of routers whose flush failed
    FlushCompleted,

    // === Failure events ===
    /// A router failed (or panicked) while starting.
    ///
    /// Sets:
    /// - `router`: router name
    /// - `reason`: error message
    RouterStartFailed,

    /// A router failed (or panicked) while stopping.
    ///
    /// Sets:
    /// - `router`: router name
    /// - `reason`: error message
    RouterStopFailed,

    /// A router failed (or panicked) to accept a batch; other routers are unaffected.
    ///
    /// Sets:
    /// - `router`: router name
    /// - `reason`: error message
    /// - `count`: number of events in the batch
    RouterForwardFailed,

    /// A router failed (or panicked) to flush; reported in the flush result too.
    ///
    /// Sets:
    /// - `router`: router name
    /// - `reason`: error message
    RouterFlushFailed,

    /// Enqueue-time preprocessing panicked; the items of that call were dropped.
    ///
    /// Sets:
    /// - `reason`: panic info/message
    /// - `count`: number of dropped items
    PreprocessorPanicked,

    /// Batch processing panicked in the worker; the worker keeps running.
    ///
    /// Sets:
    /// - `reason`: panic info/message
    WorkerPanicked,
}

/// Hub event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the router, if applicable.
    pub router: Option<Arc<str>>,
    /// Name of the subscriber, for subscriber events.
    pub subscriber: Option<Arc<str>>,
    /// Human-readable reason (errors, panic info, overflow details).
    pub reason: Option<Arc<str>>,
    /// Item or router count, depending on the kind.
    pub count: Option<usize>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            router: None,
            subscriber: None,
            reason: None,
            count: None,
        }
    }

    /// Attaches a router name.
    #[inline]
    pub fn with_router(mut self, router: impl Into<Arc<str>>) -> Self {
        self.router = Some(router.into());
        self
    }

    /// Attaches a subscriber name.
    #[inline]
    pub fn with_subscriber(mut self, subscriber: impl Into<Arc<str>>) -> Self {
        self.subscriber = Some(subscriber.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a count.
    #[inline]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Creates a subscriber overflow event for the `lost` hub event.
    ///
    /// `total` is the number of events this subscriber has lost so far.
    pub fn subscriber_overflow(
        subscriber: &'static str,
        reason: &'static str,
        lost: &Event,
        total: usize,
    ) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_subscriber(subscriber)
            .with_reason(format!("{reason}: {:?} #{}", lost.kind, lost.seq))
            .with_count(total)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_subscriber(subscriber)
            .with_reason(info)
    }

    /// True for events that report a suppressed failure or dropped data.
    pub fn is_failure(&self) -> bool {
        matches!(
            self.kind,
            EventKind::QueueOverflow
                | EventKind::RouterStartFailed
                | EventKind::RouterStopFailed
                | EventKind::RouterForwardFailed
                | EventKind::RouterFlushFailed
                | EventKind::PreprocessorPanicked
                | EventKind::WorkerPanicked
                | EventKind::SubscriberOverflow
                | EventKind::SubscriberPanicked
        )
    }
}

/// Extracts a readable message from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::WorkerStarted);
        let b = Event::new(EventKind::WorkerStopped);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_failure_classification() {
        assert!(Event::new(EventKind::QueueOverflow).is_failure());
        assert!(Event::new(EventKind::RouterForwardFailed).is_failure());
        assert!(!Event::new(EventKind::BatchForwarded).is_failure());
        assert!(!Event::new(EventKind::HubConfigured).is_failure());
    }

    #[test]
    fn test_subscriber_events_name_the_subscriber() {
        let lost = Event::new(EventKind::BatchForwarded).with_count(3);
        let ev = Event::subscriber_overflow("metrics", "full", &lost, 7);
        assert_eq!(ev.subscriber.as_deref(), Some("metrics"));
        assert!(ev.router.is_none());
        assert_eq!(ev.count, Some(7));
        assert_eq!(
            ev.reason.as_deref(),
            Some(format!("full: BatchForwarded #{}", lost.seq).as_str())
        );

        let ev = Event::subscriber_panicked("metrics", "boom".into());
        assert_eq!(ev.subscriber.as_deref(), Some("metrics"));
        assert!(ev.router.is_none());
    }

    #[test]
    fn test_panic_message_variants() {
        let s: Box<dyn std::any::Any + Send> = Box::new("static");
        assert_eq!(panic_message(s.as_ref()), "static");
        let s: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(s.as_ref()), "owned");
        let s: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(s.as_ref()), "unknown panic");
    }
}
