//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for observing what the hub does, including
//! every failure it suppresses. Each subscriber is driven by a dedicated worker
//! loop fed by a bounded queue owned by the [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching, retries); they do **not** block
//!   the hub nor other subscribers.
//! - Each subscriber **declares** its preferred queue capacity via
//!   [`Subscribe::queue_capacity`]. If a queue overflows, events for that
//!   subscriber are **dropped** and `SubscriberOverflow` is published.
//!
//! ## Example
//! ```rust
//! use eventhub::{Event, EventKind, Subscribe};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! #[derive(Default)]
//! struct DropCounter(AtomicUsize);
//!
//! #[async_trait::async_trait]
//! impl Subscribe for DropCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::QueueOverflow {
//!             self.0.fetch_add(ev.count.unwrap_or(0), Ordering::Relaxed);
//!         }
//!     }
//!     fn name(&self) -> &'static str { "drop-counter" }
//! }
//! ```

use crate::events::Event;
use async_trait::async_trait;

/// Contract for event subscribers.
///
/// Called from a subscriber-dedicated worker task. Implementations should avoid
/// blocking the async runtime (prefer async I/O and cooperative waits).
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
