//! # ForwardWorker: the single consumer of the hub queue.
//!
//! One worker runs per installed configuration. It assembles batches from the
//! queue, runs forward-time preprocessors, hands each batch to every router in
//! order and finally releases the flush barriers found in the batch.
//!
//! ## Architecture
//! ```text
//! Hub::reconfigure ──► ForwardWorker::run(token)
//!
//! loop {
//!   ├─► assemble()
//!   │     ├─► pop()  (wait for the first item, or exit on cancel)
//!   │     └─► pop_timeout(deadline - now)  until deadline or max_batch_size events
//!   │           └─► cancelled? → requeue_front(batch) → exit
//!   └─► process(batch)                      (panics caught → WorkerPanicked)
//!         ├─► ForwardTime preprocessors     (barriers keep their position)
//!         ├─► for router in routers:        (sequential, guarded)
//!         │     └─► forward(events, delivery) ─► Err/panic → RouterForwardFailed
//!         ├─► publish BatchForwarded
//!         └─► release every barrier of the batch
//! }
//! publish WorkerStopped
//! ```
//!
//! ## Rules
//! - Total wait after the first item never exceeds `batch_delay`.
//! - At most `max_batch_size` events are pulled per batch (barriers are not counted).
//! - Barriers are released only after every router was attempted for the batch.
//! - Only cancellation ends the loop; a failing batch never does.
//! - Routers get the delivery token, not the worker token: stopping the worker
//!   lets the in-flight batch finish, only dropping the hub cancels deliveries.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::{select, time::Instant};
use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event, EventKind, panic_message};
use crate::preprocessors::{Phase, apply_to_batch};

use super::{
    HubConfig, Routable,
    queue::{Queue, Queueable},
    runner::{guarded, publish_router_failure},
};

/// Consumes the queue on behalf of one configuration.
pub(crate) struct ForwardWorker<T: Routable> {
    config: Arc<HubConfig<T>>,
    queue: Arc<Queue<T>>,
    bus: Bus,
    /// Passed to `Router::forward`; outlives the worker token.
    delivery: CancellationToken,
}

impl<T: Routable> ForwardWorker<T> {
    pub(crate) fn new(
        config: Arc<HubConfig<T>>,
        queue: Arc<Queue<T>>,
        bus: Bus,
        delivery: CancellationToken,
    ) -> Self {
        Self {
            config,
            queue,
            bus,
            delivery,
        }
    }

    /// Runs until `token` is cancelled.
    ///
    /// A batch that is being assembled when cancellation arrives is pushed back
    /// to the front of the queue; a batch that is already being delivered is
    /// finished first, with routers seeing only the delivery token.
    pub(crate) async fn run(self, token: CancellationToken) {
        while let Some(batch) = self.assemble(&token).await {
            let outcome = AssertUnwindSafe(self.process(batch))
                .catch_unwind()
                .await;
            if let Err(panic) = outcome {
                self.bus.publish(
                    Event::new(EventKind::WorkerPanicked).with_reason(panic_message(panic.as_ref())),
                );
            }
        }
        self.bus.publish(Event::new(EventKind::WorkerStopped));
    }

    /// Collects the next batch, or `None` once cancelled.
    async fn assemble(&self, token: &CancellationToken) -> Option<Vec<Queueable<T>>> {
        let first = select! {
            biased;
            _ = token.cancelled() => return None,
            item = self.queue.pop() => item,
        };
        let deadline = Instant::now() + self.config.batch_delay();
        let max_events = self.config.max_batch_size();

        let mut events = usize::from(!first.is_barrier());
        let mut batch = vec![first];

        while events < max_events {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let next = select! {
                biased;
                _ = token.cancelled() => {
                    self.queue.requeue_front(batch);
                    return None;
                }
                item = self.queue.pop_timeout(remaining) => item,
            };
            match next {
                Some(item) => {
                    if !item.is_barrier() {
                        events += 1;
                    }
                    batch.push(item);
                }
                None => break,
            }
        }
        Some(batch)
    }

    /// Delivers one batch to every router and releases its barriers.
    async fn process(&self, batch: Vec<Queueable<T>>) {
        let batch = apply_to_batch(self.config.preprocessors(), Phase::ForwardTime, batch);

        let mut events = Vec::with_capacity(batch.len());
        let mut barriers = Vec::new();
        for item in batch {
            match item {
                Queueable::Event(event) => events.push(event),
                Queueable::Barrier(barrier) => barriers.push(barrier),
            }
        }

        if !events.is_empty() {
            for router in self.config.routers() {
                if let Err(err) = guarded(router.forward(&events, self.delivery.clone())).await {
                    publish_router_failure(
                        &self.bus,
                        EventKind::RouterForwardFailed,
                        router.name(),
                        &err,
                        Some(events.len()),
                    );
                }
            }
            self.bus
                .publish(Event::new(EventKind::BatchForwarded).with_count(events.len()));
        }

        for barrier in barriers {
            barrier.release();
        }
    }
}
