//! # Hub: buffers, batches and distributes routables to routers.
//!
//! The [`Hub`] owns the event bus, the bounded queue and at most one
//! [`ForwardWorker`]. Producers call [`Hub::forward`]; the active configuration
//! is swapped with [`Hub::reconfigure`]; [`Hub::flush`] waits until everything
//! forwarded so far reached the routers and then drains flushable routers.
//!
//! ## High-level architecture
//! ```text
//! forward(items)
//!   └─► EnqueueTime preprocessors (current config, no reconfigure lock)
//!         └─► enqueue lock ──► Queue ──► ForwardWorker ──► routers[0..N]
//!                               ▲              │
//! flush(ctx)                    │              └──► barrier.release()
//!   ├─► reconfigure lock (briefly): snapshot flushable routers,
//!   │     enqueue lock ──► push_barrier ──┘
//!   ├─► wait barrier | ctx cancelled      (abandoned barrier → Idle)
//!   └─► flush each router sequentially (no lock held)
//!
//! reconfigure(config, ctx)                 (reconfigure lock held throughout)
//!   ├─► cancel worker, wait for it to exit (it requeues a half-built batch,
//!   │                                       finishes an in-flight one)
//!   ├─► stop old routers concurrently      (failures → RouterStopFailed)
//!   ├─► None    → keep events, abandon pending barriers, no worker → HubStopped
//!   └─► Some(c) → start routers concurrently
//!                 (failure → stop the started ones, Unconfigured + HubError::RouterStart)
//!                 enqueue lock: drain old queue into Queue(c.max_queue_length)
//!                 spawn ForwardWorker      → HubConfigured, WorkerStarted
//! ```
//!
//! ## Rules
//! - **One worker**: a new worker is spawned only after the previous one exited.
//! - **No loss across reconfiguration**: undelivered items move to the new queue in order;
//!   a batch already handed to routers is not cancelled by reconfiguration.
//! - **No orphaned flush**: when the hub ends up unconfigured, pending flushes return
//!   [`FlushOutcome::Idle`].
//! - **Forward ordering**: concurrent producers are ordered by enqueue-lock acquisition.
//! - **Flush ordering**: the barrier is enqueued under the same lock as events, so
//!   it is released only after all earlier events were handed to every router.
//! - **Cancelled reconfigure**: the hub state is undefined; reconfigure again to recover.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//! use eventhub::{Hub, HubConfig, Router, RouterError};
//!
//! struct Stdout;
//!
//! #[async_trait]
//! impl Router<String> for Stdout {
//!     async fn forward(&self, batch: &[String], _ctx: CancellationToken) -> Result<(), RouterError> {
//!         for line in batch {
//!             println!("{line}");
//!         }
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let hub = Hub::<String>::new();
//!     let config = HubConfig::<String>::builder()
//!         .with_router(std::sync::Arc::new(Stdout))
//!         .with_batch_delay(Duration::from_millis(10))
//!         .build()?;
//!
//!     hub.reconfigure(Some(config), CancellationToken::new()).await?;
//!     hub.forward(["hello".to_string(), "world".to_string()]);
//!     hub.flush(CancellationToken::new()).await?;
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use tokio::{select, sync::broadcast, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::error::{HubError, RouterError};
use crate::events::{Bus, Event, EventKind, panic_message};
use crate::preprocessors::{self, Phase};
use crate::routers::{FlushFailure, RouterRef};
use crate::subscribers::SubscriberSet;

use super::{
    BarrierSignal, HubBuilder, HubConfig, Released, Routable,
    queue::Queue,
    runner::{guarded, publish_router_failure},
    worker::ForwardWorker,
};

/// Capacity of the queue before the first configuration is installed.
pub(crate) const INITIAL_QUEUE_CAPACITY: usize = 1000;

/// Result of [`Hub::flush`].
pub enum FlushOutcome<T: Routable> {
    /// The hub had no configuration, so there was nothing to flush.
    Idle,
    /// The barrier was reached and every flushable router was asked to flush.
    ///
    /// Holds the routers whose flush failed; empty when all succeeded.
    Completed(Vec<FlushFailure<T>>),
}

impl<T: Routable> FlushOutcome<T> {
    /// True if there was nothing to flush.
    pub fn is_idle(&self) -> bool {
        matches!(self, FlushOutcome::Idle)
    }

    /// Routers whose flush failed (empty for [`FlushOutcome::Idle`]).
    pub fn failures(&self) -> &[FlushFailure<T>] {
        match self {
            FlushOutcome::Idle => &[],
            FlushOutcome::Completed(failures) => failures,
        }
    }
}

impl<T: Routable> fmt::Debug for FlushOutcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlushOutcome::Idle => f.write_str("Idle"),
            FlushOutcome::Completed(failures) => f.debug_tuple("Completed").field(failures).finish(),
        }
    }
}

/// Handle to the running forward worker.
struct WorkerHandle {
    token: CancellationToken,
    join: JoinHandle<()>,
}

/// State guarded by the reconfiguration lock.
struct State {
    worker: Option<WorkerHandle>,
}

/// In-process event distribution hub.
pub struct Hub<T: Routable> {
    bus: Bus,
    /// Current queue; the mutex doubles as the enqueue lock.
    queue: Mutex<Arc<Queue<T>>>,
    /// Current configuration, readable without the reconfiguration lock.
    current: RwLock<Option<Arc<HubConfig<T>>>>,
    /// Reconfiguration lock.
    state: tokio::sync::Mutex<State>,
    /// Parent of every worker and delivery token; cancelled when the hub is dropped.
    root: CancellationToken,
}

impl<T: Routable> Hub<T> {
    /// Creates an unconfigured hub without subscribers.
    pub fn new() -> Self {
        HubBuilder::new().build()
    }

    /// Starts a [`HubBuilder`].
    pub fn builder() -> HubBuilder<T> {
        HubBuilder::new()
    }

    /// Wires a hub around `bus`, fanning events out to `subs` when present.
    pub(crate) fn new_internal(bus: Bus, subs: Option<Arc<SubscriberSet>>) -> Self {
        let root = CancellationToken::new();
        if let Some(subs) = subs {
            Self::subscriber_listener(&bus, subs, root.clone());
        }
        Self {
            bus,
            queue: Mutex::new(Arc::new(Queue::new(INITIAL_QUEUE_CAPACITY))),
            current: RwLock::new(None),
            state: tokio::sync::Mutex::new(State { worker: None }),
            root,
        }
    }

    /// Subscribes to the bus and forwards events to the subscriber set (fire-and-forget).
    fn subscriber_listener(bus: &Bus, set: Arc<SubscriberSet>, root: CancellationToken) {
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                let ev = select! {
                    _ = root.cancelled() => break,
                    ev = rx.recv() => ev,
                };
                match ev {
                    Ok(ev) => set.emit(&ev),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    /// Returns a receiver for every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// The configuration currently installed, if any.
    pub fn configuration(&self) -> Option<Arc<HubConfig<T>>> {
        self.current.read().clone()
    }

    /// True while a configuration is installed and its worker runs.
    pub fn is_running(&self) -> bool {
        self.current.read().is_some()
    }

    /// Number of items currently buffered (including pending flush barriers).
    pub fn queued(&self) -> usize {
        self.queue.lock().len()
    }

    /// Submits items for distribution.
    ///
    /// Accepts plain items or `Option`s; `None` entries are skipped. Enqueue-time
    /// preprocessors of the current configuration run on the caller's thread.
    /// Never blocks on routers and never fails: items that do not fit into the
    /// queue are dropped and reported as [`EventKind::QueueOverflow`].
    pub fn forward<I>(&self, items: I)
    where
        I: IntoIterator,
        I::Item: Into<Option<T>>,
    {
        let items: Vec<T> = items.into_iter().filter_map(Into::into).collect();
        if items.is_empty() {
            return;
        }

        let config = self.current.read().clone();
        let items = match config {
            Some(config) => {
                let submitted = items.len();
                let preprocessed = std::panic::catch_unwind(AssertUnwindSafe(|| {
                    preprocessors::apply(config.preprocessors(), Phase::EnqueueTime, items)
                }));
                match preprocessed {
                    Ok(items) => items,
                    Err(panic) => {
                        self.bus.publish(
                            Event::new(EventKind::PreprocessorPanicked)
                                .with_reason(panic_message(panic.as_ref()))
                                .with_count(submitted),
                        );
                        return;
                    }
                }
            }
            None => items,
        };
        if items.is_empty() {
            return;
        }

        let dropped = self.queue.lock().push_events(items);
        if dropped > 0 {
            self.bus
                .publish(Event::new(EventKind::QueueOverflow).with_count(dropped));
        }
    }

    /// Replaces the active configuration; `None` stops distribution but keeps
    /// buffered items for the next configuration.
    ///
    /// # Errors
    /// - [`HubError::Canceled`] when `ctx` is cancelled; the hub state is then
    ///   undefined until the next successful reconfiguration.
    /// - [`HubError::RouterStart`] when a router of `config` fails to start; the
    ///   routers that did start are stopped and the hub is left unconfigured
    ///   with buffered items intact.
    pub async fn reconfigure(
        &self,
        config: Option<HubConfig<T>>,
        ctx: CancellationToken,
    ) -> Result<(), HubError> {
        let mut state = select! {
            biased;
            _ = ctx.cancelled() => return Err(self.reconfigure_canceled()),
            guard = self.state.lock() => guard,
        };

        if let Some(worker) = &state.worker {
            worker.token.cancel();
        }
        if ctx.is_cancelled() {
            return Err(self.reconfigure_canceled());
        }
        if let Some(worker) = state.worker.as_mut() {
            let joined = select! {
                biased;
                _ = ctx.cancelled() => return Err(self.reconfigure_canceled()),
                joined = &mut worker.join => joined,
            };
            match joined {
                Err(err) if err.is_panic() => self.bus.publish(
                    Event::new(EventKind::WorkerPanicked)
                        .with_reason(panic_message(err.into_panic().as_ref())),
                ),
                _ => {}
            }
            state.worker = None;
        }

        let previous = self.current.read().clone();
        if let Some(previous) = previous {
            self.stop_routers(previous.routers(), &ctx).await?;
        }

        let Some(config) = config else {
            self.unconfigure();
            self.bus.publish(Event::new(EventKind::HubStopped));
            return Ok(());
        };

        let config = Arc::new(config);
        *self.current.write() = Some(Arc::clone(&config));
        if let Err(err) = self.start_routers(config.routers(), &ctx).await {
            self.unconfigure();
            return Err(err);
        }

        let queue = {
            let mut slot = self.queue.lock();
            let fresh = Arc::new(Queue::new(config.max_queue_length()));
            fresh.seed(slot.drain());
            *slot = Arc::clone(&fresh);
            fresh
        };

        let token = self.root.child_token();
        let worker = ForwardWorker::new(
            Arc::clone(&config),
            queue,
            self.bus.clone(),
            self.root.child_token(),
        );
        let join = tokio::spawn(worker.run(token.clone()));
        state.worker = Some(WorkerHandle { token, join });

        self.bus.publish(
            Event::new(EventKind::HubConfigured).with_count(config.routers().len()),
        );
        self.bus.publish(Event::new(EventKind::WorkerStarted));
        Ok(())
    }

    /// Waits until every item forwarded so far was handed to the routers, then
    /// flushes each flushable router in configuration order.
    ///
    /// Router flush failures are returned as data, never as an error. Returns
    /// [`FlushOutcome::Idle`] when the hub is unconfigured, or becomes
    /// unconfigured before the barrier is reached.
    ///
    /// # Errors
    /// [`HubError::Canceled`] when `ctx` is cancelled before the barrier is
    /// reached or between two router flushes. Cancelling leaves the queue and
    /// the worker untouched.
    pub async fn flush(&self, ctx: CancellationToken) -> Result<FlushOutcome<T>, HubError> {
        if ctx.is_cancelled() {
            return Err(HubError::Canceled);
        }

        let (routers, released) = {
            let _state = select! {
                biased;
                _ = ctx.cancelled() => return Err(HubError::Canceled),
                guard = self.state.lock() => guard,
            };
            let routers: Vec<RouterRef<T>> = match self.current.read().as_ref() {
                None => return Ok(FlushOutcome::Idle),
                Some(config) => config
                    .routers()
                    .iter()
                    .filter(|router| router.as_flushable().is_some())
                    .cloned()
                    .collect(),
            };
            let (barrier, released) = BarrierSignal::new();
            self.queue.lock().push_barrier(barrier);
            (routers, released)
        };

        let reached = select! {
            biased;
            _ = ctx.cancelled() => return Err(HubError::Canceled),
            reached = released => reached,
        };
        if matches!(reached, Ok(Released::Abandoned)) {
            return Ok(FlushOutcome::Idle);
        }

        let mut failures = Vec::new();
        for router in routers {
            if ctx.is_cancelled() {
                return Err(HubError::Canceled);
            }
            let Some(flushable) = router.as_flushable() else {
                continue;
            };
            if let Err(error) = guarded(flushable.flush(ctx.clone())).await {
                publish_router_failure(
                    &self.bus,
                    EventKind::RouterFlushFailed,
                    router.name(),
                    &error,
                    None,
                );
                failures.push(FlushFailure { router, error });
            }
        }

        self.bus
            .publish(Event::new(EventKind::FlushCompleted).with_count(failures.len()));
        Ok(FlushOutcome::Completed(failures))
    }

    /// Stops routers concurrently; failures are reported and otherwise ignored.
    async fn stop_routers(
        &self,
        routers: &[RouterRef<T>],
        ctx: &CancellationToken,
    ) -> Result<(), HubError> {
        let stops = routers
            .iter()
            .map(|router| guarded(router.stop(ctx.clone())));
        let results = select! {
            biased;
            _ = ctx.cancelled() => return Err(self.reconfigure_canceled()),
            results = join_all(stops) => results,
        };

        for (router, res) in routers.iter().zip(results) {
            if let Err(err) = res {
                publish_router_failure(&self.bus, EventKind::RouterStopFailed, router.name(), &err, None);
            }
        }
        Ok(())
    }

    /// Starts routers concurrently; the first failure aborts the reconfiguration.
    ///
    /// On failure the routers that did start are stopped again, since the hub
    /// keeps no reference to them afterwards.
    async fn start_routers(
        &self,
        routers: &[RouterRef<T>],
        ctx: &CancellationToken,
    ) -> Result<(), HubError> {
        let starts = routers
            .iter()
            .map(|router| guarded(router.start(ctx.clone())));
        let results = select! {
            biased;
            _ = ctx.cancelled() => return Err(self.reconfigure_canceled()),
            results = join_all(starts) => results,
        };

        let mut first: Option<(String, RouterError)> = None;
        let mut started = Vec::with_capacity(routers.len());
        for (router, res) in routers.iter().zip(results) {
            match res {
                Ok(()) => started.push(Arc::clone(router)),
                Err(err) => {
                    publish_router_failure(&self.bus, EventKind::RouterStartFailed, router.name(), &err, None);
                    if first.is_none() {
                        first = Some((router.name().to_string(), err));
                    }
                }
            }
        }
        match first {
            None => Ok(()),
            Some((router, error)) => {
                self.stop_routers(&started, ctx).await?;
                Err(HubError::RouterStart { router, error })
            }
        }
    }

    /// Drops the configuration and wakes flushes that nothing will serve.
    fn unconfigure(&self) {
        *self.current.write() = None;
        self.queue.lock().abandon_barriers();
    }

    /// Publishes `ReconfigureCanceled` and returns the matching error.
    fn reconfigure_canceled(&self) -> HubError {
        self.bus.publish(Event::new(EventKind::ReconfigureCanceled));
        HubError::Canceled
    }
}

impl<T: Routable> Default for Hub<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Routable> Drop for Hub<T> {
    fn drop(&mut self) {
        self.root.cancel();
    }
}
