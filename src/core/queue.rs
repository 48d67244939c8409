//! # Bounded FIFO queue between producers and the forwarding worker.
//!
//! ```text
//! Hub::forward ──► push_events ──┐
//! Hub::flush   ──► push_barrier ─┼──► [ Queueable | Queueable | ... ] ──► pop / pop_timeout ──► worker
//! reconfigure  ──► seed ─────────┘             (VecDeque + Notify)
//!                                                       ▲
//!                  worker cancelled mid-batch ──► requeue_front
//! ```
//!
//! ## Rules
//! - **FIFO**: items leave in the order they were pushed (barriers included).
//! - **Bounded for events**: `push_events` drops what does not fit and reports the count.
//! - **Barriers are never dropped**: they bypass the capacity check, as does `seed`.
//!   Once no worker will read the queue, `abandon_barriers` wakes their flushes.
//! - **Single consumer**: exactly one worker pops at a time; `Notify` keeps one permit
//!   so a push that happens before the worker starts waiting is not missed.
//! - `pop` is cancel-safe: an item is only removed inside the poll that returns it.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{Notify, oneshot};

/// Item flowing through the queue.
pub(crate) enum Queueable<T> {
    /// A routable submitted through `Hub::forward`.
    Event(T),
    /// Flush marker; released once the worker has handed every earlier event to routers.
    Barrier(BarrierSignal),
}

impl<T> Queueable<T> {
    pub(crate) fn is_barrier(&self) -> bool {
        matches!(self, Queueable::Barrier(_))
    }
}

/// How a barrier left the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Released {
    /// The worker handed every earlier event to the routers.
    Delivered,
    /// The hub lost its configuration; nothing will read the queue.
    Abandoned,
}

/// One-shot completion handle carried by a barrier marker.
///
/// Dropping it without a call to [`release`](BarrierSignal::release) also wakes
/// the waiter (with a closed channel), which flush treats the same as a release.
pub(crate) struct BarrierSignal(oneshot::Sender<Released>);

impl BarrierSignal {
    /// Creates a signal and the receiver a flush waits on.
    pub(crate) fn new() -> (Self, oneshot::Receiver<Released>) {
        let (tx, rx) = oneshot::channel();
        (Self(tx), rx)
    }

    /// Wakes the waiting flush after delivery.
    pub(crate) fn release(self) {
        let _ = self.0.send(Released::Delivered);
    }

    /// Wakes the waiting flush without delivery.
    pub(crate) fn abandon(self) {
        let _ = self.0.send(Released::Abandoned);
    }
}

/// Bounded multi-producer, single-consumer queue of [`Queueable`]s.
pub(crate) struct Queue<T> {
    items: Mutex<VecDeque<Queueable<T>>>,
    capacity: usize,
    notify: Notify,
}

impl<T> Queue<T> {
    /// Creates an empty queue holding at most `capacity` items.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
            notify: Notify::new(),
        }
    }

    /// Number of buffered items (events and barriers).
    pub(crate) fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Appends events in order until the queue is full.
    ///
    /// Returns how many events were dropped.
    pub(crate) fn push_events(&self, events: impl IntoIterator<Item = T>) -> usize {
        let mut dropped = 0;
        let mut pushed = false;
        {
            let mut items = self.items.lock();
            for event in events {
                if items.len() < self.capacity {
                    items.push_back(Queueable::Event(event));
                    pushed = true;
                } else {
                    dropped += 1;
                }
            }
        }
        if pushed {
            self.notify.notify_one();
        }
        dropped
    }

    /// Appends a barrier regardless of capacity.
    pub(crate) fn push_barrier(&self, barrier: BarrierSignal) {
        self.items.lock().push_back(Queueable::Barrier(barrier));
        self.notify.notify_one();
    }

    /// Appends already-accepted items regardless of capacity.
    pub(crate) fn seed(&self, seeded: Vec<Queueable<T>>) {
        if seeded.is_empty() {
            return;
        }
        self.items.lock().extend(seeded);
        self.notify.notify_one();
    }

    /// Puts items back at the front, keeping their relative order.
    pub(crate) fn requeue_front(&self, batch: Vec<Queueable<T>>) {
        if batch.is_empty() {
            return;
        }
        {
            let mut items = self.items.lock();
            for item in batch.into_iter().rev() {
                items.push_front(item);
            }
        }
        self.notify.notify_one();
    }

    /// Removes every barrier, keeping events in order, and abandons them.
    ///
    /// Returns how many barriers were abandoned.
    pub(crate) fn abandon_barriers(&self) -> usize {
        let barriers: Vec<BarrierSignal> = {
            let mut items = self.items.lock();
            let mut kept = VecDeque::with_capacity(items.len());
            let mut barriers = Vec::new();
            for item in items.drain(..) {
                match item {
                    Queueable::Barrier(barrier) => barriers.push(barrier),
                    event => kept.push_back(event),
                }
            }
            *items = kept;
            barriers
        };
        let abandoned = barriers.len();
        for barrier in barriers {
            barrier.abandon();
        }
        abandoned
    }

    /// Removes and returns everything currently buffered.
    pub(crate) fn drain(&self) -> Vec<Queueable<T>> {
        self.items.lock().drain(..).collect()
    }

    /// Removes the oldest item without waiting.
    pub(crate) fn try_pop(&self) -> Option<Queueable<T>> {
        self.items.lock().pop_front()
    }

    /// Waits for the next item.
    pub(crate) async fn pop(&self) -> Queueable<T> {
        loop {
            if let Some(item) = self.try_pop() {
                return item;
            }
            self.notify.notified().await;
        }
    }

    /// Waits at most `wait` for the next item.
    pub(crate) async fn pop_timeout(&self, wait: Duration) -> Option<Queueable<T>> {
        if let Some(item) = self.try_pop() {
            return Some(item);
        }
        if wait.is_zero() {
            return None;
        }
        tokio::time::timeout(wait, self.pop()).await.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn events(q: &Queue<u32>) -> Vec<u32> {
        q.drain()
            .into_iter()
            .filter_map(|item| match item {
                Queueable::Event(e) => Some(e),
                Queueable::Barrier(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_push_drops_beyond_capacity() {
        let q = Queue::new(3);
        assert_eq!(q.push_events([1, 2]), 0);
        assert_eq!(q.push_events([3, 4, 5]), 2);
        assert_eq!(q.len(), 3);
        assert_eq!(events(&q), vec![1, 2, 3]);
    }

    #[test]
    fn test_barrier_and_seed_bypass_capacity() {
        let q = Queue::new(1);
        q.push_events([1]);
        let (barrier, _rx) = BarrierSignal::new();
        q.push_barrier(barrier);
        q.seed(vec![Queueable::Event(2), Queueable::Event(3)]);
        assert_eq!(q.len(), 4);

        let drained = q.drain();
        assert!(drained[1].is_barrier());
        assert!(!drained[0].is_barrier());
    }

    #[test]
    fn test_requeue_front_keeps_order() {
        let q = Queue::new(10);
        q.push_events([3, 4]);
        q.requeue_front(vec![Queueable::Event(1), Queueable::Event(2)]);
        assert_eq!(events(&q), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_barrier_release_and_drop_both_wake() {
        let (released, mut rx1) = BarrierSignal::new();
        released.release();
        assert_eq!(rx1.try_recv(), Ok(Released::Delivered));

        let (dropped, mut rx2) = BarrierSignal::new();
        drop(dropped);
        assert!(rx2.try_recv().is_err());
    }

    #[test]
    fn test_abandon_barriers_keeps_events() {
        let q = Queue::new(10);
        q.push_events([1]);
        let (first, mut rx1) = BarrierSignal::new();
        q.push_barrier(first);
        q.push_events([2]);
        let (second, mut rx2) = BarrierSignal::new();
        q.push_barrier(second);

        assert_eq!(q.abandon_barriers(), 2);
        assert_eq!(rx1.try_recv(), Ok(Released::Abandoned));
        assert_eq!(rx2.try_recv(), Ok(Released::Abandoned));
        assert_eq!(events(&q), vec![1, 2]);
        assert_eq!(q.abandon_barriers(), 0);
    }

    #[tokio::test]
    async fn test_pop_waits_for_push() {
        let q = Arc::new(Queue::new(4));
        let consumer = {
            let q = Arc::clone(&q);
            tokio::spawn(async move {
                match q.pop().await {
                    Queueable::Event(e) => e,
                    Queueable::Barrier(_) => 0,
                }
            })
        };
        tokio::task::yield_now().await;
        q.push_events([42]);
        assert_eq!(consumer.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_pop_timeout_expires_on_empty_queue() {
        let q: Queue<u32> = Queue::new(4);
        assert!(q.pop_timeout(Duration::from_millis(10)).await.is_none());
        assert!(q.pop_timeout(Duration::ZERO).await.is_none());

        q.push_events([7]);
        assert!(q.pop_timeout(Duration::ZERO).await.is_some());
    }
}
