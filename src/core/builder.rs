//! # Builders for hub configurations and hubs.
//!
//! - [`HubConfigBuilder`] accumulates routers and preprocessors with sensible
//!   batching defaults and validates on [`build`](HubConfigBuilder::build).
//! - [`HubBuilder`] wires the event bus and subscribers around a new [`Hub`].
//!
//! ## Defaults
//! | field              | value  |
//! |--------------------|--------|
//! | `max_queue_length` | 100    |
//! | `max_batch_size`   | 100    |
//! | `batch_delay`      | 100 ms |
//! | `bus_capacity`     | 1024   |

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ConfigError;
use crate::events::Bus;
use crate::preprocessors::PreprocessorRef;
use crate::routers::RouterRef;
use crate::subscribers::{Subscribe, SubscriberSet};

use super::{Hub, HubConfig, Routable};

const DEFAULT_MAX_QUEUE_LENGTH: usize = 100;
const DEFAULT_MAX_BATCH_SIZE: usize = 100;
const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(100);
const DEFAULT_BUS_CAPACITY: usize = 1024;

/// Fluent builder for [`HubConfig`].
///
/// # Example
/// ```
/// use std::time::Duration;
/// use std::sync::Arc;
/// use eventhub::{Condition, FilterPreprocessor, HubConfig};
///
/// let is_blank: Condition<String> = Box::new(|s: &String| s.trim().is_empty());
/// let cfg = HubConfig::<String>::builder()
///     .with_preprocessor(Arc::new(FilterPreprocessor::block(vec![is_blank])))
///     .with_max_batch_size(10)
///     .with_batch_delay(Duration::from_millis(5))
///     .build()
///     .unwrap();
///
/// assert_eq!(cfg.max_queue_length(), 100);
/// assert_eq!(cfg.max_batch_size(), 10);
/// ```
pub struct HubConfigBuilder<T: Routable> {
    routers: Vec<RouterRef<T>>,
    preprocessors: Vec<PreprocessorRef<T>>,
    max_queue_length: usize,
    max_batch_size: usize,
    batch_delay: Duration,
}

impl<T: Routable> HubConfigBuilder<T> {
    /// Creates a builder with no routers, no preprocessors and default batching.
    pub fn new() -> Self {
        Self {
            routers: Vec::new(),
            preprocessors: Vec::new(),
            max_queue_length: DEFAULT_MAX_QUEUE_LENGTH,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
        }
    }

    /// Appends a router; routers receive batches in the order they were added.
    pub fn with_router(mut self, router: RouterRef<T>) -> Self {
        self.routers.push(router);
        self
    }

    /// Appends a preprocessor; within a phase they run in the order they were added.
    pub fn with_preprocessor(mut self, preprocessor: PreprocessorRef<T>) -> Self {
        self.preprocessors.push(preprocessor);
        self
    }

    /// Sets the queue capacity.
    pub fn with_max_queue_length(mut self, max_queue_length: usize) -> Self {
        self.max_queue_length = max_queue_length;
        self
    }

    /// Sets the maximum number of events per batch.
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    /// Sets the maximum batch-assembly delay.
    pub fn with_batch_delay(mut self, batch_delay: Duration) -> Self {
        self.batch_delay = batch_delay;
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    /// See [`HubConfig::new`].
    pub fn build(self) -> Result<HubConfig<T>, ConfigError> {
        HubConfig::new(
            self.routers,
            self.preprocessors,
            self.max_queue_length,
            self.max_batch_size,
            self.batch_delay,
        )
    }
}

impl<T: Routable> Default for HubConfigBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing a [`Hub`] with optional observability.
pub struct HubBuilder<T: Routable> {
    subscribers: Vec<Arc<dyn Subscribe>>,
    bus_capacity: usize,
    _routable: PhantomData<fn() -> T>,
}

impl<T: Routable> HubBuilder<T> {
    /// Creates a builder without subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            bus_capacity: DEFAULT_BUS_CAPACITY,
            _routable: PhantomData,
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive hub events (lifecycle, suppressed failures, drops)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Sets the ring buffer size of the event bus (clamped to at least 1).
    pub fn with_bus_capacity(mut self, bus_capacity: usize) -> Self {
        self.bus_capacity = bus_capacity;
        self
    }

    /// Builds an unconfigured hub.
    ///
    /// Must be called within a Tokio runtime when subscribers were given.
    pub fn build(self) -> Hub<T> {
        let bus = Bus::new(self.bus_capacity);
        let subs = if self.subscribers.is_empty() {
            None
        } else {
            Some(Arc::new(SubscriberSet::new(self.subscribers, bus.clone())))
        };
        Hub::new_internal(bus, subs)
    }
}

impl<T: Routable> Default for HubBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder_defaults() {
        let cfg = HubConfigBuilder::<u32>::new().build().unwrap();
        assert_eq!(cfg.max_queue_length(), 100);
        assert_eq!(cfg.max_batch_size(), 100);
        assert_eq!(cfg.batch_delay(), Duration::from_millis(100));
        assert!(cfg.routers().is_empty());
    }

    #[test]
    fn test_config_builder_validates() {
        let err = HubConfigBuilder::<u32>::new()
            .with_max_queue_length(0)
            .build()
            .unwrap_err();
        assert_eq!(err.field(), "max_queue_length");
    }

    #[test]
    fn test_hub_without_subscribers_needs_no_runtime() {
        let hub = HubBuilder::<u32>::new().with_bus_capacity(0).build();
        assert!(!hub.is_running());
        assert_eq!(hub.queued(), 0);
    }
}
