//! # Hub configuration snapshot.
//!
//! Provides [`HubConfig`], the immutable, validated set of routers, preprocessors
//! and batching parameters the hub distributes with.
//!
//! A configuration is used in one way only: it is handed to
//! [`Hub::reconfigure`](crate::Hub::reconfigure), which installs it behind an
//! `Arc` and replaces it wholesale on the next reconfiguration.
//!
//! ## Validation
//! - `max_queue_length > 0`
//! - `max_batch_size > 0`
//! - `batch_delay >= 0` holds by construction (`Duration`)

use std::fmt;
use std::time::Duration;

use crate::error::ConfigError;
use crate::preprocessors::PreprocessorRef;
use crate::routers::RouterRef;

use super::{HubConfigBuilder, Routable};

/// Immutable hub configuration.
///
/// ## Field semantics
/// - `routers`: sinks receiving every batch, called in this order
/// - `preprocessors`: filters/transforms, applied in this order within their phase
/// - `max_queue_length`: queue capacity; events beyond it are dropped on forward
/// - `max_batch_size`: upper bound on events handed to routers in one call
/// - `batch_delay`: longest time the worker waits, after the first item, to fill a batch
pub struct HubConfig<T: Routable> {
    routers: Vec<RouterRef<T>>,
    preprocessors: Vec<PreprocessorRef<T>>,
    max_queue_length: usize,
    max_batch_size: usize,
    batch_delay: Duration,
}

impl<T: Routable> HubConfig<T> {
    /// Validates and creates a configuration.
    ///
    /// # Errors
    /// [`ConfigError::OutOfRange`] naming `max_queue_length` or `max_batch_size`
    /// when either is zero.
    pub fn new(
        routers: Vec<RouterRef<T>>,
        preprocessors: Vec<PreprocessorRef<T>>,
        max_queue_length: usize,
        max_batch_size: usize,
        batch_delay: Duration,
    ) -> Result<Self, ConfigError> {
        if max_queue_length == 0 {
            return Err(ConfigError::OutOfRange {
                field: "max_queue_length",
                reason: "must be greater than zero",
            });
        }
        if max_batch_size == 0 {
            return Err(ConfigError::OutOfRange {
                field: "max_batch_size",
                reason: "must be greater than zero",
            });
        }
        Ok(Self {
            routers,
            preprocessors,
            max_queue_length,
            max_batch_size,
            batch_delay,
        })
    }

    /// Starts a [`HubConfigBuilder`] with default batching parameters.
    pub fn builder() -> HubConfigBuilder<T> {
        HubConfigBuilder::new()
    }

    /// Routers in delivery order.
    #[inline]
    pub fn routers(&self) -> &[RouterRef<T>] {
        &self.routers
    }

    /// Preprocessors in application order (both phases).
    #[inline]
    pub fn preprocessors(&self) -> &[PreprocessorRef<T>] {
        &self.preprocessors
    }

    /// Queue capacity.
    #[inline]
    pub fn max_queue_length(&self) -> usize {
        self.max_queue_length
    }

    /// Maximum number of events per batch.
    #[inline]
    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Maximum batch-assembly delay.
    #[inline]
    pub fn batch_delay(&self) -> Duration {
        self.batch_delay
    }
}

impl<T: Routable> Clone for HubConfig<T> {
    fn clone(&self) -> Self {
        Self {
            routers: self.routers.clone(),
            preprocessors: self.preprocessors.clone(),
            max_queue_length: self.max_queue_length,
            max_batch_size: self.max_batch_size,
            batch_delay: self.batch_delay,
        }
    }
}

impl<T: Routable> fmt::Debug for HubConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let routers: Vec<&str> = self.routers.iter().map(|r| r.name()).collect();
        let preprocessors: Vec<&str> = self.preprocessors.iter().map(|p| p.name()).collect();
        f.debug_struct("HubConfig")
            .field("routers", &routers)
            .field("preprocessors", &preprocessors)
            .field("max_queue_length", &self.max_queue_length)
            .field("max_batch_size", &self.max_batch_size)
            .field("batch_delay", &self.batch_delay)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_queue_length_is_rejected() {
        let err = HubConfig::<u8>::new(Vec::new(), Vec::new(), 0, 10, Duration::ZERO).unwrap_err();
        assert_eq!(err.field(), "max_queue_length");
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let err = HubConfig::<u8>::new(Vec::new(), Vec::new(), 10, 0, Duration::ZERO).unwrap_err();
        assert_eq!(err.field(), "max_batch_size");
    }

    #[test]
    fn test_empty_lists_and_zero_delay_are_valid() {
        let cfg = HubConfig::<u8>::new(Vec::new(), Vec::new(), 1, 1, Duration::ZERO).unwrap();
        assert!(cfg.routers().is_empty());
        assert!(cfg.preprocessors().is_empty());
        assert_eq!(cfg.batch_delay(), Duration::ZERO);

        let copy = cfg.clone();
        assert_eq!(copy.max_queue_length(), 1);
        assert!(format!("{copy:?}").contains("max_batch_size: 1"));
    }
}
