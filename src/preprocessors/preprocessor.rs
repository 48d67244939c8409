//! # Preprocessor abstraction.
//!
//! A [`Preprocessor`] inspects one routable and decides whether it is kept,
//! dropped or replaced by a sequence of items. Each preprocessor is bound to a
//! single [`Phase`] and is never invoked in the other one.
//!
//! ```text
//! Forward(items) ──► EnqueueTime chain ──► queue ──► worker ──► ForwardTime chain ──► routers
//!                    (producer thread)                         (worker, per batch)
//! ```

use std::sync::Arc;

use crate::core::Routable;

/// When a preprocessor runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// On the producer's thread inside `Hub::forward`, before items enter the queue.
    EnqueueTime,
    /// On the worker, once per batch, right before the batch is handed to routers.
    ForwardTime,
}

/// Decision of a preprocessor for a single item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome<T> {
    /// Keep the item unchanged.
    Keep,
    /// Remove the item.
    Drop,
    /// Replace the item with these items, in order, at its original position.
    ///
    /// An empty replacement behaves exactly like [`Outcome::Drop`].
    Replace(Vec<T>),
}

impl<T> Outcome<T> {
    /// Builds a replacement from any iterator.
    pub fn replace(items: impl IntoIterator<Item = T>) -> Self {
        Outcome::Replace(items.into_iter().collect())
    }
}

/// # Pluggable filter/transform applied to routables.
///
/// Implementations must be cheap for [`Phase::EnqueueTime`]: they run on the
/// caller of [`Hub::forward`](crate::Hub::forward).
///
/// # Example
/// ```
/// use eventhub::{Outcome, Phase, Preprocessor};
///
/// /// Splits comma-separated messages into one event per part.
/// struct Split;
///
/// impl Preprocessor<String> for Split {
///     fn phase(&self) -> Phase { Phase::EnqueueTime }
///
///     fn process(&self, item: &String) -> Outcome<String> {
///         if item.contains(',') {
///             Outcome::replace(item.split(',').map(str::to_owned))
///         } else {
///             Outcome::Keep
///         }
///     }
/// }
///
/// assert_eq!(Split.process(&"a,b".to_string()), Outcome::Replace(vec!["a".into(), "b".into()]));
/// ```
pub trait Preprocessor<T: Routable>: Send + Sync + 'static {
    /// The phase this preprocessor is bound to.
    fn phase(&self) -> Phase;

    /// Inspects one item.
    fn process(&self, item: &T) -> Outcome<T>;

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Shared handle to a preprocessor.
pub type PreprocessorRef<T> = Arc<dyn Preprocessor<T>>;
