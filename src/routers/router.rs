//! # Router abstraction.
//!
//! A [`Router`] is a backend sink that receives ordered batches of routables.
//! Its lifecycle is driven exclusively by the hub:
//!
//! ```text
//! reconfigure(new) ──► start(ctx) ──► forward(batch, ctx)* ──► stop(ctx) ◄── reconfigure(next)
//!                                              │
//!                      flush(ctx) ◄── Hub::flush (only via as_flushable())
//! ```
//!
//! ## Rules
//! - `forward` calls are sequential per hub: a router never sees two batches at once.
//! - Errors and panics from any router method are isolated by the hub; they are
//!   reported as events and never reach `Hub::forward` callers.
//! - The optional [`Flushable`] capability is discovered through
//!   [`Router::as_flushable`]; routers that cannot flush keep the default `None`.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::Routable;
use crate::error::RouterError;

/// # Backend sink receiving batches of routables.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use eventhub::{Router, RouterError};
/// use tokio_util::sync::CancellationToken;
///
/// struct Stdout;
///
/// #[async_trait]
/// impl Router<String> for Stdout {
///     fn name(&self) -> &str { "stdout" }
///
///     async fn forward(&self, batch: &[String], _ctx: CancellationToken) -> Result<(), RouterError> {
///         for line in batch {
///             println!("{line}");
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Router<T: Routable>: Send + Sync + 'static {
    /// Human-readable name (for logs/metrics and flush results).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Called once when a configuration containing this router is installed.
    ///
    /// Failing here aborts the reconfiguration.
    async fn start(&self, _ctx: CancellationToken) -> Result<(), RouterError> {
        Ok(())
    }

    /// Called once when the configuration containing this router is replaced,
    /// or when another router of that configuration failed to start.
    async fn stop(&self, _ctx: CancellationToken) -> Result<(), RouterError> {
        Ok(())
    }

    /// Accepts one batch, in enqueue order.
    ///
    /// `ctx` is cancelled only when the hub is dropped; reconfiguration waits for
    /// an in-flight delivery instead. Long-running deliveries may use it to give
    /// up early on shutdown.
    async fn forward(&self, batch: &[T], ctx: CancellationToken) -> Result<(), RouterError>;

    /// Returns the flush capability, if this router buffers internally.
    fn as_flushable(&self) -> Option<&dyn Flushable> {
        None
    }
}

/// # Optional router capability: drain internal buffers on demand.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use eventhub::{Flushable, Router, RouterError};
/// use tokio_util::sync::CancellationToken;
///
/// struct Buffered;
///
/// #[async_trait]
/// impl Router<u64> for Buffered {
///     async fn forward(&self, _batch: &[u64], _ctx: CancellationToken) -> Result<(), RouterError> {
///         Ok(())
///     }
///     fn as_flushable(&self) -> Option<&dyn Flushable> { Some(self) }
/// }
///
/// #[async_trait]
/// impl Flushable for Buffered {
///     async fn flush(&self, _ctx: CancellationToken) -> Result<(), RouterError> { Ok(()) }
/// }
///
/// assert!(Buffered.as_flushable().is_some());
/// ```
#[async_trait]
pub trait Flushable: Send + Sync {
    /// Drains everything accepted so far to the backend.
    async fn flush(&self, ctx: CancellationToken) -> Result<(), RouterError>;
}

/// Shared handle to a router.
pub type RouterRef<T> = Arc<dyn Router<T>>;

/// A router whose flush failed, as returned by [`Hub::flush`](crate::Hub::flush).
///
/// `router` is the same handle that was put into the configuration, so it can be
/// matched with [`Arc::ptr_eq`].
pub struct FlushFailure<T: Routable> {
    /// The router that failed.
    pub router: RouterRef<T>,
    /// What went wrong (panics are reported as [`RouterError::Failed`]).
    pub error: RouterError,
}

impl<T: Routable> Clone for FlushFailure<T> {
    fn clone(&self) -> Self {
        Self {
            router: Arc::clone(&self.router),
            error: self.error.clone(),
        }
    }
}

impl<T: Routable> fmt::Debug for FlushFailure<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlushFailure")
            .field("router", &self.router.name())
            .field("error", &self.error)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingRouter {
        batches: AtomicUsize,
        events: AtomicUsize,
    }

    #[async_trait]
    impl Router<u32> for CountingRouter {
        async fn forward(&self, batch: &[u32], _ctx: CancellationToken) -> Result<(), RouterError> {
            self.batches.fetch_add(1, Ordering::SeqCst);
            self.events.fetch_add(batch.len(), Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_router_lifecycle_defaults() {
        let router = CountingRouter {
            batches: AtomicUsize::new(0),
            events: AtomicUsize::new(0),
        };
        let ctx = CancellationToken::new();

        router.start(ctx.clone()).await.unwrap();
        router.forward(&[1, 2, 3], ctx.clone()).await.unwrap();
        router.forward(&[4], ctx.clone()).await.unwrap();
        router.stop(ctx).await.unwrap();

        assert_eq!(router.batches.load(Ordering::SeqCst), 2);
        assert_eq!(router.events.load(Ordering::SeqCst), 4);
        assert!(router.as_flushable().is_none());
        assert!(router.name().ends_with("CountingRouter"));
    }

    #[test]
    fn test_flush_failure_debug_uses_router_name() {
        let router: RouterRef<u32> = Arc::new(CountingRouter {
            batches: AtomicUsize::new(0),
            events: AtomicUsize::new(0),
        });
        let failure = FlushFailure {
            router: Arc::clone(&router),
            error: RouterError::failed("disk full"),
        };
        let cloned = failure.clone();

        assert!(Arc::ptr_eq(&cloned.router, &router));
        assert!(format!("{failure:?}").contains("CountingRouter"));
    }
}
