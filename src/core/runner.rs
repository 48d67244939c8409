//! # Run a single router call in isolation.
//!
//! Every call into router code (`start`, `stop`, `forward`, `flush`) goes through
//! [`guarded`], so one misbehaving router can neither abort the caller nor affect
//! other routers.
//!
//! ```text
//! router.forward(batch) ──► guarded() ──► Ok(())
//!                                     ──► Err(RouterError)           (returned error)
//!                                     ──► Err(RouterError::Failed)   (caught panic)
//!                                              │
//!                                              └──► publish_router_failure(kind, ..)
//! ```
//!
//! ## Rules
//! - A panic is converted to [`RouterError::Failed`] carrying the panic message.
//! - Failures are published with the router name; the hub never rethrows them.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::error::RouterError;
use crate::events::{Bus, Event, EventKind, panic_message};

/// Awaits one router call, turning a panic into an error.
pub(crate) async fn guarded<F>(call: F) -> Result<(), RouterError>
where
    F: Future<Output = Result<(), RouterError>>,
{
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(res) => res,
        Err(panic) => Err(RouterError::failed(format!(
            "panicked: {}",
            panic_message(panic.as_ref())
        ))),
    }
}

/// Publishes a suppressed router failure.
pub(crate) fn publish_router_failure(
    bus: &Bus,
    kind: EventKind,
    router: &str,
    err: &RouterError,
    count: Option<usize>,
) {
    let mut ev = Event::new(kind)
        .with_router(router)
        .with_reason(err.to_string());
    if let Some(count) = count {
        ev = ev.with_count(count);
    }
    bus.publish(ev);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_guarded_passes_results_through() {
        assert_eq!(guarded(async { Ok(()) }).await, Ok(()));
        assert_eq!(
            guarded(async { Err(RouterError::unavailable("offline")) }).await,
            Err(RouterError::unavailable("offline"))
        );
    }

    #[tokio::test]
    async fn test_guarded_converts_panics() {
        let res = guarded(async {
            if true {
                panic!("boom");
            }
            Ok(())
        })
        .await;
        assert_eq!(res, Err(RouterError::failed("panicked: boom")));
    }

    #[tokio::test]
    async fn test_failure_event_carries_router_and_count() {
        let bus = Bus::new(4);
        let mut rx = bus.subscribe();

        publish_router_failure(
            &bus,
            EventKind::RouterForwardFailed,
            "disk",
            &RouterError::failed("full"),
            Some(3),
        );

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::RouterForwardFailed);
        assert_eq!(ev.router.as_deref(), Some("disk"));
        assert_eq!(ev.count, Some(3));
        assert_eq!(ev.reason.as_deref(), Some("router failed: full"));
    }
}
