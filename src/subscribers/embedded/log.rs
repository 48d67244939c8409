//! # LogWriter: renders hub events through `tracing`
//!
//! A minimal subscriber that turns every [`Event`] into a structured `tracing`
//! record. Failures and drops are logged at `warn`, lifecycle changes at `info`,
//! per-batch traffic at `debug`. Install any `tracing` subscriber to see them.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO  eventhub: hub configured routers=2
//! INFO  eventhub: worker started
//! DEBUG eventhub: batch forwarded events=3
//! WARN  eventhub: router forward failed router="disk" events=3 reason="disk full"
//! WARN  eventhub: queue overflow dropped=17
//! INFO  eventhub: flush completed failures=0
//! ```

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let router = e.router.as_deref().unwrap_or("unknown");
        let subscriber = e.subscriber.as_deref().unwrap_or("unknown");
        let reason = e.reason.as_deref().unwrap_or("");
        let count = e.count.unwrap_or(0);

        match e.kind {
            EventKind::HubConfigured => info!(target: "eventhub", routers = count, "hub configured"),
            EventKind::HubStopped => info!(target: "eventhub", "hub stopped; events retained"),
            EventKind::ReconfigureCanceled => {
                warn!(target: "eventhub", "reconfigure cancelled; hub state undefined")
            }
            EventKind::WorkerStarted => info!(target: "eventhub", "worker started"),
            EventKind::WorkerStopped => info!(target: "eventhub", "worker stopped"),
            EventKind::BatchForwarded => debug!(target: "eventhub", events = count, "batch forwarded"),
            EventKind::FlushCompleted => info!(target: "eventhub", failures = count, "flush completed"),
            EventKind::QueueOverflow => warn!(target: "eventhub", dropped = count, "queue overflow"),
            EventKind::RouterStartFailed => {
                warn!(target: "eventhub", router, reason, "router start failed")
            }
            EventKind::RouterStopFailed => {
                warn!(target: "eventhub", router, reason, "router stop failed")
            }
            EventKind::RouterForwardFailed => {
                warn!(target: "eventhub", router, events = count, reason, "router forward failed")
            }
            EventKind::RouterFlushFailed => {
                warn!(target: "eventhub", router, reason, "router flush failed")
            }
            EventKind::PreprocessorPanicked => {
                warn!(target: "eventhub", dropped = count, reason, "preprocessor panicked")
            }
            EventKind::WorkerPanicked => warn!(target: "eventhub", reason, "worker batch panicked"),
            EventKind::SubscriberOverflow => {
                warn!(target: "eventhub", subscriber, lost = count, reason, "subscriber overflow")
            }
            EventKind::SubscriberPanicked => {
                warn!(target: "eventhub", subscriber, reason, "subscriber panicked")
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
