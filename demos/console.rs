//! # Example: console
//!
//! A hub with one console router and an allow filter; only messages starting
//! with "Important" make it to the console.
//!
//! Demonstrates how to:
//! - Implement a [`Router`] that honours its cancellation token.
//! - Build a [`HubConfig`] with a [`FilterPreprocessor`].
//! - Observe hub events through the built-in [`LogWriter`].
//! - Wait for delivery with [`Hub::flush`] instead of sleeping.
//!
//! ## Flow
//! ```text
//! Hub::builder().with_subscribers([LogWriter]).build()
//!     ├─► reconfigure(Some(config))   → HubConfigured, WorkerStarted
//!     ├─► forward(messages)           → allow filter drops "Unimportant ..."
//!     ├─► flush()                     → ConsoleRouter prints, FlushCompleted
//!     └─► reconfigure(None)           → WorkerStopped, HubStopped
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=eventhub=debug cargo run --example console
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use eventhub::{
    Condition, FilterPreprocessor, Hub, HubConfig, LogWriter, Router, RouterError, Subscribe,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// A message event.
#[derive(Debug, Clone)]
struct MessageEvent {
    message: String,
}

impl MessageEvent {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Writes every event to stdout.
struct ConsoleRouter;

#[async_trait]
impl Router<MessageEvent> for ConsoleRouter {
    fn name(&self) -> &str {
        "console"
    }

    async fn forward(
        &self,
        batch: &[MessageEvent],
        ctx: CancellationToken,
    ) -> Result<(), RouterError> {
        for event in batch {
            if ctx.is_cancelled() {
                return Err(RouterError::Canceled);
            }
            println!("{}", event.message);
        }
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "eventhub=info".into()))
        .init();

    // 1. Hub with the built-in tracing subscriber
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let hub = Hub::<MessageEvent>::builder().with_subscribers(subs).build();

    // 2. Configuration: one router, one allow filter
    let important: Condition<MessageEvent> =
        Box::new(|e: &MessageEvent| e.message.starts_with("Important"));
    let config = HubConfig::<MessageEvent>::builder()
        .with_router(Arc::new(ConsoleRouter))
        .with_preprocessor(Arc::new(FilterPreprocessor::allow(vec![important])))
        .with_batch_delay(Duration::from_millis(50))
        .build()?;

    hub.reconfigure(Some(config), CancellationToken::new()).await?;

    // 3. Forward events; the filter runs right here, on this task
    hub.forward([
        MessageEvent::new("Unimportant message."),
        MessageEvent::new("Important message."),
    ]);

    // 4. Wait until the router has seen everything forwarded so far
    let outcome = hub.flush(CancellationToken::new()).await?;
    println!("flush failures: {}", outcome.failures().len());

    // 5. Stop distribution; give the subscriber a moment to print the last events
    hub.reconfigure(None, CancellationToken::new()).await?;
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}
